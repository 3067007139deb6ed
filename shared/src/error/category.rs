use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Domain of an error, derived from the thousands digit of its code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Order,
    Payment,
    Stock,
    /// Disk, memory, damaged data: needs an operator, not different input
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            4 => Self::Order,
            5 => Self::Payment,
            6 => Self::Stock,
            9.. => Self::System,
            _ => Self::General,
        }
    }

    pub fn is_infrastructure(&self) -> bool {
        *self == Self::System
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_by_range() {
        assert_eq!(ErrorCategory::from_code(2), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(4009), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5006), ErrorCategory::Payment);
        assert_eq!(ErrorCategory::from_code(6004), ErrorCategory::Stock);
        assert_eq!(ErrorCategory::from_code(9403), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(12000), ErrorCategory::System);
    }

    #[test]
    fn test_only_system_codes_are_infrastructure() {
        assert!(ErrorCode::StorageFull.category().is_infrastructure());
        assert!(!ErrorCode::ProductOutOfStock.category().is_infrastructure());
        assert!(!ErrorCode::BuyerInfoRequired.category().is_infrastructure());
    }
}
