//! Draft order (billing cart)
//!
//! Lines hold the item snapshot they were last checked against. Nothing here
//! touches storage; the final stock check happens again inside finalize.

use crate::stock::{StockError, StockResult};
use rust_decimal::Decimal;
use shared::models::{
    BuyerInfo, DraftLine, FinalizeRequest, OrderLineItem, OrderStream, PaymentMethod, StockItem,
    sum_subtotals,
};

#[derive(Debug, Clone)]
pub struct DraftOrder {
    stream: OrderStream,
    lines: Vec<(StockItem, u32)>,
}

/// Price each `(item, quantity)` pair and total them
///
/// Amounts that do not fit in a `Decimal` are a validation failure.
pub fn price_lines(picked: &[(StockItem, u32)]) -> StockResult<(Vec<OrderLineItem>, Decimal)> {
    let items = picked
        .iter()
        .map(|(item, quantity)| {
            OrderLineItem::priced(item, *quantity).ok_or_else(|| {
                StockError::validation(format!("subtotal for {} is too large", item.name))
            })
        })
        .collect::<StockResult<Vec<_>>>()?;
    let total = sum_subtotals(&items)
        .ok_or_else(|| StockError::validation("order total is too large"))?;
    Ok((items, total))
}

fn check_available(item: &StockItem, requested: u32) -> StockResult<()> {
    if requested > item.quantity {
        return Err(StockError::InsufficientStock {
            name: item.name.clone(),
            available: item.quantity,
            requested,
        });
    }
    Ok(())
}

impl DraftOrder {
    pub fn new(stream: OrderStream) -> Self {
        Self {
            stream,
            lines: Vec::new(),
        }
    }

    pub fn stream(&self) -> OrderStream {
        self.stream
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` of an item, merging with an existing line
    pub fn add(&mut self, item: &StockItem, quantity: u32) -> StockResult<()> {
        if quantity == 0 {
            return Err(StockError::validation("quantity must be greater than zero"));
        }
        match self.lines.iter_mut().find(|(line, _)| line.id == item.id) {
            Some((snapshot, current)) => {
                let wanted = current.saturating_add(quantity);
                check_available(item, wanted)?;
                *snapshot = item.clone();
                *current = wanted;
            }
            None => {
                check_available(item, quantity)?;
                self.lines.push((item.clone(), quantity));
            }
        }
        Ok(())
    }

    /// Replace a line's quantity; 0 removes the line
    pub fn set_quantity(&mut self, item: &StockItem, quantity: u32) -> StockResult<()> {
        if quantity == 0 {
            self.remove(&item.id);
            return Ok(());
        }
        check_available(item, quantity)?;
        match self.lines.iter_mut().find(|(line, _)| line.id == item.id) {
            Some((snapshot, current)) => {
                *snapshot = item.clone();
                *current = quantity;
            }
            None => self.lines.push((item.clone(), quantity)),
        }
        Ok(())
    }

    pub fn remove(&mut self, item_id: &str) {
        self.lines.retain(|(line, _)| line.id != item_id);
    }

    /// Priced lines in insertion order, with their total
    pub fn priced(&self) -> StockResult<(Vec<OrderLineItem>, Decimal)> {
        price_lines(&self.lines)
    }

    pub fn to_request(
        &self,
        payment_method: Option<PaymentMethod>,
        buyer: Option<BuyerInfo>,
        idempotency_key: Option<String>,
    ) -> FinalizeRequest {
        FinalizeRequest {
            stream: self.stream,
            lines: self
                .lines
                .iter()
                .map(|(item, quantity)| DraftLine {
                    stock_item_id: item.id.clone(),
                    quantity: *quantity,
                })
                .collect(),
            payment_method,
            buyer,
            idempotency_key,
        }
    }
}

/// Sum quantities of lines naming the same item, keeping first-seen order
pub fn merge_lines(lines: &[DraftLine]) -> StockResult<Vec<DraftLine>> {
    let mut merged: Vec<DraftLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity == 0 {
            return Err(StockError::validation(format!(
                "quantity for {} must be greater than zero",
                line.stock_item_id
            )));
        }
        match merged
            .iter_mut()
            .find(|m| m.stock_item_id == line.stock_item_id)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(|| {
                    StockError::validation(format!("quantity for {} is too large", line.stock_item_id))
                })?;
            }
            None => merged.push(line.clone()),
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple(quantity: u32) -> StockItem {
        StockItem {
            id: "apple".into(),
            name: "Apple".into(),
            price: Decimal::new(300, 2),
            quantity,
            barcode: "B1".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_add_merges_and_checks_stock() {
        let mut draft = DraftOrder::new(OrderStream::Standard);
        draft.add(&apple(10), 2).unwrap();
        draft.add(&apple(10), 1).unwrap();
        let (lines, total) = draft.priced().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(total, Decimal::new(900, 2));

        let err = draft.add(&apple(10), 8).unwrap_err();
        assert!(matches!(
            err,
            StockError::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            }
        ));
        assert_eq!(draft.priced().unwrap().0[0].quantity, 3);
    }

    #[test]
    fn test_set_zero_removes_line() {
        let mut draft = DraftOrder::new(OrderStream::Standard);
        draft.add(&apple(10), 2).unwrap();
        draft.set_quantity(&apple(10), 0).unwrap();
        assert!(draft.is_empty());
        assert_eq!(draft.priced().unwrap().1, Decimal::ZERO);
    }

    #[test]
    fn test_set_quantity_uses_fresh_snapshot() {
        let mut draft = DraftOrder::new(OrderStream::Standard);
        draft.add(&apple(10), 2).unwrap();
        // Someone else sold most of the apples meanwhile
        assert!(draft.set_quantity(&apple(4), 5).is_err());
        draft.set_quantity(&apple(4), 4).unwrap();
        assert_eq!(draft.priced().unwrap().0[0].stock_before_sale, 4);
    }

    #[test]
    fn test_oversized_amount_is_validation_error() {
        let mut huge = apple(10);
        huge.price = Decimal::MAX;
        let mut draft = DraftOrder::new(OrderStream::Standard);
        draft.add(&huge, 1).unwrap();
        assert_eq!(draft.priced().unwrap().1, Decimal::MAX);

        draft.add(&huge, 1).unwrap();
        assert!(matches!(draft.priced().unwrap_err(), StockError::Validation(_)));

        let mut pear = huge.clone();
        pear.id = "pear".into();
        let err = price_lines(&[(huge, 1), (pear, 1)]).unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));
    }

    #[test]
    fn test_to_request() {
        let mut draft = DraftOrder::new(OrderStream::Franchise);
        draft.add(&apple(10), 2).unwrap();
        let request = draft.to_request(Some(PaymentMethod::Online), None, Some("k1".into()));
        assert_eq!(request.stream, OrderStream::Franchise);
        assert_eq!(
            request.lines,
            vec![DraftLine {
                stock_item_id: "apple".into(),
                quantity: 2
            }]
        );
        assert_eq!(request.idempotency_key.as_deref(), Some("k1"));
    }

    #[test]
    fn test_merge_lines() {
        let lines = vec![
            DraftLine { stock_item_id: "a".into(), quantity: 2 },
            DraftLine { stock_item_id: "b".into(), quantity: 1 },
            DraftLine { stock_item_id: "a".into(), quantity: 3 },
        ];
        let merged = merge_lines(&lines).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].quantity, 5);

        let zero = vec![DraftLine { stock_item_id: "a".into(), quantity: 0 }];
        assert!(matches!(merge_lines(&zero).unwrap_err(), StockError::Validation(_)));
    }
}
