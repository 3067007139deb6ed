//! Order Ledger
//!
//! Append-only record of finalized orders, one stream per order kind.
//!
//! # Numbering
//!
//! Each stream keeps a counter row holding the last issued suffix. A number is
//! only issued inside the write transaction that appends the order, so two
//! finalizations can never receive the same number. Appending an order that
//! already carries a number (imports, seeding) raises the counter to that
//! suffix when it is higher.

pub mod query;

use crate::db::StockStorage;
use crate::stock::{StockError, StockResult};
use chrono_tz::Tz;
use redb::WriteTransaction;
use shared::models::{Order, OrderFilter, OrderStream, SortDirection, StreamSelector};
use shared::util::{new_id, now_millis};

fn successor(stream: OrderStream, seq: u64) -> StockResult<u64> {
    seq.checked_add(1)
        .ok_or_else(|| StockError::validation(format!("{stream} order numbers are exhausted")))
}

#[derive(Clone)]
pub struct OrderLedger {
    storage: StockStorage,
    tz: Tz,
}

impl OrderLedger {
    pub fn new(storage: StockStorage, tz: Tz) -> Self {
        Self { storage, tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Number the next order of the stream will get (read-only preview)
    pub fn next_order_number(&self, stream: OrderStream) -> StockResult<String> {
        let current = self.storage.current_counter(stream)?;
        Ok(stream.format_number(successor(stream, current)?))
    }

    pub fn append(&self, order: Order) -> StockResult<Order> {
        let txn = self.storage.begin_write()?;
        let order = self.append_txn(&txn, order, now_millis())?;
        txn.commit()?;
        Ok(order)
    }

    /// Append inside a caller's transaction
    ///
    /// Assigns the id, creation time and number when absent.
    pub fn append_txn(
        &self,
        txn: &WriteTransaction,
        mut order: Order,
        now: i64,
    ) -> StockResult<Order> {
        if !order.totals_reconcile() {
            return Err(match order.computed_total() {
                Some(expected) => StockError::TotalMismatch {
                    total: order.total_amount,
                    expected,
                },
                None => StockError::validation("order total is too large"),
            });
        }

        if order.id.is_empty() {
            order.id = new_id();
        } else if self.storage.order_exists_txn(txn, &order.id)? {
            return Err(StockError::validation(format!(
                "order {} already exists",
                order.id
            )));
        }
        if order.created_at == 0 {
            order.created_at = now;
        }

        let stream = order.stream;
        let counter = self.storage.counter_txn(txn, stream)?;
        if order.order_number.is_empty() {
            let mut seq = successor(stream, counter)?;
            // Skip numbers taken by imports that never moved the counter
            while self
                .storage
                .order_number_taken_txn(txn, stream, &stream.format_number(seq))?
            {
                seq = successor(stream, seq)?;
            }
            order.order_number = stream.format_number(seq);
            self.storage.set_counter(txn, stream, seq)?;
        } else {
            if self
                .storage
                .order_number_taken_txn(txn, stream, &order.order_number)?
            {
                return Err(StockError::DuplicateOrderNumber {
                    stream,
                    order_number: order.order_number,
                });
            }
            if let Some(seq) = stream.parse_number(&order.order_number)
                && seq > counter
            {
                self.storage.set_counter(txn, stream, seq)?;
            }
        }

        self.storage.insert_order(txn, &order)?;
        tracing::debug!(
            order_id = %order.id,
            order_number = %order.order_number,
            stream = %stream,
            "Order appended"
        );
        Ok(order)
    }

    pub fn get(&self, id: &str) -> StockResult<Option<Order>> {
        Ok(self.storage.get_order(id)?)
    }

    /// Orders of the selected streams matching the filter
    pub fn query(&self, selector: StreamSelector, filter: &OrderFilter) -> StockResult<Vec<Order>> {
        let (from, to) = query::date_bounds(filter, self.tz);
        let mut orders = Vec::new();
        for &stream in selector.streams() {
            orders.extend(
                self.storage
                    .list_orders(stream, from, to)?
                    .into_iter()
                    .filter(|order| query::matches(order, filter)),
            );
        }
        Ok(query::sort_and_limit(orders, filter))
    }

    /// Every order of the selected streams, oldest first
    pub fn all_ascending(&self, selector: StreamSelector) -> StockResult<Vec<Order>> {
        self.query(
            selector,
            &OrderFilter {
                direction: Some(SortDirection::Asc),
                ..Default::default()
            },
        )
    }
}
