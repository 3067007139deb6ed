//! First-run provisioning
//!
//! Runs once from bootstrap. The `seeding_status` metadata row records that
//! provisioning happened; a missing row just means this is the first run.

use crate::catalog::CatalogStore;
use crate::db::StockStorage;
use crate::ledger::OrderLedger;
use crate::stock::StockResult;
use crate::stock::draft::price_lines;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{
    BuyerInfo, Order, OrderStream, PaymentMethod, StockItem, StockItemCreate, Zone,
};
use shared::util::now_millis;

const SEEDING_STATUS_KEY: &str = "seeding_status";
const DAY_MILLIS: i64 = 86_400_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedingStatus {
    pub provisioned_at: i64,
    pub seeded_examples: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Flag already present
    AlreadyProvisioned,
    /// Example catalog and orders written
    Seeded,
    /// Seeding disabled or the store already holds data
    Skipped,
}

fn create(name: &str, price: i64, quantity: u32, barcode: &str) -> StockItemCreate {
    StockItemCreate {
        name: name.to_string(),
        price: Decimal::new(price, 2),
        quantity,
        barcode: barcode.to_string(),
    }
}

fn example_order(
    stream: OrderStream,
    lines: &[(&StockItem, u32)],
    created_at: i64,
    payment_method: PaymentMethod,
    buyer: Option<BuyerInfo>,
) -> StockResult<Order> {
    let picked: Vec<(StockItem, u32)> = lines
        .iter()
        .map(|(item, quantity)| ((*item).clone(), *quantity))
        .collect();
    let (items, total_amount) = price_lines(&picked)?;
    Ok(Order {
        id: String::new(),
        order_number: stream.format_number(1),
        stream,
        total_amount,
        items,
        created_at,
        payment_method: Some(payment_method),
        buyer,
    })
}

fn store_is_empty(storage: &StockStorage) -> StockResult<bool> {
    for zone in Zone::ALL {
        if storage.count_items(zone)? > 0 {
            return Ok(false);
        }
    }
    for stream in OrderStream::ALL {
        if storage.count_orders(stream)? > 0 {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Seed example data on an empty store, then mark the store provisioned
pub fn provision(storage: &StockStorage, tz: Tz, seed_examples: bool) -> StockResult<ProvisionOutcome> {
    let txn = storage.begin_write()?;
    if storage
        .get_metadata_txn::<SeedingStatus>(&txn, SEEDING_STATUS_KEY)?
        .is_some()
    {
        tracing::debug!("Store already provisioned");
        return Ok(ProvisionOutcome::AlreadyProvisioned);
    }

    let now = now_millis();
    let seed = seed_examples && store_is_empty(storage)?;
    if seed {
        let catalog = CatalogStore::new(storage.clone(), 0);
        let ledger = OrderLedger::new(storage.clone(), tz);

        let apples = catalog.add_txn(&txn, Zone::Inventory, create("Organic Apples", 299, 50, "PROD-APPLE-001"), now)?;
        let rice = catalog.add_txn(&txn, Zone::Inventory, create("Brown Rice (1kg)", 549, 30, "PROD-RICE-BR01"), now)?;
        catalog.add_txn(&txn, Zone::Inventory, create("Almond Milk", 319, 5, "PROD-MILK-ALM01"), now)?;

        catalog.add_txn(&txn, Zone::Godown, create("Organic Apples - Bulk", 250, 200, "PROD-APPLE-BULK"), now)?;
        let oil = catalog.add_txn(&txn, Zone::Godown, create("Sunflower Oil (5L Can)", 2500, 50, "PROD-SUNOIL-5L"), now)?;
        let flour = catalog.add_txn(&txn, Zone::Godown, create("Wheat Flour (10kg Bag)", 800, 100, "PROD-WFLOUR-10KG"), now)?;

        ledger.append_txn(
            &txn,
            example_order(
                OrderStream::Standard,
                &[(&apples, 2), (&rice, 1)],
                now - 2 * DAY_MILLIS,
                PaymentMethod::Cash,
                None,
            )?,
            now,
        )?;
        ledger.append_txn(
            &txn,
            example_order(
                OrderStream::Franchise,
                &[(&oil, 2), (&flour, 5)],
                now - 3 * DAY_MILLIS,
                PaymentMethod::Online,
                Some(BuyerInfo {
                    buyer_name: "Kadapa Franchise Store".into(),
                    buyer_phone: "9876543210".into(),
                    city: "Kadapa".into(),
                }),
            )?,
            now,
        )?;
    }

    storage.set_metadata(
        &txn,
        SEEDING_STATUS_KEY,
        &SeedingStatus {
            provisioned_at: now,
            seeded_examples: seed,
        },
    )?;
    txn.commit()?;

    if seed {
        tracing::info!("Example catalog and orders seeded");
        Ok(ProvisionOutcome::Seeded)
    } else {
        tracing::info!(seed_examples, "Store provisioned without example data");
        Ok(ProvisionOutcome::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderFilter, StockFilter, StreamSelector};

    #[test]
    fn test_seeds_once() {
        let storage = StockStorage::open_in_memory().unwrap();
        assert_eq!(provision(&storage, chrono_tz::UTC, true).unwrap(), ProvisionOutcome::Seeded);
        assert_eq!(
            provision(&storage, chrono_tz::UTC, true).unwrap(),
            ProvisionOutcome::AlreadyProvisioned
        );

        let catalog = CatalogStore::new(storage.clone(), 100);
        assert_eq!(catalog.list(Zone::Inventory, &StockFilter::default()).unwrap().len(), 3);
        assert_eq!(catalog.list(Zone::Godown, &StockFilter::default()).unwrap().len(), 3);

        let ledger = OrderLedger::new(storage, chrono_tz::UTC);
        let orders = ledger.query(StreamSelector::All, &OrderFilter::default()).unwrap();
        assert_eq!(orders.len(), 2);
        let invoice = orders.iter().find(|o| o.stream == OrderStream::Franchise).unwrap();
        assert_eq!(invoice.order_number, "FINV-0001");
        assert_eq!(invoice.total_amount, Decimal::new(9000, 2));
        assert_eq!(ledger.next_order_number(OrderStream::Standard).unwrap(), "ORD-0002");
    }

    #[test]
    fn test_disabled_or_non_empty_store_is_not_seeded() {
        let storage = StockStorage::open_in_memory().unwrap();
        assert_eq!(provision(&storage, chrono_tz::UTC, false).unwrap(), ProvisionOutcome::Skipped);
        assert_eq!(storage.count_items(Zone::Inventory).unwrap(), 0);

        let storage = StockStorage::open_in_memory().unwrap();
        CatalogStore::new(storage.clone(), 100)
            .add(Zone::Godown, create("Rice", 500, 1, "R1"))
            .unwrap();
        assert_eq!(provision(&storage, chrono_tz::UTC, true).unwrap(), ProvisionOutcome::Skipped);
        assert_eq!(storage.count_items(Zone::Inventory).unwrap(), 0);
    }
}
