//! # Ledger Store
//!
//! Orders and purchases, each kept as one JSON array under its own key,
//! newest record first.
//!
//! ## Read-Modify-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  append(record)                 update(id, patch)                       │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  get(key) ──► decode ──► Vec<R>  ◄── same                               │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  insert at head                 merge patch into matching id            │
//! │       │                              │ (no match: stop, nothing written)│
//! │       ▼                              ▼                                  │
//! │  set(key, whole array)          set(key, whole array)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole collection is rewritten on every change. Two processes sharing
//! one database can lose each other's writes; the last writer wins.
//!
//! ## Failure Policy
//! - `load` never fails. A missing, blank or unparseable collection reads as
//!   empty and the fault is logged.
//! - `append`/`update` report write failures. A collection the backend
//!   cannot read is never overwritten; a collection that reads but does not
//!   parse is replaced.

use serde::Serialize;
use tracing::{debug, info, warn};

use shopkeep_core::stats::{self, DashboardSummary, DateRange, OrderStatistics, ProfitLoss, PurchaseStatistics};
use shopkeep_core::{
    Clock, CoreError, IdGenerator, LedgerKind, LedgerRecord, Order, Purchase, PurchaseCart, SalesCart,
};

use crate::error::{CommitError, DbResult};
use crate::store::KeyValueStore;

// =============================================================================
// Decoding
// =============================================================================

/// Outcome of reading one stored collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// Nothing stored, or a blank value.
    Absent,
    /// Stored and parsed.
    Parsed(T),
    /// Stored but not parseable.
    Malformed { error: String },
}

impl<T: Default> Decoded<T> {
    /// The parsed value, or the default for absent and malformed data.
    pub fn or_default(self) -> T {
        match self {
            Decoded::Parsed(value) => value,
            Decoded::Absent | Decoded::Malformed { .. } => T::default(),
        }
    }
}

fn decode<R: LedgerRecord>(raw: Option<String>) -> Decoded<Vec<R>> {
    match raw {
        None => Decoded::Absent,
        Some(text) if text.trim().is_empty() => Decoded::Absent,
        Some(text) => match serde_json::from_str::<Vec<R>>(&text) {
            Ok(records) => Decoded::Parsed(records),
            Err(e) => Decoded::Malformed {
                error: e.to_string(),
            },
        },
    }
}

// =============================================================================
// Commit Result
// =============================================================================

/// A freshly stored record and the statistics of its collection right
/// after the write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Committed<R, S> {
    pub record: R,
    pub stats: S,
}

// =============================================================================
// Ledger Store
// =============================================================================

/// Durable order and purchase collections over a key-value backend.
#[derive(Debug, Clone)]
pub struct LedgerStore<S> {
    store: S,
}

impl<S: KeyValueStore> LedgerStore<S> {
    pub fn new(store: S) -> Self {
        LedgerStore { store }
    }

    /// The underlying key-value backend.
    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Reads and decodes the collection for `R`, keeping the distinction
    /// between absent, parsed and malformed data.
    pub async fn inspect<R: LedgerRecord>(&self) -> DbResult<Decoded<Vec<R>>> {
        let raw = self.store.get(R::KIND.storage_key()).await?;
        Ok(decode(raw))
    }

    /// All records of `R`'s kind, newest first. Never fails.
    pub async fn load<R: LedgerRecord>(&self) -> Vec<R> {
        match self.inspect::<R>().await {
            Ok(Decoded::Malformed { error }) => {
                warn!(kind = %R::KIND, error = %error, "Stored collection is malformed, reading as empty");
                Vec::new()
            }
            Ok(decoded) => decoded.or_default(),
            Err(e) => {
                warn!(kind = %R::KIND, error = %e, "Could not read collection, reading as empty");
                Vec::new()
            }
        }
    }

    /// Collection to modify: propagates backend errors, replaces malformed data.
    async fn load_for_write<R: LedgerRecord>(&self) -> DbResult<Vec<R>> {
        match self.inspect::<R>().await? {
            Decoded::Malformed { error } => {
                warn!(kind = %R::KIND, error = %error, "Replacing malformed collection");
                Ok(Vec::new())
            }
            decoded => Ok(decoded.or_default()),
        }
    }

    async fn save<R: LedgerRecord>(&self, records: &[R]) -> DbResult<()> {
        let json = serde_json::to_string(records)?;
        self.store.set(R::KIND.storage_key(), &json).await
    }

    /// Inserts `record` at the head of its collection and returns the
    /// collection as written. Duplicate ids are not checked.
    async fn prepend<R: LedgerRecord>(&self, record: R) -> DbResult<Vec<R>> {
        let mut records = self.load_for_write::<R>().await?;
        records.insert(0, record);
        self.save(&records).await?;
        Ok(records)
    }

    /// Inserts `record` at the head of its collection.
    pub async fn append<R: LedgerRecord>(&self, record: R) -> DbResult<()> {
        let id = record.id().to_string();
        let records = self.prepend(record).await?;
        debug!(kind = %R::KIND, id = %id, count = records.len(), "Record appended");
        Ok(())
    }

    /// Merges `patch` into the record with `id`.
    ///
    /// Returns `Ok(false)` and writes nothing when no record has that id.
    ///
    /// ## Errors
    /// [`CommitError::Rejected`] when the patch fails validation (blank
    /// name, negative paid amount). The collection is not written.
    pub async fn update<R: LedgerRecord>(
        &self,
        id: &str,
        patch: &R::Patch,
    ) -> Result<bool, CommitError> {
        let mut records = self.load_for_write::<R>().await?;

        let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            debug!(kind = %R::KIND, id = %id, "Update skipped: no such record");
            return Ok(false);
        };
        if let Err(e) = record.apply_patch(patch) {
            debug!(kind = %R::KIND, id = %id, error = %e, "Update rejected");
            return Err(CoreError::from(e).into());
        }

        self.save(&records).await?;
        debug!(kind = %R::KIND, id = %id, "Record updated");
        Ok(true)
    }

    /// Removes a whole collection. Returns whether anything was stored.
    pub async fn clear(&self, kind: LedgerKind) -> DbResult<bool> {
        let removed = self.store.remove(kind.storage_key()).await?;
        info!(kind = %kind, removed, "Collection cleared");
        Ok(removed)
    }

    /// Record with `id`, if any.
    pub async fn find<R: LedgerRecord>(&self, id: &str) -> Option<R> {
        self.load::<R>().await.into_iter().find(|r| r.id() == id)
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.load().await
    }

    pub async fn purchases(&self) -> Vec<Purchase> {
        self.load().await
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    pub async fn order_statistics(&self) -> OrderStatistics {
        stats::order_statistics(&self.orders().await)
    }

    pub async fn purchase_statistics(&self) -> PurchaseStatistics {
        stats::purchase_statistics(&self.purchases().await)
    }

    pub async fn profit_loss(&self, range: Option<DateRange>) -> ProfitLoss {
        stats::profit_loss(&self.orders().await, &self.purchases().await, range)
    }

    pub async fn dashboard(&self, range: Option<DateRange>) -> DashboardSummary {
        stats::dashboard(&self.orders().await, &self.purchases().await, range)
    }

    // -------------------------------------------------------------------------
    // Commit
    // -------------------------------------------------------------------------

    /// Confirms the sales cart.
    ///
    /// ## Steps
    /// 1. Validate the cart and build the order (id and date from `clock`)
    /// 2. Append it to the orders collection
    /// 3. Clear the cart
    /// 4. Return the order with statistics over the collection just written
    ///
    /// On any error the cart is left untouched.
    pub async fn commit_order(
        &self,
        cart: &mut SalesCart,
        ids: &IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Committed<Order, OrderStatistics>, CommitError> {
        let order = cart.build_order(|| ids.stamp(LedgerKind::Orders, clock))?;

        let orders = self.prepend(order.clone()).await?;
        cart.clear();

        info!(
            id = %order.id,
            customer = %order.customer_name,
            total = %order.total,
            status = ?order.status,
            "Order committed"
        );

        Ok(Committed {
            record: order,
            stats: stats::order_statistics(&orders),
        })
    }

    /// Confirms the purchase cart. Same steps as [`LedgerStore::commit_order`].
    pub async fn commit_purchase(
        &self,
        cart: &mut PurchaseCart,
        ids: &IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Committed<Purchase, PurchaseStatistics>, CommitError> {
        let purchase = cart.build_purchase(|| ids.stamp(LedgerKind::Purchases, clock))?;

        let purchases = self.prepend(purchase.clone()).await?;
        cart.clear();

        info!(
            id = %purchase.id,
            supplier = %purchase.supplier_name,
            total_cost = %purchase.total_cost,
            status = ?purchase.status,
            "Purchase committed"
        );

        Ok(Committed {
            record: purchase,
            stats: stats::purchase_statistics(&purchases),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use shopkeep_core::{
        Catalog, CoreError, FixedClock, Money, OrderPatch, OrderStatus, PaymentMethod,
        PurchasePatch, PurchaseStatus,
    };

    fn clock() -> FixedClock {
        FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 1, 25).unwrap())
    }

    fn sales_cart(paid: &str) -> SalesCart {
        let catalog = Catalog::seeded();
        let mut cart = SalesCart::new();
        cart.add_item(&catalog, "1", None);
        cart.add_item(&catalog, "4", None);
        cart.set_quantity("1", 50).unwrap();
        cart.set_quantity("4", 20).unwrap();
        cart.set_customer_name("Green Valley Store");
        cart.set_payment_method(PaymentMethod::Upi);
        cart.set_paid_input(paid);
        cart
    }

    fn purchase_cart(cost_cents: i64, paid: &str) -> PurchaseCart {
        let catalog = Catalog::seeded();
        let mut cart = PurchaseCart::new();
        cart.add_item(&catalog, "9", Some(Money::from_cents(cost_cents)));
        cart.set_supplier_name("Sweet Supplies");
        cart.set_paid_input(paid);
        cart
    }

    async fn commit_orders(ledger: &LedgerStore<MemoryStore>, n: usize) -> Vec<Order> {
        let ids = IdGenerator::with_seed(42);
        let clock = clock();
        let mut committed = Vec::new();
        for _ in 0..n {
            let mut cart = sales_cart("100");
            committed.push(ledger.commit_order(&mut cart, &ids, &clock).await.unwrap().record);
        }
        committed
    }

    #[tokio::test]
    async fn test_load_absent_and_blank() {
        let store = MemoryStore::new();
        let ledger = LedgerStore::new(store.clone());

        assert!(ledger.orders().await.is_empty());
        assert_eq!(ledger.inspect::<Order>().await.unwrap(), Decoded::Absent);

        store.set("wholesale_orders", "   ").await.unwrap();
        assert_eq!(ledger.inspect::<Order>().await.unwrap(), Decoded::Absent);
        assert!(ledger.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_reads_empty() {
        let store = MemoryStore::new();
        let ledger = LedgerStore::new(store.clone());
        store.set("wholesale_purchases", "{not json").await.unwrap();

        assert!(ledger.purchases().await.is_empty());
        assert!(matches!(
            ledger.inspect::<Purchase>().await.unwrap(),
            Decoded::Malformed { .. }
        ));
    }

    #[tokio::test]
    async fn test_load_read_failure_reads_empty() {
        let store = MemoryStore::new();
        let ledger = LedgerStore::new(store.clone());
        commit_orders(&ledger, 1).await;

        store.fail_reads(true);
        assert!(ledger.orders().await.is_empty());
        assert!(ledger.inspect::<Order>().await.is_err());
    }

    #[tokio::test]
    async fn test_append_newest_first() {
        let ledger = LedgerStore::new(MemoryStore::new());
        let committed = commit_orders(&ledger, 3).await;

        let ids: Vec<String> = ledger.orders().await.into_iter().map(|o| o.id).collect();
        let expected: Vec<String> = committed.iter().rev().map(|o| o.id.clone()).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_append_does_not_check_duplicates() {
        let ledger = LedgerStore::new(MemoryStore::new());
        let order = commit_orders(&ledger, 1).await.remove(0);

        ledger.append(order.clone()).await.unwrap();

        let orders = ledger.orders().await;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, orders[1].id);
    }

    #[tokio::test]
    async fn test_append_replaces_malformed_collection() {
        let store = MemoryStore::new();
        let ledger = LedgerStore::new(store.clone());
        store.set("wholesale_orders", "[{\"broken\":").await.unwrap();

        commit_orders(&ledger, 1).await;

        assert_eq!(ledger.orders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_append_refuses_unreadable_collection() {
        let store = MemoryStore::new();
        let ledger = LedgerStore::new(store.clone());
        let order = commit_orders(&ledger, 1).await.remove(0);

        store.fail_reads(true);
        assert!(ledger.append(order).await.is_err());

        store.fail_reads(false);
        assert_eq!(ledger.orders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_append_reports_write_failure() {
        let store = MemoryStore::new();
        let ledger = LedgerStore::new(store.clone());
        let order = commit_orders(&ledger, 1).await.remove(0);

        store.fail_writes(true);
        let err = ledger.append(order).await.unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));
    }

    #[tokio::test]
    async fn test_update_settles_order() {
        let ledger = LedgerStore::new(MemoryStore::new());
        let mut cart = sales_cart("2000");
        let committed = ledger
            .commit_order(&mut cart, &IdGenerator::with_seed(1), &clock())
            .await
            .unwrap();
        assert_eq!(committed.record.status, OrderStatus::Pending);

        let patch = OrderPatch {
            paid_amount: Some(Money::from_cents(554_541)),
            ..OrderPatch::default()
        };
        assert!(ledger.update::<Order>(&committed.record.id, &patch).await.unwrap());

        let order = ledger.find::<Order>(&committed.record.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.remaining_amount.is_zero());
        assert_eq!(order.customer_name, "Green Valley Store");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let store = MemoryStore::new();
        let ledger = LedgerStore::new(store.clone());
        commit_orders(&ledger, 1).await;
        let before = store.get("wholesale_orders").await.unwrap();

        // A failing write would surface if update tried to save.
        store.fail_writes(true);
        let patch = PurchasePatch {
            supplier_name: Some("Nobody".to_string()),
            ..PurchasePatch::default()
        };
        assert!(!ledger.update::<Purchase>("PUR-0-0", &patch).await.unwrap());
        assert!(!ledger
            .update::<Order>("ORD-0-0", &OrderPatch::default())
            .await
            .unwrap());

        assert_eq!(store.get("wholesale_orders").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_patch_without_writing() {
        let store = MemoryStore::new();
        let ledger = LedgerStore::new(store.clone());
        let order = commit_orders(&ledger, 1).await.remove(0);
        let before = store.get("wholesale_orders").await.unwrap();

        let blank = OrderPatch {
            customer_name: Some("   ".to_string()),
            paid_amount: Some(Money::from_cents(554_541)),
            ..OrderPatch::default()
        };
        let err = ledger.update::<Order>(&order.id, &blank).await.unwrap_err();
        assert!(matches!(err, CommitError::Rejected(CoreError::Validation(_))));

        let negative = OrderPatch {
            paid_amount: Some(Money::from_cents(-1)),
            ..OrderPatch::default()
        };
        let err = ledger.update::<Order>(&order.id, &negative).await.unwrap_err();
        assert!(matches!(err, CommitError::Rejected(CoreError::Validation(_))));

        assert_eq!(store.get("wholesale_orders").await.unwrap(), before);
        let stored = ledger.find::<Order>(&order.id).await.unwrap();
        assert_eq!(stored.customer_name, "Green Valley Store");
        assert!(!stored.paid_amount.is_negative());
    }

    #[tokio::test]
    async fn test_update_purchase() {
        let ledger = LedgerStore::new(MemoryStore::new());
        let mut cart = purchase_cart(10_000, "0");
        let committed = ledger
            .commit_purchase(&mut cart, &IdGenerator::with_seed(5), &clock())
            .await
            .unwrap();

        let patch = PurchasePatch {
            supplier_name: Some("  Sweet Supplies Ltd ".to_string()),
            paid_amount: Some(Money::from_cents(10_000)),
            date: NaiveDate::from_ymd_opt(2026, 1, 20),
        };
        assert!(ledger.update::<Purchase>(&committed.record.id, &patch).await.unwrap());

        let purchase = ledger.purchases().await.remove(0);
        assert_eq!(purchase.supplier_name, "Sweet Supplies Ltd");
        assert_eq!(purchase.status, PurchaseStatus::Paid);
        assert_eq!(purchase.date.to_string(), "2026-01-20");
    }

    #[tokio::test]
    async fn test_clear() {
        let ledger = LedgerStore::new(MemoryStore::new());
        commit_orders(&ledger, 2).await;

        assert!(ledger.clear(LedgerKind::Orders).await.unwrap());
        assert!(!ledger.clear(LedgerKind::Orders).await.unwrap());
        assert!(ledger.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_commit_order_updates_head_and_stats() {
        let ledger = LedgerStore::new(MemoryStore::new());
        commit_orders(&ledger, 2).await;
        let before = ledger.order_statistics().await;

        let mut cart = sales_cart("5545.41");
        let committed = ledger
            .commit_order(&mut cart, &IdGenerator::with_seed(9), &clock())
            .await
            .unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.customer_name(), "");
        assert_eq!(committed.record.status, OrderStatus::Completed);
        assert_eq!(committed.record.date.to_string(), "2026-01-25");
        assert!(committed.record.id.starts_with("ORD-"));
        assert_eq!(committed.stats.total, before.total + 1);
        assert_eq!(committed.stats, ledger.order_statistics().await);
        assert_eq!(ledger.orders().await[0], committed.record);
    }

    #[tokio::test]
    async fn test_rejected_commit_keeps_cart_and_store() {
        let ledger = LedgerStore::new(MemoryStore::new());
        let ids = IdGenerator::with_seed(2);

        let mut empty = SalesCart::new();
        let err = ledger.commit_order(&mut empty, &ids, &clock()).await.unwrap_err();
        assert!(matches!(err, CommitError::Rejected(CoreError::EmptyCart { .. })));

        let mut cart = sales_cart("-5");
        let snapshot = cart.clone();
        let err = ledger.commit_order(&mut cart, &ids, &clock()).await.unwrap_err();
        assert!(matches!(err, CommitError::Rejected(CoreError::Validation(_))));
        assert_eq!(cart, snapshot);

        assert!(ledger.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_cart() {
        let store = MemoryStore::new();
        let ledger = LedgerStore::new(store.clone());
        store.fail_writes(true);

        let mut cart = purchase_cart(3_000, "30");
        let snapshot = cart.clone();
        let err = ledger
            .commit_purchase(&mut cart, &IdGenerator::with_seed(3), &clock())
            .await
            .unwrap_err();

        assert!(matches!(err, CommitError::Storage(_)));
        assert_eq!(cart, snapshot);
    }

    #[tokio::test]
    async fn test_purchase_statistics_and_profit_loss() {
        let ledger = LedgerStore::new(MemoryStore::new());
        let ids = IdGenerator::with_seed(11);
        let clock = clock();

        let mut first = purchase_cart(10_000, "100");
        ledger.commit_purchase(&mut first, &ids, &clock).await.unwrap();
        let mut second = purchase_cart(20_000, "50");
        let committed = ledger.commit_purchase(&mut second, &ids, &clock).await.unwrap();

        let stats = committed.stats;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.paid, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.total_expense, Money::from_cents(30_000));
        assert_eq!(stats.total_paid, Money::from_cents(15_000));
        assert_eq!(stats.total_pending, Money::from_cents(15_000));

        let mut sale = sales_cart("0");
        ledger.commit_order(&mut sale, &ids, &clock).await.unwrap();

        let pl = ledger.profit_loss(None).await;
        assert_eq!(pl.total_sales, Money::from_cents(554_541));
        assert_eq!(pl.total_purchases, Money::from_cents(30_000));
        assert_eq!(pl.profit_loss, Money::from_cents(524_541));

        let day = clock.today();
        assert_eq!(ledger.profit_loss(Some(DateRange::new(day, day))).await, pl);

        let summary = ledger.dashboard(None).await;
        assert_eq!(summary.orders.total, 1);
        assert_eq!(summary.purchases.total, 2);
    }

    #[tokio::test]
    async fn test_sqlite_backed_ledger_persists_currency_json() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = LedgerStore::new(db.kv());

        let mut cart = sales_cart("2000");
        let committed = ledger
            .commit_order(&mut cart, &IdGenerator::with_seed(8), &clock())
            .await
            .unwrap();

        let orders = ledger.orders().await;
        assert_eq!(orders, vec![committed.record]);

        let raw = ledger.backend().get("wholesale_orders").await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["total"], 5545.41);
        assert_eq!(json[0]["remainingAmount"], 3545.41);
        assert_eq!(json[0]["paidAmount"], 2000.0);
        assert_eq!(json[0]["items"][0]["pricePerUnit"], 45.99);
        assert_eq!(json[0]["paymentMethod"], "upi");
        assert_eq!(json[0]["status"], "pending");
        assert_eq!(json[0]["date"], "2026-01-25");
    }

    #[tokio::test]
    async fn test_reads_collection_written_with_currency_numbers() {
        let store = MemoryStore::new();
        let ledger = LedgerStore::new(store.clone());
        store
            .set(
                "wholesale_orders",
                r#"[{"id":"ORD-1769335800000-7","date":"2026-01-25","customerName":"Green Valley Store",
                    "items":[{"productId":"1","productName":"Premium Rice","productBarcode":"1234567890123",
                              "quantity":50,"pricePerUnit":45.99,"totalPrice":2299.5}],
                    "subtotal":2299.5,"tax":413.91,"total":2713.41,"paymentMethod":"cash",
                    "paidAmount":118,"remainingAmount":2595.41,"status":"pending"}]"#,
            )
            .await
            .unwrap();

        let orders = ledger.orders().await;

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items[0].price_per_unit, Money::from_cents(4599));
        assert_eq!(orders[0].items[0].total_price, Money::from_cents(229_950));
        assert_eq!(orders[0].total, Money::from_cents(271_341));
        assert_eq!(orders[0].paid_amount, Money::from_cents(11_800));
        assert_eq!(orders[0].remaining_amount, Money::from_cents(259_541));
    }
}
