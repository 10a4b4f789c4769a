//! # Domain Types
//!
//! Ledger record types shared by every layer of Shopkeep.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ledger Records                                  │
//! │                                                                         │
//! │  ┌─────────────────────┐              ┌─────────────────────┐          │
//! │  │       Order         │              │      Purchase       │          │
//! │  │  ─────────────────  │              │  ─────────────────  │          │
//! │  │  id  "ORD-…"        │              │  id  "PUR-…"        │          │
//! │  │  customer_name      │              │  supplier_name      │          │
//! │  │  items[OrderItem]   │              │  items[PurchaseItem]│          │
//! │  │  subtotal/tax/total │              │  total_cost         │          │
//! │  │  paid / remaining   │              │  paid / remaining   │          │
//! │  │  OrderStatus        │              │  PurchaseStatus     │          │
//! │  └─────────────────────┘              └─────────────────────┘          │
//! │            │                                     │                      │
//! │            └──────────── LedgerRecord ───────────┘                      │
//! │                 (kind, storage key, id, date, patch)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Items copy product name, barcode and price at confirmation time, so a
//! record reads the same even if the catalog changes later.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{validate_counterparty_name, validate_paid_amount, ValidationResult};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1800 bps = 18%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer settled (or partially settled) an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Upi,
    Card,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Statuses
// =============================================================================

/// Settlement status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
    Pending,
}

impl OrderStatus {
    /// `Completed` iff the paid amount covers the total.
    pub fn for_payment(paid: Money, total: Money) -> Self {
        if paid >= total {
            OrderStatus::Completed
        } else {
            OrderStatus::Pending
        }
    }
}

/// Settlement status of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Paid,
    Pending,
}

impl PurchaseStatus {
    /// `Paid` iff the paid amount covers the total cost.
    pub fn for_payment(paid: Money, total_cost: Money) -> Self {
        if paid >= total_cost {
            PurchaseStatus::Paid
        } else {
            PurchaseStatus::Pending
        }
    }
}

// =============================================================================
// Ledger Kind
// =============================================================================

/// The two persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    Orders,
    Purchases,
}

impl LedgerKind {
    /// Stable key the collection is persisted under.
    pub const fn storage_key(&self) -> &'static str {
        match self {
            LedgerKind::Orders => "wholesale_orders",
            LedgerKind::Purchases => "wholesale_purchases",
        }
    }

    /// Prefix used for generated record ids.
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            LedgerKind::Orders => "ORD",
            LedgerKind::Purchases => "PUR",
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LedgerKind::Orders => "orders",
            LedgerKind::Purchases => "purchases",
        })
    }
}

/// A record that lives in one of the ledger collections.
///
/// The ledger store is generic over this trait, so orders and purchases
/// share one load/append/update implementation.
pub trait LedgerRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Which collection this record belongs to.
    const KIND: LedgerKind;

    /// Partial update accepted by [`LedgerRecord::apply_patch`].
    type Patch: Send + Sync;

    fn id(&self) -> &str;

    fn date(&self) -> NaiveDate;

    /// Merges `patch` into the record, keeping the record's invariants.
    ///
    /// Every field is validated before anything is written; on error the
    /// record is unchanged.
    fn apply_patch(&mut self, patch: &Self::Patch) -> ValidationResult<()>;
}

// =============================================================================
// Order
// =============================================================================

/// One sold line, frozen at confirmation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub product_barcode: String,
    pub quantity: i64,
    pub price_per_unit: Money,
    /// Always `price_per_unit × quantity`.
    pub total_price: Money,
}

/// A confirmed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub paid_amount: Money,
    pub remaining_amount: Money,
    pub status: OrderStatus,
}

impl Order {
    /// Sets the paid amount and re-derives the balance and status.
    pub fn settle(&mut self, paid: Money) {
        self.paid_amount = paid;
        self.remaining_amount = self.total.saturating_sub(paid);
        self.status = OrderStatus::for_payment(paid, self.total);
    }

    /// Total number of units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }
}

/// Fields an [`Order`] may be patched with after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub customer_name: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub paid_amount: Option<Money>,
    pub date: Option<NaiveDate>,
}

impl LedgerRecord for Order {
    const KIND: LedgerKind = LedgerKind::Orders;
    type Patch = OrderPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn apply_patch(&mut self, patch: &OrderPatch) -> ValidationResult<()> {
        let name = patch
            .customer_name
            .as_deref()
            .map(|n| validate_counterparty_name("customer name", n))
            .transpose()?;
        let paid = patch.paid_amount.map(validate_paid_amount).transpose()?;

        if let Some(name) = name {
            self.customer_name = name;
        }
        if let Some(method) = patch.payment_method {
            self.payment_method = method;
        }
        if let Some(paid) = paid {
            self.settle(paid);
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        Ok(())
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// One acquired line, frozen at confirmation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub cost_price_per_unit: Money,
    /// Always `cost_price_per_unit × quantity`.
    pub total_cost: Money,
}

/// A confirmed stock acquisition from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub supplier_name: String,
    pub items: Vec<PurchaseItem>,
    pub total_cost: Money,
    pub paid_amount: Money,
    pub remaining_amount: Money,
    pub status: PurchaseStatus,
}

impl Purchase {
    /// Sets the paid amount and re-derives the balance and status.
    pub fn settle(&mut self, paid: Money) {
        self.paid_amount = paid;
        self.remaining_amount = self.total_cost.saturating_sub(paid);
        self.status = PurchaseStatus::for_payment(paid, self.total_cost);
    }
}

/// Fields a [`Purchase`] may be patched with after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePatch {
    pub supplier_name: Option<String>,
    pub paid_amount: Option<Money>,
    pub date: Option<NaiveDate>,
}

impl LedgerRecord for Purchase {
    const KIND: LedgerKind = LedgerKind::Purchases;
    type Patch = PurchasePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn apply_patch(&mut self, patch: &PurchasePatch) -> ValidationResult<()> {
        let name = patch
            .supplier_name
            .as_deref()
            .map(|n| validate_counterparty_name("supplier name", n))
            .transpose()?;
        let paid = patch.paid_amount.map(validate_paid_amount).transpose()?;

        if let Some(name) = name {
            self.supplier_name = name;
        }
        if let Some(paid) = paid {
            self.settle(paid);
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_order(paid_cents: i64) -> Order {
        let total = Money::from_cents(554_541);
        let mut order = Order {
            id: "ORD-1769300000000-42".to_string(),
            date: date("2026-01-25"),
            customer_name: "Green Valley Store".to_string(),
            items: vec![OrderItem {
                product_id: "1".to_string(),
                product_name: "Premium Rice".to_string(),
                product_barcode: "1234567890123".to_string(),
                quantity: 50,
                price_per_unit: Money::from_cents(4599),
                total_price: Money::from_cents(229_950),
            }],
            subtotal: Money::from_cents(469_950),
            tax: Money::from_cents(84_591),
            total,
            payment_method: PaymentMethod::Cash,
            paid_amount: Money::zero(),
            remaining_amount: total,
            status: OrderStatus::Pending,
        };
        order.settle(Money::from_cents(paid_cents));
        order
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1800);
        assert_eq!(rate.bps(), 1800);
        assert!((rate.percentage() - 18.0).abs() < 0.001);
    }

    #[test]
    fn test_status_derivation() {
        let total = Money::from_cents(10_000);
        assert_eq!(OrderStatus::for_payment(total, total), OrderStatus::Completed);
        assert_eq!(
            OrderStatus::for_payment(Money::from_cents(10_001), total),
            OrderStatus::Completed
        );
        assert_eq!(
            OrderStatus::for_payment(Money::from_cents(9_999), total),
            OrderStatus::Pending
        );
        assert_eq!(PurchaseStatus::for_payment(total, total), PurchaseStatus::Paid);
        assert_eq!(
            PurchaseStatus::for_payment(Money::zero(), total),
            PurchaseStatus::Pending
        );
    }

    #[test]
    fn test_storage_keys() {
        assert_eq!(LedgerKind::Orders.storage_key(), "wholesale_orders");
        assert_eq!(LedgerKind::Purchases.storage_key(), "wholesale_purchases");
        assert_eq!(Order::KIND.id_prefix(), "ORD");
        assert_eq!(Purchase::KIND.id_prefix(), "PUR");
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let order = sample_order(200_000);
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["customerName"], "Green Valley Store");
        assert_eq!(json["date"], "2026-01-25");
        assert_eq!(json["paymentMethod"], "cash");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["total"], 5545.41);
        assert_eq!(json["remainingAmount"], 3545.41);
        assert_eq!(json["items"][0]["productBarcode"], "1234567890123");
        assert_eq!(json["items"][0]["pricePerUnit"], 45.99);
    }

    #[test]
    fn test_patch_paid_amount_rederives_status() {
        let mut order = sample_order(200_000);
        assert_eq!(order.status, OrderStatus::Pending);

        order
            .apply_patch(&OrderPatch {
                paid_amount: Some(Money::from_cents(554_541)),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.remaining_amount.is_zero());
    }

    #[test]
    fn test_order_patch_rejects_blank_name_without_writing() {
        let mut order = sample_order(200_000);
        let before = order.clone();

        let err = order
            .apply_patch(&OrderPatch {
                customer_name: Some("   ".to_string()),
                payment_method: Some(PaymentMethod::Upi),
                paid_amount: Some(Money::from_cents(554_541)),
                date: Some(date("2026-02-01")),
            })
            .unwrap_err();

        assert!(matches!(err, ValidationError::Required { .. }));
        assert_eq!(order, before);
    }

    #[test]
    fn test_order_patch_rejects_negative_paid_amount() {
        let mut order = sample_order(200_000);
        let before = order.clone();

        let err = order
            .apply_patch(&OrderPatch {
                customer_name: Some("City Mart".to_string()),
                paid_amount: Some(Money::from_cents(-1)),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, ValidationError::Negative { .. }));
        assert_eq!(order, before);
        assert!(order.remaining_amount <= order.total);
    }

    #[test]
    fn test_order_patch_rejects_overlong_name() {
        let mut order = sample_order(0);

        assert!(matches!(
            order.apply_patch(&OrderPatch {
                customer_name: Some("A".repeat(300)),
                ..Default::default()
            }),
            Err(ValidationError::TooLong { .. })
        ));
        assert_eq!(order.customer_name, "Green Valley Store");
    }

    #[test]
    fn test_purchase_patch_trims_supplier() {
        let mut purchase = Purchase {
            id: "PUR-1-1".to_string(),
            date: date("2026-01-20"),
            supplier_name: "Old".to_string(),
            items: vec![],
            total_cost: Money::from_cents(20_000),
            paid_amount: Money::zero(),
            remaining_amount: Money::from_cents(20_000),
            status: PurchaseStatus::Pending,
        };

        purchase
            .apply_patch(&PurchasePatch {
                supplier_name: Some("  Agro Traders ".to_string()),
                paid_amount: Some(Money::from_cents(5_000)),
                date: None,
            })
            .unwrap();

        assert_eq!(purchase.supplier_name, "Agro Traders");
        assert_eq!(purchase.remaining_amount, Money::from_cents(15_000));
        assert_eq!(purchase.status, PurchaseStatus::Pending);

        let before = purchase.clone();
        assert!(purchase
            .apply_patch(&PurchasePatch {
                supplier_name: Some(String::new()),
                paid_amount: None,
                date: Some(date("2026-03-01")),
            })
            .is_err());
        assert!(purchase
            .apply_patch(&PurchasePatch {
                supplier_name: None,
                paid_amount: Some(Money::from_cents(-500)),
                date: None,
            })
            .is_err());
        assert_eq!(purchase, before);
    }
}
