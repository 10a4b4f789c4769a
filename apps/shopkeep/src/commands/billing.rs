//! # Billing Commands
//!
//! The sales cart and order confirmation.
//!
//! ## Billing Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Billing Lifecycle                                    │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Customer │────►│ Invoice  │       │
//! │  │  Cart    │     │          │     │ details  │     │          │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │               ▲              │
//! │               add_to_sales_cart  set_sale_details        │              │
//! │               update_sales_item          │         confirm_order        │
//! │               remove_from_sales_cart     └───────────────┘              │
//! │                        │                                                │
//! │                        ▼                                                │
//! │               clear_sales_cart ──────────► (back to empty)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use shopkeep_core::{
    Money, Order, OrderStatistics, OrderStatus, PaymentMethod, SaleLine, SalesCart, SalesTotals,
};
use shopkeep_db::KeyValueStore;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{CartState, CatalogState, ConfigState, LedgerState};

// =============================================================================
// DTOs
// =============================================================================

/// Sales cart with totals and the customer form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesCartResponse {
    pub lines: Vec<SaleLine>,
    pub totals: SalesTotals,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub paid_input: String,
}

impl TryFrom<&SalesCart> for SalesCartResponse {
    type Error = ApiError;

    fn try_from(cart: &SalesCart) -> Result<Self, ApiError> {
        Ok(SalesCartResponse {
            lines: cart.lines().to_vec(),
            totals: cart.compute_totals()?,
            customer_name: cart.customer_name().to_string(),
            payment_method: cart.payment_method(),
            paid_input: cart.paid_input().to_string(),
        })
    }
}

/// Customer form fields. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetails {
    pub customer_name: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub paid_input: Option<String>,
}

/// One invoice row, amounts already formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub product_name: String,
    pub barcode: String,
    pub quantity: i64,
    pub unit_price: String,
    pub line_total: String,
}

/// Everything the print view needs for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    pub invoice_number: String,
    pub order_id: String,
    pub date: String,
    pub business_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub gstin: String,
    pub customer_name: String,
    pub items: Vec<InvoiceLine>,
    pub subtotal: String,
    pub tax_label: String,
    pub tax: String,
    pub total: String,
    pub paid: String,
    pub remaining: String,
    pub payment_method: String,
    pub status: String,
}

impl InvoiceView {
    pub fn new(order: &Order, config: &ConfigState) -> Self {
        let fmt = |m: Money| config.format_currency(m);

        InvoiceView {
            invoice_number: invoice_number(&order.id),
            order_id: order.id.clone(),
            date: order.date.format("%Y-%m-%d").to_string(),
            business_name: config.business_name.clone(),
            address: config.address.clone(),
            phone: config.phone.clone(),
            email: config.email.clone(),
            gstin: config.gstin.clone(),
            customer_name: order.customer_name.clone(),
            items: order
                .items
                .iter()
                .map(|item| InvoiceLine {
                    product_name: item.product_name.clone(),
                    barcode: item.product_barcode.clone(),
                    quantity: item.quantity,
                    unit_price: fmt(item.price_per_unit),
                    line_total: fmt(item.total_price),
                })
                .collect(),
            subtotal: fmt(order.subtotal),
            tax_label: config.tax_label(),
            tax: fmt(order.tax),
            total: fmt(order.total),
            paid: fmt(order.paid_amount),
            remaining: fmt(order.remaining_amount),
            payment_method: order.payment_method.to_string(),
            status: match order.status {
                OrderStatus::Completed => "completed",
                OrderStatus::Pending => "pending",
            }
            .to_string(),
        }
    }
}

/// `INV-` plus the last six digits of the order's timestamp.
///
/// `ORD-1769335800123-42` → `INV-800123`. Ids in another shape are used
/// whole.
pub fn invoice_number(order_id: &str) -> String {
    let stamp = order_id
        .split('-')
        .nth(1)
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()));

    match stamp {
        Some(digits) => format!("INV-{}", &digits[digits.len().saturating_sub(6)..]),
        None => format!("INV-{}", order_id),
    }
}

/// Result of confirming the sales cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderResponse {
    pub order: Order,
    pub invoice: InvoiceView,
    pub stats: OrderStatistics,
}

// =============================================================================
// Commands
// =============================================================================

pub async fn get_sales_cart(cart: &CartState) -> Result<SalesCartResponse, ApiError> {
    debug!("get_sales_cart command");
    cart.with_sales(|c| SalesCartResponse::try_from(c)).await
}

/// Adds one unit of a product.
///
/// `price_cents` overrides the catalog price for a new line. Unknown
/// products, and adds that would push the line past its limits, leave the
/// cart unchanged.
pub async fn add_to_sales_cart(
    catalog: &CatalogState,
    cart: &CartState,
    product_id: String,
    price_cents: Option<i64>,
) -> Result<SalesCartResponse, ApiError> {
    debug!(product_id = %product_id, ?price_cents, "add_to_sales_cart command");

    cart.with_sales_mut(|c| {
        c.add_item(catalog.inner(), &product_id, price_cents.map(Money::from_cents));
        SalesCartResponse::try_from(&*c)
    })
    .await
}

/// Sets a line's quantity; zero or less removes it.
///
/// A quantity above the line limit, or one whose totals would not fit,
/// is a `VALIDATION_ERROR` and the cart keeps its previous quantity.
pub async fn update_sales_item(
    cart: &CartState,
    product_id: String,
    quantity: i64,
) -> Result<SalesCartResponse, ApiError> {
    debug!(product_id = %product_id, quantity, "update_sales_item command");

    cart.with_sales_mut(|c| -> Result<SalesCartResponse, ApiError> {
        c.set_quantity(&product_id, quantity)?;
        SalesCartResponse::try_from(&*c)
    })
    .await
}

pub async fn remove_from_sales_cart(
    cart: &CartState,
    product_id: String,
) -> Result<SalesCartResponse, ApiError> {
    debug!(product_id = %product_id, "remove_from_sales_cart command");

    cart.with_sales_mut(|c| {
        c.remove_item(&product_id);
        SalesCartResponse::try_from(&*c)
    })
    .await
}

/// Empties the cart and resets the customer form.
pub async fn clear_sales_cart(cart: &CartState) -> Result<SalesCartResponse, ApiError> {
    debug!("clear_sales_cart command");

    cart.with_sales_mut(|c| {
        c.clear();
        SalesCartResponse::try_from(&*c)
    })
    .await
}

pub async fn set_sale_details(
    cart: &CartState,
    details: SaleDetails,
) -> Result<SalesCartResponse, ApiError> {
    debug!("set_sale_details command");

    cart.with_sales_mut(|c| {
        if let Some(name) = details.customer_name {
            c.set_customer_name(name);
        }
        if let Some(method) = details.payment_method {
            c.set_payment_method(method);
        }
        if let Some(paid) = details.paid_input {
            c.set_paid_input(paid);
        }
        SalesCartResponse::try_from(&*c)
    })
    .await
}

/// Confirms the sales cart as an order.
///
/// ## Flow
/// ```text
/// lock cart ──► validate + build order ──► append to ledger ──► clear cart
///                      │                          │
///                      ▼                          ▼
///               EMPTY_CART /               DATABASE_ERROR
///               VALIDATION_ERROR           (cart kept)
///               (cart kept)
/// ```
///
/// ## Returns
/// The stored order, its invoice and the order statistics after the write.
pub async fn confirm_order<S: KeyValueStore>(
    ledger: &LedgerState<S>,
    cart: &CartState,
    config: &ConfigState,
) -> Result<ConfirmOrderResponse, ApiError> {
    debug!("confirm_order command");

    let mut sales = cart.lock_sales().await;
    let committed = ledger
        .ledger()
        .commit_order(&mut sales, ledger.ids(), ledger.clock())
        .await?;
    drop(sales);

    info!(id = %committed.record.id, orders = committed.stats.total, "Invoice ready");

    Ok(ConfirmOrderResponse {
        invoice: InvoiceView::new(&committed.record, config),
        order: committed.record,
        stats: committed.stats,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::NaiveDate;
    use shopkeep_core::{FixedClock, IdGenerator};
    use shopkeep_db::MemoryStore;
    use std::sync::Arc;

    fn ledger(store: MemoryStore) -> LedgerState<MemoryStore> {
        let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 1, 25).unwrap());
        LedgerState::with_clock(store, Arc::new(clock), IdGenerator::with_seed(1))
    }

    async fn fill(catalog: &CatalogState, cart: &CartState, paid: &str) {
        add_to_sales_cart(catalog, cart, "1".to_string(), None).await.unwrap();
        add_to_sales_cart(catalog, cart, "4".to_string(), None).await.unwrap();
        update_sales_item(cart, "1".to_string(), 50).await.unwrap();
        update_sales_item(cart, "4".to_string(), 20).await.unwrap();
        set_sale_details(
            cart,
            SaleDetails {
                customer_name: Some("Green Valley Store".to_string()),
                payment_method: Some(PaymentMethod::Card),
                paid_input: Some(paid.to_string()),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_cart_commands() {
        let catalog = CatalogState::seeded();
        let cart = CartState::new();

        let response = add_to_sales_cart(&catalog, &cart, "3".to_string(), Some(6000))
            .await
            .unwrap();
        assert_eq!(response.lines[0].unit_price, Money::from_cents(6000));

        let response = add_to_sales_cart(&catalog, &cart, "missing".to_string(), None)
            .await
            .unwrap();
        assert_eq!(response.lines.len(), 1);

        let response = update_sales_item(&cart, "3".to_string(), 4).await.unwrap();
        assert_eq!(response.totals.subtotal, Money::from_cents(24_000));
        assert_eq!(response.totals.tax, Money::from_cents(4_320));

        let response = remove_from_sales_cart(&cart, "3".to_string()).await.unwrap();
        assert!(response.lines.is_empty());
        assert!(response.totals.total.is_zero());
    }

    #[tokio::test]
    async fn test_huge_quantity_is_a_validation_error() {
        let catalog = CatalogState::seeded();
        let cart = CartState::new();
        fill(&catalog, &cart, "0").await;

        let err = update_sales_item(&cart, "1".to_string(), 3_000_000_000_000_000)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        let kept = get_sales_cart(&cart).await.unwrap();
        assert_eq!(kept.lines[0].quantity, 50);
        assert_eq!(kept.totals.total, Money::from_cents(554_541));
    }

    #[tokio::test]
    async fn test_overflowing_price_override_leaves_cart_usable() {
        let catalog = CatalogState::seeded();
        let cart = CartState::new();

        add_to_sales_cart(&catalog, &cart, "3".to_string(), Some(i64::MAX / 2))
            .await
            .unwrap();
        let err = update_sales_item(&cart, "3".to_string(), 3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let response = add_to_sales_cart(&catalog, &cart, "3".to_string(), None)
            .await
            .unwrap();
        assert_eq!(response.lines[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_confirm_order_returns_invoice_and_stats() {
        let catalog = CatalogState::seeded();
        let cart = CartState::new();
        let config = ConfigState::default();
        let ledger = ledger(MemoryStore::new());
        fill(&catalog, &cart, "2000").await;

        let response = confirm_order(&ledger, &cart, &config).await.unwrap();

        assert_eq!(response.order.status, OrderStatus::Pending);
        assert_eq!(response.stats.total, 1);
        assert_eq!(response.stats.total_pending, Money::from_cents(354_541));

        let invoice = &response.invoice;
        assert_eq!(invoice.subtotal, "$4699.50");
        assert_eq!(invoice.tax_label, "Tax (18%)");
        assert_eq!(invoice.tax, "$845.91");
        assert_eq!(invoice.total, "$5545.41");
        assert_eq!(invoice.remaining, "$3545.41");
        assert_eq!(invoice.payment_method, "card");
        assert_eq!(invoice.date, "2026-01-25");
        assert_eq!(invoice.status, "pending");
        assert_eq!(invoice.items[1].line_total, "$2400.00");
        assert!(invoice.invoice_number.starts_with("INV-"));

        assert!(get_sales_cart(&cart).await.unwrap().lines.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_empty_cart() {
        let cart = CartState::new();
        let ledger = ledger(MemoryStore::new());

        let err = confirm_order(&ledger, &cart, &ConfigState::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }

    #[tokio::test]
    async fn test_confirm_storage_failure_keeps_cart() {
        let catalog = CatalogState::seeded();
        let cart = CartState::new();
        let store = MemoryStore::new();
        let ledger = ledger(store.clone());
        fill(&catalog, &cart, "5545.41").await;
        store.fail_writes(true);

        let err = confirm_order(&ledger, &cart, &ConfigState::default())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        let kept = get_sales_cart(&cart).await.unwrap();
        assert_eq!(kept.lines.len(), 2);
        assert_eq!(kept.customer_name, "Green Valley Store");
    }

    #[test]
    fn test_invoice_number() {
        assert_eq!(invoice_number("ORD-1769335800123-42"), "INV-800123");
        assert_eq!(invoice_number("ORD-123-1"), "INV-123");
        assert_eq!(invoice_number("ORD-001"), "INV-001");
        assert_eq!(invoice_number("custom"), "INV-custom");
    }
}
