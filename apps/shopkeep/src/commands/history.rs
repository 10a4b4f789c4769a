//! # History Commands
//!
//! Confirmed orders and purchases, their statistics, profit/loss and the
//! dashboard summary.
//!
//! Reads never fail: a missing or damaged collection reads as empty (the
//! ledger logs the fault). Writes report storage errors.
//!
//! ## Date Ranges
//! `from` and `to` are ISO dates (`YYYY-MM-DD`), both inclusive. Both or
//! neither must be given; neither means all time.

use serde::{Deserialize, Serialize};
use shopkeep_core::validation::{parse_amount_input, parse_iso_date, validate_paid_amount};
use shopkeep_core::{
    DashboardSummary, DateRange, LedgerKind, LedgerRecord, Order, OrderPatch, OrderStatistics,
    ProfitLoss, Purchase, PurchasePatch, PurchaseStatistics,
};
use shopkeep_db::KeyValueStore;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::LedgerState;

/// Result of clearing a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub kind: LedgerKind,
    /// Whether anything was stored before.
    pub removed: bool,
}

// =============================================================================
// Records
// =============================================================================

/// All orders, newest first.
pub async fn list_orders<S: KeyValueStore>(ledger: &LedgerState<S>) -> Vec<Order> {
    debug!("list_orders command");
    ledger.ledger().orders().await
}

pub async fn get_order<S: KeyValueStore>(ledger: &LedgerState<S>, id: String) -> Result<Order, ApiError> {
    debug!(id = %id, "get_order command");
    find(ledger, &id).await
}

/// All purchases, newest first.
pub async fn list_purchases<S: KeyValueStore>(ledger: &LedgerState<S>) -> Vec<Purchase> {
    debug!("list_purchases command");
    ledger.ledger().purchases().await
}

pub async fn get_purchase<S: KeyValueStore>(
    ledger: &LedgerState<S>,
    id: String,
) -> Result<Purchase, ApiError> {
    debug!(id = %id, "get_purchase command");
    find(ledger, &id).await
}

async fn find<S: KeyValueStore, R: LedgerRecord>(ledger: &LedgerState<S>, id: &str) -> Result<R, ApiError> {
    ledger
        .ledger()
        .find::<R>(id)
        .await
        .ok_or_else(|| ApiError::not_found(resource_name(R::KIND), id))
}

fn resource_name(kind: LedgerKind) -> &'static str {
    match kind {
        LedgerKind::Orders => "Order",
        LedgerKind::Purchases => "Purchase",
    }
}

// =============================================================================
// Statistics
// =============================================================================

pub async fn get_order_statistics<S: KeyValueStore>(ledger: &LedgerState<S>) -> OrderStatistics {
    debug!("get_order_statistics command");
    ledger.ledger().order_statistics().await
}

pub async fn get_purchase_statistics<S: KeyValueStore>(ledger: &LedgerState<S>) -> PurchaseStatistics {
    debug!("get_purchase_statistics command");
    ledger.ledger().purchase_statistics().await
}

/// Turns the optional `from`/`to` inputs into a range.
///
/// Blank strings count as not given. Exactly one bound is an error.
pub fn parse_range(from: Option<String>, to: Option<String>) -> Result<Option<DateRange>, ApiError> {
    let from = from.filter(|s| !s.trim().is_empty());
    let to = to.filter(|s| !s.trim().is_empty());

    match (from, to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) => {
            let start = parse_iso_date("from", &from)?;
            let end = parse_iso_date("to", &to)?;
            Ok(Some(DateRange::new(start, end)))
        }
        _ => Err(ApiError::validation(
            "Both from and to dates are required for a date range",
        )),
    }
}

/// Sales against purchases, optionally limited to a date range.
pub async fn get_profit_loss<S: KeyValueStore>(
    ledger: &LedgerState<S>,
    from: Option<String>,
    to: Option<String>,
) -> Result<ProfitLoss, ApiError> {
    let range = parse_range(from, to)?;
    debug!(?range, "get_profit_loss command");
    Ok(ledger.ledger().profit_loss(range).await)
}

/// Statistics, profit/loss and recent orders in one response.
pub async fn get_dashboard<S: KeyValueStore>(
    ledger: &LedgerState<S>,
    from: Option<String>,
    to: Option<String>,
) -> Result<DashboardSummary, ApiError> {
    let range = parse_range(from, to)?;
    debug!(?range, "get_dashboard command");
    Ok(ledger.ledger().dashboard(range).await)
}

// =============================================================================
// Updates
// =============================================================================

/// Records a new paid amount on an order, re-deriving balance and status.
pub async fn record_order_payment<S: KeyValueStore>(
    ledger: &LedgerState<S>,
    id: String,
    paid_input: String,
) -> Result<Order, ApiError> {
    let paid = validate_paid_amount(parse_amount_input(&paid_input)?)?;
    let patch = OrderPatch {
        paid_amount: Some(paid),
        ..OrderPatch::default()
    };
    update_order(ledger, id, patch).await
}

/// Records a new paid amount on a purchase.
pub async fn record_purchase_payment<S: KeyValueStore>(
    ledger: &LedgerState<S>,
    id: String,
    paid_input: String,
) -> Result<Purchase, ApiError> {
    let paid = validate_paid_amount(parse_amount_input(&paid_input)?)?;
    let patch = PurchasePatch {
        paid_amount: Some(paid),
        ..PurchasePatch::default()
    };
    update_purchase(ledger, id, patch).await
}

pub async fn update_order<S: KeyValueStore>(
    ledger: &LedgerState<S>,
    id: String,
    patch: OrderPatch,
) -> Result<Order, ApiError> {
    debug!(id = %id, "update_order command");
    update::<S, Order>(ledger, &id, &patch).await
}

pub async fn update_purchase<S: KeyValueStore>(
    ledger: &LedgerState<S>,
    id: String,
    patch: PurchasePatch,
) -> Result<Purchase, ApiError> {
    debug!(id = %id, "update_purchase command");
    update::<S, Purchase>(ledger, &id, &patch).await
}

async fn update<S: KeyValueStore, R: LedgerRecord>(
    ledger: &LedgerState<S>,
    id: &str,
    patch: &R::Patch,
) -> Result<R, ApiError> {
    if !ledger.ledger().update::<R>(id, patch).await? {
        return Err(ApiError::not_found(resource_name(R::KIND), id));
    }
    find(ledger, id).await
}

/// Deletes a whole collection.
pub async fn clear_history<S: KeyValueStore>(
    ledger: &LedgerState<S>,
    kind: LedgerKind,
) -> Result<ClearResponse, ApiError> {
    let removed = ledger.ledger().clear(kind).await?;
    info!(kind = %kind, removed, "History cleared");
    Ok(ClearResponse { kind, removed })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::billing::{add_to_sales_cart, confirm_order, set_sale_details, SaleDetails};
    use crate::commands::purchase::{add_to_purchase_cart, confirm_purchase, set_purchase_details, PurchaseDetails};
    use crate::error::ErrorCode;
    use crate::state::{CartState, CatalogState, ConfigState};
    use chrono::{Duration, NaiveDate};
    use shopkeep_core::{FixedClock, IdGenerator, Money, OrderStatus, PurchaseStatus};
    use shopkeep_db::MemoryStore;
    use std::sync::Arc;

    struct Shop {
        ledger: LedgerState<MemoryStore>,
        clock: Arc<FixedClock>,
        catalog: CatalogState,
        cart: CartState,
    }

    fn shop() -> Shop {
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()));
        Shop {
            ledger: LedgerState::with_clock(MemoryStore::new(), clock.clone(), IdGenerator::with_seed(3)),
            clock,
            catalog: CatalogState::seeded(),
            cart: CartState::new(),
        }
    }

    impl Shop {
        async fn sell(&self, product_id: &str, paid: &str) -> Order {
            add_to_sales_cart(&self.catalog, &self.cart, product_id.to_string(), None)
                .await
                .unwrap();
            set_sale_details(
                &self.cart,
                SaleDetails {
                    customer_name: Some("City Mart".to_string()),
                    payment_method: None,
                    paid_input: Some(paid.to_string()),
                },
            )
            .await
            .unwrap();
            confirm_order(&self.ledger, &self.cart, &ConfigState::default())
                .await
                .unwrap()
                .order
        }

        async fn buy(&self, product_id: &str, cost: &str, paid: &str) -> Purchase {
            add_to_purchase_cart(&self.catalog, &self.cart, product_id.to_string(), cost.to_string())
                .await
                .unwrap();
            set_purchase_details(
                &self.cart,
                PurchaseDetails {
                    supplier_name: Some("Agro Suppliers Ltd".to_string()),
                    paid_input: Some(paid.to_string()),
                },
            )
            .await
            .unwrap();
            confirm_purchase(&self.ledger, &self.cart).await.unwrap().purchase
        }
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let shop = shop();
        let first = shop.sell("1", "0").await;
        let second = shop.sell("2", "0").await;

        let orders = list_orders(&shop.ledger).await;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id);

        assert_eq!(get_order(&shop.ledger, first.id.clone()).await.unwrap(), first);
        let err = get_order(&shop.ledger, "ORD-0-0".to_string()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order not found: ORD-0-0");
    }

    #[tokio::test]
    async fn test_record_payment_settles_order() {
        let shop = shop();
        let order = shop.sell("1", "10").await;
        assert_eq!(order.status, OrderStatus::Pending);

        // 45.99 × 1.18 = 54.27
        let settled = record_order_payment(&shop.ledger, order.id.clone(), "54.27".to_string())
            .await
            .unwrap();

        assert_eq!(settled.status, OrderStatus::Completed);
        assert!(settled.remaining_amount.is_zero());
        assert_eq!(get_order_statistics(&shop.ledger).await.completed, 1);
    }

    #[tokio::test]
    async fn test_record_payment_rejects_negative_and_unknown() {
        let shop = shop();
        let purchase = shop.buy("1", "40", "0").await;

        let err = record_purchase_payment(&shop.ledger, purchase.id.clone(), "-1".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = record_purchase_payment(&shop.ledger, "PUR-1-1".to_string(), "5".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let paid = record_purchase_payment(&shop.ledger, purchase.id, "40".to_string())
            .await
            .unwrap();
        assert_eq!(paid.status, PurchaseStatus::Paid);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_patches() {
        let shop = shop();
        let order = shop.sell("1", "10").await;
        let purchase = shop.buy("2", "30", "0").await;

        let err = update_order(
            &shop.ledger,
            order.id.clone(),
            OrderPatch {
                customer_name: Some("  ".to_string()),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "customer name is required");

        let err = update_order(
            &shop.ledger,
            order.id.clone(),
            OrderPatch {
                paid_amount: Some(Money::from_cents(-500)),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = update_purchase(
            &shop.ledger,
            purchase.id.clone(),
            PurchasePatch {
                supplier_name: Some(String::new()),
                ..PurchasePatch::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(get_order(&shop.ledger, order.id.clone()).await.unwrap(), order);
        assert_eq!(get_purchase(&shop.ledger, purchase.id.clone()).await.unwrap(), purchase);
        let stats = get_order_statistics(&shop.ledger).await;
        assert!(!stats.total_collected.is_negative());
    }

    #[tokio::test]
    async fn test_profit_loss_by_range() {
        let shop = shop();
        shop.buy("1", "40", "40").await; // 01-20
        shop.clock.advance(Duration::days(2));
        shop.sell("4", "0").await; // 01-22, 141.60

        let all = get_profit_loss(&shop.ledger, None, None).await.unwrap();
        assert_eq!(all.total_sales, Money::from_cents(14_160));
        assert_eq!(all.total_purchases, Money::from_cents(4_000));
        assert_eq!(all.profit_loss, Money::from_cents(10_160));

        let later = get_profit_loss(
            &shop.ledger,
            Some("2026-01-21".to_string()),
            Some("2026-01-31".to_string()),
        )
        .await
        .unwrap();
        assert!(later.total_purchases.is_zero());
        assert_eq!(later.margin, 100.0);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range(None, Some(" ".to_string())).unwrap(), None);

        let range = parse_range(Some("2026-01-01".to_string()), Some("2026-01-31".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

        let half = parse_range(Some("2026-01-01".to_string()), None).unwrap_err();
        assert_eq!(half.code, ErrorCode::ValidationError);

        let bad = parse_range(Some("01/01/2026".to_string()), Some("2026-01-31".to_string()))
            .unwrap_err();
        assert_eq!(bad.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_dashboard_and_clear() {
        let shop = shop();
        shop.sell("1", "0").await;
        shop.buy("2", "30", "0").await;

        let summary = get_dashboard(&shop.ledger, None, None).await.unwrap();
        assert_eq!(summary.orders.total, 1);
        assert_eq!(summary.purchases.total, 1);
        assert_eq!(summary.recent_orders.len(), 1);

        let cleared = clear_history(&shop.ledger, LedgerKind::Orders).await.unwrap();
        assert!(cleared.removed);
        assert!(list_orders(&shop.ledger).await.is_empty());
        assert_eq!(list_purchases(&shop.ledger).await.len(), 1);

        let again = clear_history(&shop.ledger, LedgerKind::Orders).await.unwrap();
        assert!(!again.removed);
    }
}
