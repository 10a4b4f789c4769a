//! # Purchase Commands
//!
//! The purchase cart: stock bought from suppliers at an entered cost.
//!
//! Same lifecycle as billing, except each add carries the cost price the
//! shopkeeper typed in, and confirming produces a [`Purchase`] instead of
//! an invoice.

use serde::{Deserialize, Serialize};
use shopkeep_core::validation::{parse_amount_input, validate_unit_cost};
use shopkeep_core::{Purchase, PurchaseCart, PurchaseLine, PurchaseStatistics, PurchaseTotals};
use shopkeep_db::KeyValueStore;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CartState, CatalogState, LedgerState};

/// Purchase cart with totals and the supplier form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCartResponse {
    pub lines: Vec<PurchaseLine>,
    pub totals: PurchaseTotals,
    pub supplier_name: String,
    pub paid_input: String,
}

impl TryFrom<&PurchaseCart> for PurchaseCartResponse {
    type Error = ApiError;

    fn try_from(cart: &PurchaseCart) -> Result<Self, ApiError> {
        Ok(PurchaseCartResponse {
            lines: cart.lines().to_vec(),
            totals: cart.compute_totals()?,
            supplier_name: cart.supplier_name().to_string(),
            paid_input: cart.paid_input().to_string(),
        })
    }
}

/// Supplier form fields. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetails {
    pub supplier_name: Option<String>,
    pub paid_input: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPurchaseResponse {
    pub purchase: Purchase,
    pub stats: PurchaseStatistics,
}

pub async fn get_purchase_cart(cart: &CartState) -> Result<PurchaseCartResponse, ApiError> {
    debug!("get_purchase_cart command");
    cart.with_purchases(|c| PurchaseCartResponse::try_from(c)).await
}

/// Adds one unit of a product at the typed cost price.
///
/// The cost must parse to a positive amount; otherwise the cart is left
/// alone and a validation error comes back. Unknown products are ignored.
pub async fn add_to_purchase_cart(
    catalog: &CatalogState,
    cart: &CartState,
    product_id: String,
    cost_input: String,
) -> Result<PurchaseCartResponse, ApiError> {
    debug!(product_id = %product_id, cost = %cost_input, "add_to_purchase_cart command");

    let cost = validate_unit_cost(parse_amount_input(&cost_input)?)?;

    cart.with_purchases_mut(|c| {
        c.add_item(catalog.inner(), &product_id, Some(cost));
        PurchaseCartResponse::try_from(&*c)
    })
    .await
}

/// Same rules as `update_sales_item`.
pub async fn update_purchase_item(
    cart: &CartState,
    product_id: String,
    quantity: i64,
) -> Result<PurchaseCartResponse, ApiError> {
    debug!(product_id = %product_id, quantity, "update_purchase_item command");

    cart.with_purchases_mut(|c| -> Result<PurchaseCartResponse, ApiError> {
        c.set_quantity(&product_id, quantity)?;
        PurchaseCartResponse::try_from(&*c)
    })
    .await
}

pub async fn remove_from_purchase_cart(
    cart: &CartState,
    product_id: String,
) -> Result<PurchaseCartResponse, ApiError> {
    debug!(product_id = %product_id, "remove_from_purchase_cart command");

    cart.with_purchases_mut(|c| {
        c.remove_item(&product_id);
        PurchaseCartResponse::try_from(&*c)
    })
    .await
}

pub async fn clear_purchase_cart(cart: &CartState) -> Result<PurchaseCartResponse, ApiError> {
    debug!("clear_purchase_cart command");

    cart.with_purchases_mut(|c| {
        c.clear();
        PurchaseCartResponse::try_from(&*c)
    })
    .await
}

pub async fn set_purchase_details(
    cart: &CartState,
    details: PurchaseDetails,
) -> Result<PurchaseCartResponse, ApiError> {
    debug!("set_purchase_details command");

    cart.with_purchases_mut(|c| {
        if let Some(name) = details.supplier_name {
            c.set_supplier_name(name);
        }
        if let Some(paid) = details.paid_input {
            c.set_paid_input(paid);
        }
        PurchaseCartResponse::try_from(&*c)
    })
    .await
}

/// Confirms the purchase cart.
///
/// The cart lock is held until the purchase is written. On any error the
/// cart keeps its lines and supplier form.
pub async fn confirm_purchase<S: KeyValueStore>(
    ledger: &LedgerState<S>,
    cart: &CartState,
) -> Result<ConfirmPurchaseResponse, ApiError> {
    debug!("confirm_purchase command");

    let mut purchases = cart.lock_purchases().await;
    let committed = ledger
        .ledger()
        .commit_purchase(&mut purchases, ledger.ids(), ledger.clock())
        .await?;

    Ok(ConfirmPurchaseResponse {
        purchase: committed.record,
        stats: committed.stats,
    })
}
