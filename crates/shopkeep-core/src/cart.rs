//! # Cart Builder
//!
//! The working set of lines for one pending sale or purchase.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Builder Operations                              │
//! │                                                                         │
//! │  Form Action             Cart Method              Line Change           │
//! │  ───────────             ───────────              ───────────           │
//! │                                                                         │
//! │  Pick product ─────────► add_item() ────────────► push or qty + 1      │
//! │                                                                         │
//! │  +/- buttons ──────────► set_quantity() ────────► qty = n (≤ 0 drops)  │
//! │                                                                         │
//! │  Trash icon ───────────► remove_item() ─────────► line removed         │
//! │                                                                         │
//! │  Clear / after confirm ► clear() ───────────────► empty + form reset   │
//! │                                                                         │
//! │  Confirm ──────────────► build_order() ─────────► immutable Order      │
//! │                          build_purchase()         immutable Purchase   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product id
//! - Every line has `1 <= quantity <= MAX_LINE_QUANTITY`
//! - Every total fits in [`Money`]; a change that would overflow one is
//!   refused and the cart is left as it was
//!
//! Totals are recomputed from the lines on every call and never cached.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::catalog::{Catalog, Product};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ids::RecordStamp;
use crate::money::Money;
use crate::types::{
    LedgerKind, Order, OrderItem, OrderStatus, PaymentMethod, Purchase, PurchaseItem,
    PurchaseStatus,
};
use crate::validation::{
    parse_amount_input, validate_counterparty_name, validate_paid_amount, validate_quantity,
    ValidationResult, MAX_LINE_QUANTITY,
};
use crate::SALES_TAX_RATE;

// =============================================================================
// Shared line handling
// =============================================================================

/// A cart line keyed by product id.
pub trait CartLine {
    fn product_id(&self) -> &str;
    fn quantity(&self) -> i64;
    fn set_quantity(&mut self, quantity: i64);
}

/// Ordered set of lines, at most one per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lines<L> {
    items: Vec<L>,
}

impl<L> Default for Lines<L> {
    fn default() -> Self {
        Lines { items: Vec::new() }
    }
}

impl<L: CartLine> Lines<L> {
    pub fn items(&self) -> &[L] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, product_id: &str) -> Option<&L> {
        self.items.iter().find(|l| l.product_id() == product_id)
    }

    fn get_mut(&mut self, product_id: &str) -> Option<&mut L> {
        self.items.iter_mut().find(|l| l.product_id() == product_id)
    }

    fn push(&mut self, line: L) {
        self.items.push(line);
    }

    /// Sets a line's quantity; `quantity <= 0` removes the line.
    ///
    /// Returns whether a line was present.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(product_id);
        }

        match self.get_mut(product_id) {
            Some(line) => {
                line.set_quantity(quantity);
                true
            }
            None => false,
        }
    }

    /// Removes the line for `product_id`. Returns whether one was removed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|l| l.product_id() != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, l| acc.saturating_add(l.quantity()))
    }
}

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
    }
}

/// Runs `change` on a copy of `lines` and keeps it only if `check` accepts
/// the result.
fn try_change<L, T>(
    lines: &mut Lines<L>,
    change: impl FnOnce(&mut Lines<L>) -> bool,
    check: impl FnOnce(&Lines<L>) -> ValidationResult<T>,
) -> ValidationResult<bool>
where
    L: CartLine + Clone,
{
    let mut next = lines.clone();
    let changed = change(&mut next);
    check(&next)?;
    *lines = next;
    Ok(changed)
}

// =============================================================================
// Sales cart
// =============================================================================

/// A line in the billing cart.
///
/// The product is snapshotted when first added, and so is its price: a
/// catalog change afterwards does not alter the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product: Product,
    pub unit_price: Money,
    pub quantity: i64,
}

impl SaleLine {
    pub fn line_total(&self) -> ValidationResult<Money> {
        self.unit_price
            .checked_mul(self.quantity)
            .ok_or_else(|| out_of_range("line total"))
    }
}

impl CartLine for SaleLine {
    fn product_id(&self) -> &str {
        &self.product.id
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }
}

/// Totals for the billing cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

/// The billing cart plus the customer form fields that go with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesCart {
    lines: Lines<SaleLine>,
    customer_name: String,
    payment_method: PaymentMethod,
    paid_input: String,
}

impl SalesCart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[SaleLine] {
        self.lines.items()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn paid_input(&self) -> &str {
        &self.paid_input
    }

    pub fn set_customer_name(&mut self, name: impl Into<String>) {
        self.customer_name = name.into();
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// Stores the paid-amount field as typed; it is parsed at commit.
    pub fn set_paid_input(&mut self, input: impl Into<String>) {
        self.paid_input = input.into();
    }

    /// Adds one unit of `product_id`.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity + 1, price unchanged
    /// - New product: line with quantity 1 at `price_override`, or the
    ///   catalog price when no override is given
    /// - Unknown product or negative override: nothing happens
    /// - Line already at [`MAX_LINE_QUANTITY`], or the new totals would
    ///   not fit in [`Money`]: nothing happens
    ///
    /// Returns whether the cart changed.
    pub fn add_item(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        price_override: Option<Money>,
    ) -> bool {
        let Some(product) = catalog.get(product_id) else {
            debug!(product_id = %product_id, "add_item ignored: product not in catalog");
            return false;
        };

        let line = match self.lines.get(product_id) {
            Some(line) if line.quantity >= MAX_LINE_QUANTITY => {
                debug!(product_id = %product_id, "add_item ignored: quantity at limit");
                return false;
            }
            Some(line) => SaleLine {
                quantity: line.quantity + 1,
                ..line.clone()
            },
            None => {
                let unit_price = match price_override {
                    Some(price) if price.is_negative() => {
                        debug!(product_id = %product_id, %price, "add_item ignored: negative price");
                        return false;
                    }
                    Some(price) => price,
                    None => product.unit_price,
                };
                SaleLine {
                    product: product.clone(),
                    unit_price,
                    quantity: 1,
                }
            }
        };

        let placed = try_change(
            &mut self.lines,
            |lines| {
                match lines.get_mut(product_id) {
                    Some(existing) => *existing = line,
                    None => lines.push(line),
                }
                true
            },
            sales_totals,
        );
        match placed {
            Ok(changed) => changed,
            Err(e) => {
                debug!(product_id = %product_id, error = %e, "add_item ignored");
                false
            }
        }
    }

    /// Sets a line's quantity exactly; `quantity <= 0` removes it.
    ///
    /// Returns whether a line was present.
    ///
    /// ## Errors
    /// [`ValidationError::TooLarge`] above [`MAX_LINE_QUANTITY`] and
    /// [`ValidationError::OutOfRange`] when the totals would overflow. The
    /// cart is unchanged in both cases.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> ValidationResult<bool> {
        let quantity = validate_quantity(quantity)?;
        try_change(
            &mut self.lines,
            |lines| lines.set_quantity(product_id, quantity),
            sales_totals,
        )
    }

    pub fn remove_item(&mut self, product_id: &str) -> bool {
        self.lines.remove(product_id)
    }

    /// Subtotal, 18% tax (half-up to the cent) and total.
    ///
    /// Fails only for a cart whose amounts overflow, which the mutating
    /// methods never produce.
    pub fn compute_totals(&self) -> ValidationResult<SalesTotals> {
        sales_totals(&self.lines)
    }

    /// Empties the cart and resets the customer form.
    pub fn clear(&mut self) {
        *self = SalesCart::default();
    }

    /// Validates the cart and builds the immutable order.
    ///
    /// `stamp` is only called once validation has passed, so a rejected
    /// commit never consumes an id.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`] when there are no lines
    /// - [`CoreError::Validation`] for a blank customer name or a negative
    ///   paid amount
    pub fn build_order(&self, stamp: impl FnOnce() -> RecordStamp) -> CoreResult<Order> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart {
                kind: LedgerKind::Orders,
            });
        }

        let customer_name = validate_counterparty_name("customer name", &self.customer_name)?;
        let paid = validate_paid_amount(parse_amount_input(&self.paid_input)?)?;

        let items = self
            .lines
            .items()
            .iter()
            .map(|line| -> ValidationResult<OrderItem> {
                Ok(OrderItem {
                    product_id: line.product.id.clone(),
                    product_name: line.product.name.clone(),
                    product_barcode: line.product.barcode.clone(),
                    quantity: line.quantity,
                    price_per_unit: line.unit_price,
                    total_price: line.line_total()?,
                })
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        let totals = self.compute_totals()?;
        let remaining = totals
            .total
            .checked_sub(paid)
            .ok_or_else(|| out_of_range("remaining amount"))?;
        let RecordStamp { id, date } = stamp();

        Ok(Order {
            id,
            date,
            customer_name,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            payment_method: self.payment_method,
            paid_amount: paid,
            remaining_amount: remaining,
            status: OrderStatus::for_payment(paid, totals.total),
        })
    }
}

fn sales_totals(lines: &Lines<SaleLine>) -> ValidationResult<SalesTotals> {
    let line_totals = lines
        .items()
        .iter()
        .map(SaleLine::line_total)
        .collect::<ValidationResult<Vec<_>>>()?;
    let subtotal = Money::checked_sum(line_totals).ok_or_else(|| out_of_range("subtotal"))?;
    let tax = subtotal.calculate_tax(SALES_TAX_RATE);
    let total = subtotal
        .checked_add(tax)
        .ok_or_else(|| out_of_range("total"))?;

    Ok(SalesTotals {
        item_count: lines.len(),
        total_quantity: lines.total_quantity(),
        subtotal,
        tax,
        total,
    })
}

// =============================================================================
// Purchase cart
// =============================================================================

/// A line in the purchase cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    pub product_id: String,
    /// Product name at the time the line was created.
    pub product_name: String,
    pub quantity: i64,
    pub cost_price_per_unit: Money,
}

impl PurchaseLine {
    pub fn line_total(&self) -> ValidationResult<Money> {
        self.cost_price_per_unit
            .checked_mul(self.quantity)
            .ok_or_else(|| out_of_range("line total"))
    }
}

impl CartLine for PurchaseLine {
    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }
}

/// Totals for the purchase cart. Purchases carry no tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_cost: Money,
}

/// The purchase cart plus the supplier form fields that go with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCart {
    lines: Lines<PurchaseLine>,
    supplier_name: String,
    paid_input: String,
}

impl PurchaseCart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[PurchaseLine] {
        self.lines.items()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn supplier_name(&self) -> &str {
        &self.supplier_name
    }

    pub fn paid_input(&self) -> &str {
        &self.paid_input
    }

    pub fn set_supplier_name(&mut self, name: impl Into<String>) {
        self.supplier_name = name.into();
    }

    pub fn set_paid_input(&mut self, input: impl Into<String>) {
        self.paid_input = input.into();
    }

    /// Adds one unit of `product_id` bought at `unit_cost`.
    ///
    /// ## Behavior
    /// - No cost given, or cost not positive: nothing happens
    /// - Product already in cart: quantity + 1 and the new cost replaces
    ///   the old one (last entered cost wins)
    /// - New product: line with quantity 1
    /// - Unknown product: nothing happens
    /// - Line already at [`MAX_LINE_QUANTITY`], or the total cost would
    ///   not fit in [`Money`]: nothing happens
    ///
    /// Returns whether the cart changed.
    pub fn add_item(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        unit_cost: Option<Money>,
    ) -> bool {
        let Some(product) = catalog.get(product_id) else {
            debug!(product_id = %product_id, "add_item ignored: product not in catalog");
            return false;
        };

        let cost = match unit_cost {
            Some(cost) if cost.is_positive() => cost,
            _ => {
                debug!(product_id = %product_id, "add_item ignored: no positive cost price");
                return false;
            }
        };

        let line = match self.lines.get(product_id) {
            Some(line) if line.quantity >= MAX_LINE_QUANTITY => {
                debug!(product_id = %product_id, "add_item ignored: quantity at limit");
                return false;
            }
            Some(line) => PurchaseLine {
                quantity: line.quantity + 1,
                cost_price_per_unit: cost,
                ..line.clone()
            },
            None => PurchaseLine {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: 1,
                cost_price_per_unit: cost,
            },
        };

        let placed = try_change(
            &mut self.lines,
            |lines| {
                match lines.get_mut(product_id) {
                    Some(existing) => *existing = line,
                    None => lines.push(line),
                }
                true
            },
            purchase_totals,
        );
        match placed {
            Ok(changed) => changed,
            Err(e) => {
                debug!(product_id = %product_id, error = %e, "add_item ignored");
                false
            }
        }
    }

    /// Same contract as [`SalesCart::set_quantity`].
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> ValidationResult<bool> {
        let quantity = validate_quantity(quantity)?;
        try_change(
            &mut self.lines,
            |lines| lines.set_quantity(product_id, quantity),
            purchase_totals,
        )
    }

    pub fn remove_item(&mut self, product_id: &str) -> bool {
        self.lines.remove(product_id)
    }

    pub fn compute_totals(&self) -> ValidationResult<PurchaseTotals> {
        purchase_totals(&self.lines)
    }

    /// Empties the cart and resets the supplier form.
    pub fn clear(&mut self) {
        *self = PurchaseCart::default();
    }

    /// Validates the cart and builds the immutable purchase.
    ///
    /// Same contract as [`SalesCart::build_order`].
    pub fn build_purchase(&self, stamp: impl FnOnce() -> RecordStamp) -> CoreResult<Purchase> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart {
                kind: LedgerKind::Purchases,
            });
        }

        let supplier_name = validate_counterparty_name("supplier name", &self.supplier_name)?;
        let paid = validate_paid_amount(parse_amount_input(&self.paid_input)?)?;

        let items = self
            .lines
            .items()
            .iter()
            .map(|line| -> ValidationResult<PurchaseItem> {
                Ok(PurchaseItem {
                    product_id: line.product_id.clone(),
                    product_name: line.product_name.clone(),
                    quantity: line.quantity,
                    cost_price_per_unit: line.cost_price_per_unit,
                    total_cost: line.line_total()?,
                })
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        let total_cost = self.compute_totals()?.total_cost;
        let remaining = total_cost
            .checked_sub(paid)
            .ok_or_else(|| out_of_range("remaining amount"))?;
        let RecordStamp { id, date } = stamp();

        Ok(Purchase {
            id,
            date,
            supplier_name,
            items,
            total_cost,
            paid_amount: paid,
            remaining_amount: remaining,
            status: PurchaseStatus::for_payment(paid, total_cost),
        })
    }
}

fn purchase_totals(lines: &Lines<PurchaseLine>) -> ValidationResult<PurchaseTotals> {
    let line_totals = lines
        .items()
        .iter()
        .map(PurchaseLine::line_total)
        .collect::<ValidationResult<Vec<_>>>()?;

    Ok(PurchaseTotals {
        item_count: lines.len(),
        total_quantity: lines.total_quantity(),
        total_cost: Money::checked_sum(line_totals).ok_or_else(|| out_of_range("total cost"))?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
