//! # Cart State
//!
//! The open sales cart and the open purchase cart.
//!
//! ## Thread Safety
//! Each cart sits behind its own `tokio::sync::Mutex`:
//! 1. Several commands may touch the same cart
//! 2. Only one may modify it at a time
//! 3. Confirming holds the lock across the storage write, so the cart
//!    cannot change between validation and clearing
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Billing page                 Command                  Lock held        │
//! │  ────────────                 ───────                  ─────────        │
//! │                                                                         │
//! │  Pick product ───────────────► add_to_sales_cart() ──► briefly          │
//! │                                                                         │
//! │  Change quantity ────────────► update_sales_item() ──► briefly          │
//! │                                                                         │
//! │  Confirm ────────────────────► confirm_order() ──────► until written    │
//! │                                                                         │
//! │  Purchases page uses the same shape with the purchase cart.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shopkeep_core::{PurchaseCart, SalesCart};
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct CartState {
    sales: Mutex<SalesCart>,
    purchases: Mutex<PurchaseCart>,
}

impl CartState {
    /// Creates empty carts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with read access to the sales cart.
    ///
    /// ```rust,ignore
    /// let totals = carts.with_sales(|cart| cart.compute_totals()).await;
    /// ```
    pub async fn with_sales<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SalesCart) -> R,
    {
        let cart = self.sales.lock().await;
        f(&cart)
    }

    /// Runs `f` with write access to the sales cart.
    pub async fn with_sales_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SalesCart) -> R,
    {
        let mut cart = self.sales.lock().await;
        f(&mut cart)
    }

    pub async fn with_purchases<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PurchaseCart) -> R,
    {
        let cart = self.purchases.lock().await;
        f(&cart)
    }

    pub async fn with_purchases_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut PurchaseCart) -> R,
    {
        let mut cart = self.purchases.lock().await;
        f(&mut cart)
    }

    /// Exclusive access to the sales cart for the duration of a commit.
    pub async fn lock_sales(&self) -> MutexGuard<'_, SalesCart> {
        self.sales.lock().await
    }

    /// Exclusive access to the purchase cart for the duration of a commit.
    pub async fn lock_purchases(&self) -> MutexGuard<'_, PurchaseCart> {
        self.purchases.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeep_core::Catalog;

    #[tokio::test]
    async fn test_carts_are_independent() {
        let catalog = Catalog::seeded();
        let carts = CartState::new();

        carts
            .with_sales_mut(|c| c.add_item(&catalog, "1", None))
            .await;

        assert_eq!(carts.with_sales(|c| c.lines().len()).await, 1);
        assert!(carts.with_purchases(|c| c.is_empty()).await);
    }

    #[tokio::test]
    async fn test_lock_guard_mutates() {
        let catalog = Catalog::seeded();
        let carts = CartState::new();

        {
            let mut guard = carts.lock_purchases().await;
            guard.add_item(&catalog, "2", Some(shopkeep_core::Money::from_cents(3000)));
        }

        assert_eq!(carts.with_purchases(|c| c.lines().len()).await, 1);
    }
}
