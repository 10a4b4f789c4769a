//! # shopkeep-core: Pure Ledger Logic for Shopkeep
//!
//! Everything a shopkeeper's billing and purchase flow computes, with no
//! storage and no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopkeep Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (shopkeep app)                     │   │
//! │  │   Catalog ──► Billing ──► Invoice      Purchases ──► History    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ shopkeep-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │ catalog  │ │   cart   │ │  stats   │ │   ids    │         │   │
//! │  │   │ Product  │ │ SalesCart│ │ OrderSt. │ │ Clock    │         │   │
//! │  │   │ Catalog  │ │ Purchase │ │ ProfitL. │ │ IdGen    │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopkeep-db (Ledger Store)                      │   │
//! │  │         key-value collections over SQLite, commit flow          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Orders, purchases, statuses, the [`LedgerRecord`] trait
//! - [`money`] - Money type with integer arithmetic
//! - [`catalog`] - The product list
//! - [`cart`] - Sales and purchase carts
//! - [`stats`] - Statistics and profit/loss
//! - [`ids`] - Clock and record id generation
//! - [`validation`] - Form input parsing and rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shopkeep_core::{Catalog, SalesCart, ValidationError};
//!
//! let catalog = Catalog::seeded();
//! let mut cart = SalesCart::new();
//! cart.add_item(&catalog, "1", None);
//! cart.set_quantity("1", 50)?;
//!
//! let totals = cart.compute_totals()?;
//! assert_eq!(totals.subtotal.cents(), 229_950);
//! assert_eq!(totals.tax.cents(), 41_391);
//! # Ok::<(), ValidationError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod money;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{PurchaseCart, PurchaseLine, PurchaseTotals, SaleLine, SalesCart, SalesTotals};
pub use catalog::{Catalog, Product};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ids::{Clock, FixedClock, IdGenerator, RecordStamp, SystemClock};
pub use money::Money;
pub use stats::{DashboardSummary, DateRange, OrderStatistics, ProfitLoss, PurchaseStatistics};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sales tax applied to every order subtotal (18%).
///
/// Purchases are recorded at cost and carry no tax.
pub const SALES_TAX_RATE: TaxRate = TaxRate::from_bps(1800);
