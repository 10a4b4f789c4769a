//! # Commands Module
//!
//! Operations exposed to the presentation layer.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── catalog.rs   ◄─── Product list, search, lookup
//! ├── billing.rs   ◄─── Sales cart, confirm order, invoice
//! ├── purchase.rs  ◄─── Purchase cart, confirm purchase
//! ├── history.rs   ◄─── Orders, purchases, statistics, profit/loss
//! └── config.rs    ◄─── Shop profile
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Presentation                                                           │
//! │  ────────────                                                           │
//! │  add_to_sales_cart(&catalog, &carts, "1", None)                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Command function                                                       │
//! │  ────────────────                                                       │
//! │  async fn add_to_sales_cart(                                            │
//! │      catalog: &CatalogState,   ◄── only the state it needs             │
//! │      cart: &CartState,                                                  │
//! │      product_id: String,                                                │
//! │      price_cents: Option<i64>,                                          │
//! │  ) -> Result<SalesCartResponse, ApiError>                               │
//! │         │                                                               │
//! │         │ (serde, camelCase)                                            │
//! │         ▼                                                               │
//! │  Presentation renders SalesCartResponse                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the catalog
//! fn search_products(catalog: &CatalogState, query: String)
//!
//! // Only needs the ledger
//! async fn get_profit_loss(ledger: &LedgerState<S>, from, to)
//!
//! // Needs ledger, carts and shop profile
//! async fn confirm_order(ledger: &LedgerState<S>, cart: &CartState, config: &ConfigState)
//! ```

pub mod billing;
pub mod catalog;
pub mod config;
pub mod history;
pub mod purchase;
