//! # State Module
//!
//! Application state, one type per concern. Commands take only the state
//! they need.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌─────────────┐ │
//! │  │ LedgerState  │  │  CartState   │  │ CatalogState │  │ ConfigState │ │
//! │  │              │  │              │  │              │  │             │ │
//! │  │ LedgerStore  │  │ Mutex<Sales  │  │  Catalog     │  │ shop        │ │
//! │  │ IdGenerator  │  │   Cart>      │  │              │  │ profile     │ │
//! │  │ Clock        │  │ Mutex<Purch. │  │              │  │ currency    │ │
//! │  │              │  │   Cart>      │  │              │  │             │ │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └─────────────┘ │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • LedgerState: backend is thread-safe, generator locks internally     │
//! │  • CartState: each cart behind its own async Mutex                     │
//! │  • CatalogState, ConfigState: read-only after initialization           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod config;
mod ledger;

pub use cart::CartState;
pub use catalog::CatalogState;
pub use config::ConfigState;
pub use ledger::LedgerState;
