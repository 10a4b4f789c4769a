//! # shopkeep-db: Ledger Store for Shopkeep
//!
//! Durable order and purchase collections over a key-value backend, with
//! SQLite as the production backend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopkeep Data Flow                               │
//! │                                                                         │
//! │  App command (confirm_order)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shopkeep-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  LedgerStore  │    │ KeyValueStore │    │  Database    │  │   │
//! │  │   │  (ledger.rs)  │───►│  (store.rs)   │───►│  (pool.rs)   │  │   │
//! │  │   │ load / append │    │ SqliteStore   │    │ SqlitePool   │  │   │
//! │  │   │ update/commit │    │ MemoryStore   │    │ migrations   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite: kv_store(key, value, updated_at)                       │   │
//! │  │    wholesale_orders    → JSON array of orders                   │   │
//! │  │    wholesale_purchases → JSON array of purchases                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopkeep_db::{Database, DbConfig, LedgerStore};
//!
//! let db = Database::new(DbConfig::new("path/to/shopkeep.db")).await?;
//! let ledger = LedgerStore::new(db.kv());
//!
//! let committed = ledger.commit_order(&mut cart, &ids, &SystemClock).await?;
//! println!("{} orders on file", committed.stats.total);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CommitError, DbError, DbResult};
pub use ledger::{Committed, Decoded, LedgerStore};
pub use pool::{Database, DbConfig, DbLocation};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
