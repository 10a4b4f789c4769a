//! # Ledger State
//!
//! The ledger store plus the id generator and clock used to stamp new
//! records.
//!
//! ## Thread Safety
//! The SQLite backend wraps a pool and is safe to share. The id generator
//! serialises internally, so concurrent commits never receive the same id.

use std::sync::Arc;

use shopkeep_core::{Clock, IdGenerator, SystemClock};
use shopkeep_db::{KeyValueStore, LedgerStore, SqliteStore};

/// Wrapper around [`LedgerStore`] for command use.
///
/// Generic over the backend so tests can run commands against a
/// `MemoryStore`.
#[derive(Debug)]
pub struct LedgerState<S = SqliteStore> {
    ledger: LedgerStore<S>,
    ids: IdGenerator,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> LedgerState<S> {
    /// Ledger over `store`, stamped with wall-clock time.
    pub fn new(store: S) -> Self {
        LedgerState::with_clock(store, Arc::new(SystemClock), IdGenerator::new())
    }

    /// Ledger with an injected clock and id generator.
    pub fn with_clock(store: S, clock: Arc<dyn Clock>, ids: IdGenerator) -> Self {
        LedgerState {
            ledger: LedgerStore::new(store),
            ids,
            clock,
        }
    }

    pub fn ledger(&self) -> &LedgerStore<S> {
        &self.ledger
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
