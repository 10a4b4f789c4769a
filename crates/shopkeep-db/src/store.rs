//! # Key-Value Backends
//!
//! The ledger keeps each collection under one string key. Anything that can
//! get, set and remove a string by key can back it.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  LedgerStore<S: KeyValueStore>                               │
//! │        │                                                     │
//! │        ├── SqliteStore  ── kv_store table (production)       │
//! │        └── MemoryStore  ── HashMap (tests, fault injection)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// String storage keyed by string.
pub trait KeyValueStore: Send + Sync {
    /// Value under `key`, or `None` if nothing is stored there.
    fn get(&self, key: &str) -> impl Future<Output = DbResult<Option<String>>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Deletes `key`. Returns whether anything was there.
    fn remove(&self, key: &str) -> impl Future<Output = DbResult<bool>> + Send;
}

// =============================================================================
// SQLite
// =============================================================================

/// `kv_store` table in the app's SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }
}

impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing key");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// In-Memory
// =============================================================================

/// HashMap-backed store.
///
/// Clones share the same map. Reads and writes can be switched to fail so
/// tests can exercise storage fault paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `set` and `remove` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, op: &str) -> DbResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(DbError::Internal(format!("memory store {} disabled", op)));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Self::check(&self.fail_reads, "read")?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        Self::check(&self.fail_writes, "write")?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<bool> {
        Self::check(&self.fail_writes, "write")?;
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
