//! # Schema Migrations
//!
//! The schema is one table, `kv_store`, created by the embedded files in
//! `migrations/sqlite/`. sqlx records each applied file in
//! `_sqlx_migrations`, so opening an up-to-date database applies nothing.
//!
//! New files take the next `NNN_` prefix. Applied files are never edited.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every embedded migration not yet recorded.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let (total, applied) = migration_status(pool).await?;
    debug!(total, applied, "Migration status before run");

    MIGRATOR.run(pool).await?;

    if applied < total {
        info!(count = total - applied, "Applied pending migrations");
    }
    Ok(())
}

/// `(embedded, applied)` counts. Applied is 0 on a fresh database.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied.max(0) as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_rerun_is_noop() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(applied, 0);
        assert!(total >= 1);

        run_migrations(db.pool()).await.unwrap();
        run_migrations(db.pool()).await.unwrap();

        assert_eq!(migration_status(db.pool()).await.unwrap(), (total, total));
    }
}
