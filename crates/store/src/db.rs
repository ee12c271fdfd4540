//! Database connection and pool management.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Embedded migrations that are run automatically on connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// Reconcile batches are strictly sequential, but the status UI may read
// while an update is in flight.
const MAX_CONNECTIONS: u32 = 4;

/// Database connection pool for the store.
///
/// This is the main entry point for interacting with the release database.
/// It manages the SQLite connection pool and hands its pool to [`Repository`](crate::Repository).
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn new(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Apply the query-based PRAGMAs to EVERY connection in the
            // pool, not just the first one handed out.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Connect to the store database at the given path.
    ///
    /// Creates the database file if it doesn't exist and runs migrations.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::base_options().filename(path.as_ref()).create_if_missing(true);
        Self::new(options, None).await
    }

    /// Connect to an in-memory database (useful for testing).
    ///
    /// Note:
    /// - In-memory databases are destroyed when the connection closes.
    /// - Not gated behind `#[cfg(test)]` so that other crates can use this
    ///   in their tests too.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // Parallel connections to :memory: would each see their own empty
        // database; limit the pool to one.
        Self::new(options, Some(1)).await
    }

    /// Base connection options shared between file and in-memory databases.
    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            // WAL keeps status-page reads from blocking a reconcile write.
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            // The releases table references mods; enforce it.
            .foreign_keys(true)
            // PRAGMA synchronous = NORMAL is durable enough under WAL: a
            // crash mid-upsert rolls the transaction back, it never leaves
            // a half-written release row.
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_millis(1500))
    }

    /// Apply additional PRAGMA settings that aren't exposed via SqliteConnectOptions.
    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA wal_autocheckpoint = 800;
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Run database migrations.
    ///
    /// Called automatically by `connect` and `connect_in_memory`.
    #[instrument("performing database migrations")]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    ///
    /// Waits for all connections to be returned to the pool and then closes
    /// them. After calling this, the Database instance should not be used.
    pub async fn close(&self) {
        // Let SQLite update query planner statistics before shutdown.
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_in_memory() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(!db.pool().is_closed());
        db.close().await;
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let db = Database::connect_in_memory().await.unwrap();
        let row: (i64,) = sqlx::query_as("PRAGMA foreign_keys").fetch_one(db.pool()).await.unwrap();
        assert_eq!(row.0, 1, "foreign_keys should be ON");
        let orphan = sqlx::query("INSERT INTO releases (remote_id, mod_slug, maturity, filename, version_label) VALUES ('1', 'nope', 'Release', 'a.jar', '1.7.10')")
            .execute(db.pool())
            .await;
        assert!(orphan.is_err(), "release without its mod must be rejected");
        db.close().await;
    }
}
