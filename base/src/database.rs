// File: base/src/database.rs
use futures::FutureExt;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{error, info};

use crate::errors::{BotError, Result};

/// Database handle opened from a DSN such as `sqlite:data/bot.db?mode=rwc`.
///
/// Clones share the same pool; closing any of them closes all.
#[derive(Clone, Debug)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub async fn open(dsn: &str) -> Result<Self> {
        if dsn.trim().is_empty() {
            return Err(BotError::Configuration(
                "must specify a database DSN".to_string(),
            ));
        }

        // Every in-memory connection is its own database, so pin a single one.
        let options = if dsn.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = match options.connect(dsn).await {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to connect to database: {}", e);
                return Err(BotError::Storage(e));
            }
        };

        info!("Database connection opened");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Closes every connection. Calling it again is a no-op.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        self.pool.close().await;
        info!("Database connection closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

/// Opens the database, runs `scope` with it and closes the handle once the
/// scope is over, whether it returned `Ok`, `Err` or panicked.
pub async fn with_database<F, Fut, T>(dsn: &str, scope: F) -> Result<T>
where
    F: FnOnce(Database) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let database = Database::open(dsn).await?;
    let outcome = AssertUnwindSafe(scope(database.clone()))
        .catch_unwind()
        .await;
    database.close().await;

    match outcome {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
