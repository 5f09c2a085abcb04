//! chartdex Storage
//!
//! `SQLite` and in-memory implementations of
//! [`ChartCatalog`](chartdex_core::ChartCatalog).
//!
//! Records live in a single `charts` table keyed by a unique `path`;
//! per-instrument data is stored as a JSON column.
//!
//! # Example
//!
//! ```rust,no_run
//! use chartdex_core::ChartCatalog;
//! use chartdex_storage::{create_pool, run_migrations, SqliteCatalog};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://chartdex.db").await?;
//! run_migrations(&pool).await?;
//!
//! let catalog = SqliteCatalog::new(pool);
//! let paths = catalog.get_all_paths().await?;
//! println!("{} charts", paths.len());
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod memory;

pub mod charts;

pub use context::SqliteCatalog;
pub use error::{Result, StorageError};
pub use memory::MemoryCatalog;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://chartdex.db`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    debug!(url = database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Open (creating if needed) and migrate the catalog at `database_url`
///
/// # Errors
///
/// Returns an error if the connection or a migration fails
pub async fn open_catalog(database_url: &str) -> Result<SqliteCatalog> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    Ok(SqliteCatalog::new(pool))
}
