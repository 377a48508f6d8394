pub mod pool;
pub mod tables;

use sqlx::SqlitePool;
use std::path::Path;

use crate::error::AppError;

/// Database handle type (a pool is already cheap to clone)
pub type Db = SqlitePool;

/// Open or create the SQLite store at the given path
///
/// Applies the embedded migrations, so the `users` and `inventory` tables
/// exist on return.
pub async fn open_database(path: impl AsRef<Path>) -> Result<Db, AppError> {
    let path = path.as_ref();
    tracing::info!("Opening database at: {:?}", path);

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                AppError::Database(sqlx::Error::Io(e))
            })?;
        }
    }

    let pool = pool::create_pool(path).await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database initialized successfully");

    Ok(pool)
}

/// Check that the store answers a trivial query
pub async fn ping(db: &Db) -> bool {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(db).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            false
        }
    }
}
