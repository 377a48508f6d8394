//! Inventory Backup Server Library
//!
//! A small CRUD API over a single SQLite file, a copy-based backup manager
//! with a periodic scheduler, and a command-line agent that drives the API
//! through a local language model.

pub mod agent;
pub mod backup;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod weather;

pub use backup::{BackupManager, BackupScheduler};
pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};

use std::sync::Arc;
use std::time::Duration;

use crate::constants::WEATHER_TIMEOUT_SECS;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub backups: Arc<BackupManager>,
    pub http: reqwest::Client,
}

impl AppState {
    /// Create a new AppState with the given database and configuration
    ///
    /// The backup manager is built from the configured paths.
    pub fn new(db: Db, config: Config) -> Result<Self> {
        let backups = BackupManager::new(
            &config.database_path,
            &config.backup_db_path,
            &config.backup_dir,
        )
        .with_keep_count(config.backup_keep_count);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(WEATHER_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            db,
            config,
            backups: Arc::new(backups),
            http,
        })
    }
}
