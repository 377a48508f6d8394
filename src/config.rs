use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::backup::ScheduleConfig;
use crate::constants::{
    DEFAULT_BACKUP_INTERVAL_SECS, DEFAULT_BACKUP_KEEP_COUNT, DEFAULT_BACKUP_RETRY_SECS,
};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: PathBuf,
    pub backup_db_path: PathBuf,
    pub backup_dir: PathBuf,
    pub backup_interval_secs: u64,
    pub backup_retry_secs: u64,
    pub backup_keep_count: usize,
    pub weather_base_url: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = parse_var("SERVER_PORT", 8000)?;

        let database_path = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "storage/app.db".to_string())
            .into();
        let backup_db_path = env::var("BACKUP_DB_PATH")
            .unwrap_or_else(|_| "storage/app_backup.db".to_string())
            .into();
        let backup_dir = env::var("BACKUP_DIR")
            .unwrap_or_else(|_| "storage/backups".to_string())
            .into();

        let backup_interval_secs = parse_var("BACKUP_INTERVAL_SECS", DEFAULT_BACKUP_INTERVAL_SECS)?;
        let backup_retry_secs = parse_var("BACKUP_RETRY_SECS", DEFAULT_BACKUP_RETRY_SECS)?;
        let backup_keep_count = parse_var("BACKUP_KEEP_COUNT", DEFAULT_BACKUP_KEEP_COUNT)?;

        if backup_interval_secs == 0 {
            return Err("BACKUP_INTERVAL_SECS must be greater than zero".to_string());
        }
        if backup_keep_count == 0 {
            return Err("BACKUP_KEEP_COUNT must be greater than zero".to_string());
        }

        let weather_base_url =
            env::var("WEATHER_BASE_URL").unwrap_or_else(|_| "https://wttr.in".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let shutdown_timeout_secs = parse_var("SHUTDOWN_TIMEOUT_SECS", 30)?;

        Ok(Config {
            server_host,
            server_port,
            database_path,
            backup_db_path,
            backup_dir,
            backup_interval_secs,
            backup_retry_secs,
            backup_keep_count,
            weather_base_url,
            allowed_origins,
            environment,
            shutdown_timeout_secs,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Timing for the periodic backup task
    pub fn schedule(&self) -> ScheduleConfig {
        ScheduleConfig {
            interval: Duration::from_secs(self.backup_interval_secs),
            retry_interval: Duration::from_secs(self.backup_retry_secs),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| format!("Invalid {name}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value: u64 = parse_var("INVENTORY_BACKUP_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("INVENTORY_BACKUP_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16, String> = parse_var("INVENTORY_BACKUP_TEST_BAD_PORT", 8000);
        assert_eq!(result.unwrap_err(), "Invalid INVENTORY_BACKUP_TEST_BAD_PORT");
    }

    #[test]
    fn test_zero_keep_count_is_rejected() {
        env::set_var("BACKUP_KEEP_COUNT", "0");
        let result = Config::from_env();
        env::remove_var("BACKUP_KEEP_COUNT");

        assert_eq!(
            result.unwrap_err(),
            "BACKUP_KEEP_COUNT must be greater than zero"
        );
    }

    #[test]
    fn test_parse_var_trims_whitespace() {
        env::set_var("INVENTORY_BACKUP_TEST_KEEP", " 7 ");
        let value: usize = parse_var("INVENTORY_BACKUP_TEST_KEEP", 50).unwrap();
        assert_eq!(value, 7);
    }
}
