use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backup::BackupError;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{action}: {source}")]
    BackupFailed {
        action: &'static str,
        #[source]
        source: BackupError,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Weather service unavailable: {0}")]
    WeatherUnavailable(String),

    #[error("Weather data not found for city: {0}")]
    WeatherNotFound(String),

    #[error("Error parsing weather data: {0}")]
    WeatherParse(String),
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Migration(ref e) => {
                tracing::error!("Migration error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::TaskJoin(ref e) => {
                tracing::error!("Task join error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::NotFound(_) | AppError::TableNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::HttpClient(ref e) => {
                tracing::error!("HTTP client error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            // The manager already logged the cause with path and operation
            AppError::BackupFailed { action, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, action.to_string())
            }
            AppError::WeatherUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::WeatherNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::WeatherParse(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::path::PathBuf;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_backup_failure_hides_paths() {
        let error = AppError::BackupFailed {
            action: "Failed to restore from backup",
            source: BackupError::NoBackupAvailable(PathBuf::from("/srv/data/app_backup.db")),
        };

        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to restore from backup");
    }

    #[tokio::test]
    async fn test_http_client_error_is_internal() {
        let source = reqwest::Client::new().get("not a url").build().unwrap_err();

        let (status, body) = render(AppError::from(source)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
