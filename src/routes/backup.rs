use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::backup::{verify_integrity, BackupStatus, IntegrityReport};
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BackupCreatedResponse {
    pub message: &'static str,
    pub backup_file: String,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub message: &'static str,
    pub safety_copy: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// `valid` or `invalid`
    pub status: &'static str,
    /// `main` or `backup`
    pub database: &'static str,
    pub message: &'static str,
    /// Raw integrity-check output
    pub detail: String,
}

/// Manually trigger a backup to the secondary database
///
/// POST /backup/create
pub async fn create_backup(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<BackupCreatedResponse>)> {
    let backups = state.backups.clone();

    tokio::task::spawn_blocking(move || backups.backup_to_secondary())
        .await?
        .map_err(|source| AppError::BackupFailed {
            action: "Failed to create backup",
            source,
        })?;

    Ok((
        StatusCode::CREATED,
        Json(BackupCreatedResponse {
            message: "Backup created successfully",
            backup_file: state.backups.secondary_path().display().to_string(),
        }),
    ))
}

/// Create a timestamped backup file and prune old ones
///
/// POST /backup/create-timestamped
pub async fn create_timestamped_backup(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<BackupCreatedResponse>)> {
    let backups = state.backups.clone();

    let path = tokio::task::spawn_blocking(move || backups.backup_to_timestamped_file())
        .await?
        .map_err(|source| AppError::BackupFailed {
            action: "Failed to create timestamped backup",
            source,
        })?;

    Ok((
        StatusCode::CREATED,
        Json(BackupCreatedResponse {
            message: "Timestamped backup created successfully",
            backup_file: path.display().to_string(),
        }),
    ))
}

/// Restore the store from the secondary backup
///
/// POST /backup/restore
///
/// # Note
/// Connections already open against the store are not coordinated with the
/// copy; requests in flight during a restore may see either version.
pub async fn restore_backup(State(state): State<AppState>) -> Result<Json<RestoreResponse>> {
    let backups = state.backups.clone();

    tokio::task::spawn_blocking(move || backups.restore_from_secondary())
        .await?
        .map_err(|source| AppError::BackupFailed {
            action: "Failed to restore from backup",
            source,
        })?;

    Ok(Json(RestoreResponse {
        message: "Database restored from backup successfully",
        safety_copy: state.backups.safety_copy_path().display().to_string(),
    }))
}

/// GET /backup/info
pub async fn backup_information(State(state): State<AppState>) -> Result<Json<BackupStatus>> {
    let backups = state.backups.clone();
    let status = tokio::task::spawn_blocking(move || backups.get_backup_status()).await?;
    Ok(Json(status))
}

/// GET /backup/verify-main
pub async fn verify_main_database(State(state): State<AppState>) -> Json<VerifyResponse> {
    let report = verify_integrity(state.backups.primary_path()).await;
    Json(verify_response("main", report))
}

/// GET /backup/verify-backup
pub async fn verify_backup_database(State(state): State<AppState>) -> Json<VerifyResponse> {
    let report = verify_integrity(state.backups.secondary_path()).await;
    Json(verify_response("backup", report))
}

fn verify_response(database: &'static str, report: IntegrityReport) -> VerifyResponse {
    let message = match (database, report.valid) {
        ("main", true) => "Database integrity check passed",
        ("main", false) => "Database integrity check failed",
        (_, true) => "Backup database integrity check passed",
        (_, false) => "Backup database integrity check failed",
    };

    VerifyResponse {
        status: if report.valid { "valid" } else { "invalid" },
        database,
        message,
        detail: report.message,
    }
}
