use chrono::{DateTime, Local};
use serde::Serialize;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::BackupError;
use crate::constants::{
    DEFAULT_BACKUP_KEEP_COUNT, SAFETY_COPY_SUFFIX, TIMESTAMPED_BACKUP_FORMAT,
    TIMESTAMPED_BACKUP_PREFIX, TIMESTAMPED_BACKUP_SUFFIX,
};

/// Outcome of [`BackupManager::initialize_secondary_backup`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryInit {
    /// The store does not exist yet; nothing was touched
    NotReady,
    /// The secondary backup was absent and has been seeded from the store
    Created,
    /// A secondary backup already existed and was left alone
    AlreadyPresent,
}

/// Result of an integrity check on a database file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub valid: bool,
    /// Raw `PRAGMA integrity_check` output, or the reason the check could not run
    pub message: String,
}

/// Snapshot of the store and its backups. Reading it mutates nothing.
#[derive(Debug, Clone, Serialize)]
pub struct BackupStatus {
    pub main_db_exists: bool,
    pub backup_db_exists: bool,
    pub main_db_size: u64,
    pub backup_db_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_db_modified: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_db_modified: Option<DateTime<Local>>,
    pub timestamped_backups: usize,
}

/// Copy-based backup, restore and verification for the store file
///
/// The manager only reads the store; the CRUD layer is its sole writer.
/// Nothing locks the store while it is copied, so a copy taken during a
/// commit can capture a half-written file.
///
/// Every public operation logs its own failures (path and operation) before
/// handing back a `BackupError`, so callers only decide what to report.
#[derive(Debug, Clone)]
pub struct BackupManager {
    primary: PathBuf,
    secondary: PathBuf,
    timestamped_dir: PathBuf,
    safety_copy: PathBuf,
    keep_count: usize,
}

impl BackupManager {
    pub fn new(
        primary: impl Into<PathBuf>,
        secondary: impl Into<PathBuf>,
        timestamped_dir: impl Into<PathBuf>,
    ) -> Self {
        let primary = primary.into();
        let safety_copy = safety_copy_path(&primary);

        Self {
            primary,
            secondary: secondary.into(),
            timestamped_dir: timestamped_dir.into(),
            safety_copy,
            keep_count: DEFAULT_BACKUP_KEEP_COUNT,
        }
    }

    /// Number of timestamped backups kept after each timestamped backup
    ///
    /// At least one is always kept, so the backup just written survives its
    /// own pruning.
    pub fn with_keep_count(mut self, keep_count: usize) -> Self {
        self.keep_count = keep_count.max(1);
        self
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary
    }

    pub fn secondary_path(&self) -> &Path {
        &self.secondary
    }

    pub fn timestamped_dir(&self) -> &Path {
        &self.timestamped_dir
    }

    pub fn safety_copy_path(&self) -> &Path {
        &self.safety_copy
    }

    pub fn keep_count(&self) -> usize {
        self.keep_count
    }

    /// Create the timestamped-backup directory tree if needed
    ///
    /// Idempotent. Permission and other filesystem errors are surfaced as
    /// `BackupError::Io` rather than swallowed.
    pub fn ensure_backup_directory(&self) -> Result<(), BackupError> {
        fs::create_dir_all(&self.timestamped_dir)
            .map_err(|e| BackupError::io("create_dir", &self.timestamped_dir, e))
            .inspect_err(|e| log_failure("ensure_backup_directory", e))
    }

    /// Seed the secondary backup from the store if it does not exist yet
    ///
    /// Never overwrites an existing secondary backup.
    pub fn initialize_secondary_backup(&self) -> Result<SecondaryInit, BackupError> {
        self.seed_secondary()
            .inspect_err(|e| log_failure("initialize_secondary_backup", e))
    }

    /// Overwrite the secondary backup with the current store contents
    pub fn backup_to_secondary(&self) -> Result<(), BackupError> {
        self.copy_to_secondary()
            .inspect_err(|e| log_failure("backup_to_secondary", e))
    }

    /// Copy the store to a new timestamped file, then prune old ones
    ///
    /// Returns the path of the new backup. Two calls within the same second
    /// target the same file and the later copy wins.
    pub fn backup_to_timestamped_file(&self) -> Result<PathBuf, BackupError> {
        self.copy_to_timestamped()
            .inspect_err(|e| log_failure("backup_to_timestamped_file", e))
    }

    /// Delete all but the `keep_count` most recently modified timestamped backups
    ///
    /// Returns how many files were removed. A file that disappears between
    /// listing and deletion is skipped, not treated as an error.
    pub fn prune_timestamped_backups(&self, keep_count: usize) -> Result<usize, BackupError> {
        self.prune(keep_count)
            .inspect_err(|e| log_failure("prune_timestamped_backups", e))
    }

    /// Replace the store with the secondary backup
    ///
    /// An existing store is first copied to the safety path, replacing any
    /// earlier safety copy. The safety copy is never removed automatically.
    pub fn restore_from_secondary(&self) -> Result<(), BackupError> {
        self.restore().inspect_err(|e| log_failure("restore_from_secondary", e))
    }

    /// Every timestamped backup file currently on disk, in no particular order
    pub fn list_timestamped_backups(&self) -> Result<Vec<PathBuf>, BackupError> {
        let entries = match fs::read_dir(&self.timestamped_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BackupError::io("read_dir", &self.timestamped_dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BackupError::io("read_dir", &self.timestamped_dir, e))?;
            if is_timestamped_backup_name(&entry.file_name()) {
                files.push(entry.path());
            }
        }

        Ok(files)
    }

    /// Report existence, sizes, modification times and backup count
    pub fn get_backup_status(&self) -> BackupStatus {
        let main = fs::metadata(&self.primary).ok();
        let backup = fs::metadata(&self.secondary).ok();

        let timestamped_backups = match self.list_timestamped_backups() {
            Ok(files) => files.len(),
            Err(e) => {
                log_failure("get_backup_status", &e);
                0
            }
        };

        BackupStatus {
            main_db_exists: main.is_some(),
            backup_db_exists: backup.is_some(),
            main_db_size: main.as_ref().map(|m| m.len()).unwrap_or(0),
            backup_db_size: backup.as_ref().map(|m| m.len()).unwrap_or(0),
            main_db_modified: main.as_ref().and_then(modified_time),
            backup_db_modified: backup.as_ref().and_then(modified_time),
            timestamped_backups,
        }
    }

    fn seed_secondary(&self) -> Result<SecondaryInit, BackupError> {
        if !self.primary.exists() {
            tracing::warn!(path = %self.primary.display(), "Main database does not exist yet");
            return Ok(SecondaryInit::NotReady);
        }

        if self.secondary.exists() {
            return Ok(SecondaryInit::AlreadyPresent);
        }

        ensure_parent(&self.secondary)?;
        copy_file(&self.primary, &self.secondary)?;
        tracing::info!(path = %self.secondary.display(), "Backup database created");

        Ok(SecondaryInit::Created)
    }

    fn copy_to_secondary(&self) -> Result<(), BackupError> {
        if !self.primary.exists() {
            return Err(BackupError::SourceMissing(self.primary.clone()));
        }

        // A freshly seeded secondary is still overwritten below: the store
        // may have changed between the two copies.
        self.seed_secondary()?;
        copy_file(&self.primary, &self.secondary)?;

        tracing::info!(path = %self.secondary.display(), "Database backed up");
        Ok(())
    }

    fn copy_to_timestamped(&self) -> Result<PathBuf, BackupError> {
        if !self.primary.exists() {
            return Err(BackupError::SourceMissing(self.primary.clone()));
        }

        self.ensure_backup_directory()?;

        let timestamp = Local::now().format(TIMESTAMPED_BACKUP_FORMAT);
        let target = self.timestamped_dir.join(format!(
            "{TIMESTAMPED_BACKUP_PREFIX}{timestamp}{TIMESTAMPED_BACKUP_SUFFIX}"
        ));

        copy_file(&self.primary, &target)?;
        tracing::info!(path = %target.display(), "Timestamped backup created");

        let removed = self.prune_timestamped_backups(self.keep_count)?;
        if removed > 0 {
            tracing::debug!(removed, keep = self.keep_count, "Pruned timestamped backups");
        }

        Ok(target)
    }

    fn prune(&self, keep_count: usize) -> Result<usize, BackupError> {
        let mut backups: Vec<(PathBuf, SystemTime)> = Vec::new();

        for path in self.list_timestamped_backups()? {
            match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(modified) => backups.push((path, modified)),
                // Deleted by someone else since the listing
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(BackupError::io("stat", &path, e)),
            }
        }

        // Newest first; ties broken by name so the order is deterministic
        backups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

        remove_oldest(backups.into_iter().map(|(path, _)| path), keep_count)
    }

    fn restore(&self) -> Result<(), BackupError> {
        if !self.secondary.exists() {
            return Err(BackupError::NoBackupAvailable(self.secondary.clone()));
        }

        if self.primary.exists() {
            copy_file(&self.primary, &self.safety_copy)?;
            tracing::info!(path = %self.safety_copy.display(), "Safety backup created");
        } else {
            ensure_parent(&self.primary)?;
        }

        copy_file(&self.secondary, &self.primary)?;
        tracing::info!(from = %self.secondary.display(), "Database restored");
        Ok(())
    }
}

/// Run SQLite's `PRAGMA integrity_check` against a database file
///
/// A missing, unreadable or non-database file yields `valid: false` with the
/// reason in `message`; this never returns an error.
pub async fn verify_integrity(path: &Path) -> IntegrityReport {
    let report = match run_integrity_check(path).await {
        Ok(lines) => {
            let message = lines.join("\n");
            IntegrityReport {
                valid: lines.len() == 1 && lines[0] == "ok",
                message,
            }
        }
        Err(message) => IntegrityReport {
            valid: false,
            message,
        },
    };

    if report.valid {
        tracing::info!(path = %path.display(), "Database integrity check passed");
    } else {
        tracing::error!(
            path = %path.display(),
            message = %report.message,
            "Database integrity check failed"
        );
    }

    report
}

async fn run_integrity_check(path: &Path) -> Result<Vec<String>, String> {
    if !path.exists() {
        return Err(format!("database file {} does not exist", path.display()));
    }

    // Read-only, so checking a backup never touches it
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false)
        .connect()
        .await
        .map_err(|e| e.to_string())?;

    let result = sqlx::query_scalar::<_, String>("PRAGMA integrity_check")
        .fetch_all(&mut conn)
        .await
        .map_err(|e| e.to_string());

    if let Err(e) = conn.close().await {
        tracing::debug!(path = %path.display(), error = %e, "Closing integrity-check connection failed");
    }

    result
}

/// `<store path>.before_restore`
pub fn safety_copy_path(primary: &Path) -> PathBuf {
    let mut name: OsString = primary.as_os_str().to_owned();
    name.push(SAFETY_COPY_SUFFIX);
    PathBuf::from(name)
}

fn is_timestamped_backup_name(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| {
        n.starts_with(TIMESTAMPED_BACKUP_PREFIX) && n.ends_with(TIMESTAMPED_BACKUP_SUFFIX)
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<(), BackupError> {
    fs::copy(from, to).map(|_| ()).map_err(|e| {
        tracing::debug!(from = %from.display(), to = %to.display(), "Copy failed");
        BackupError::io("copy", to, e)
    })
}

/// Delete every path after the first `keep_count` of a newest-first listing
///
/// Returns how many files were actually removed; paths already gone are skipped.
fn remove_oldest(
    newest_first: impl IntoIterator<Item = PathBuf>,
    keep_count: usize,
) -> Result<usize, BackupError> {
    let mut removed = 0;
    for path in newest_first.into_iter().skip(keep_count) {
        match fs::remove_file(&path) {
            Ok(()) => {
                removed += 1;
                tracing::info!(path = %path.display(), "Removed old backup");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Old backup already gone");
            }
            Err(e) => return Err(BackupError::io("remove", &path, e)),
        }
    }

    Ok(removed)
}

fn ensure_parent(path: &Path) -> Result<(), BackupError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| BackupError::io("create_dir", parent, e))
        }
        _ => Ok(()),
    }
}

fn modified_time(meta: &fs::Metadata) -> Option<DateTime<Local>> {
    meta.modified().ok().map(DateTime::<Local>::from)
}

fn log_failure(operation: &'static str, error: &BackupError) {
    match error {
        BackupError::SourceMissing(path) | BackupError::NoBackupAvailable(path) => {
            tracing::warn!(operation, path = %path.display(), "{error}");
        }
        BackupError::Io { op, path, source } => {
            tracing::error!(
                operation,
                op = *op,
                path = %path.display(),
                error = %source,
                "Backup filesystem operation failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safety_copy_path_appends_suffix() {
        let path = safety_copy_path(Path::new("storage/app.db"));
        assert_eq!(path, PathBuf::from("storage/app.db.before_restore"));
    }

    #[test]
    fn test_timestamped_name_filter() {
        assert!(is_timestamped_backup_name("app_backup_20240101_120000.db".as_ref()));
        assert!(!is_timestamped_backup_name("app_backup_20240101_120000.db-journal".as_ref()));
        assert!(!is_timestamped_backup_name("notes.txt".as_ref()));
        assert!(!is_timestamped_backup_name("app.db".as_ref()));
    }

    #[test]
    fn test_new_uses_default_keep_count() {
        let manager = BackupManager::new("a.db", "b.db", "backups");
        assert_eq!(manager.keep_count(), DEFAULT_BACKUP_KEEP_COUNT);
        assert_eq!(manager.clone().with_keep_count(3).keep_count(), 3);
        assert_eq!(manager.with_keep_count(0).keep_count(), 1);
    }

    #[test]
    fn test_remove_oldest_skips_vanished_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..4)
            .map(|i| dir.path().join(format!("app_backup_2024010{i}_000000.db")))
            .collect();
        for path in &paths {
            fs::write(path, b"backup").unwrap();
        }
        // Deleted by someone else after the listing was taken
        fs::remove_file(&paths[3]).unwrap();

        let removed = remove_oldest(paths.clone(), 1).unwrap();

        assert_eq!(removed, 2);
        assert!(paths[0].exists());
        assert!(!paths[1].exists());
        assert!(!paths[2].exists());
    }

    #[test]
    fn test_remove_oldest_within_limit_removes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("app_backup_20240101_000000.db");
        fs::write(&path, b"backup").unwrap();

        assert_eq!(remove_oldest(vec![path.clone()], 5).unwrap(), 0);
        assert!(path.exists());
    }
}
