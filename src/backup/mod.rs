//! Store backups: copying, retention, restore, integrity checks and the
//! periodic task that drives them.

pub mod manager;
pub mod scheduler;

pub use manager::{
    safety_copy_path, verify_integrity, BackupManager, BackupStatus, IntegrityReport,
    SecondaryInit,
};
pub use scheduler::{BackupJob, BackupScheduler, CycleOutcome, ScheduleConfig};

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a backup operation did not complete
#[derive(Error, Debug)]
pub enum BackupError {
    /// The store file is absent; nothing was copied
    #[error("main database {} does not exist", .0.display())]
    SourceMissing(PathBuf),

    /// Restore was requested but there is no secondary backup
    #[error("no backup available at {}", .0.display())]
    NoBackupAvailable(PathBuf),

    #[error("{op} failed for {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BackupError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        BackupError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}
