//! Periodic backup task.
//!
//! `Starting` runs the initial backup, then the task alternates between
//! `Waiting` (sleep) and `Running` (one cycle) until cancelled. A failed
//! cycle goes straight back to `Waiting`; a cycle that faults (panics) is
//! logged and followed by a shorter recovery sleep. Cancellation is observed
//! at every sleep and after the step in progress finishes, so a copy is
//! never abandoned halfway. This includes the initial backup: a shutdown
//! requested during start-up waits for that first copy to complete.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use super::{BackupManager, SecondaryInit};
use crate::constants::{DEFAULT_BACKUP_INTERVAL_SECS, DEFAULT_BACKUP_RETRY_SECS};

/// Timing of the periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Sleep between cycles
    pub interval: Duration,
    /// Sleep after a cycle faulted
    pub retry_interval: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_BACKUP_INTERVAL_SECS),
            retry_interval: Duration::from_secs(DEFAULT_BACKUP_RETRY_SECS),
        }
    }
}

/// What one periodic cycle achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub secondary_ok: bool,
    pub timestamped_ok: bool,
}

/// Work driven by [`BackupScheduler`]
///
/// Both methods block; the scheduler runs them on the blocking pool.
pub trait BackupJob: Send + Sync + 'static {
    /// Runs once when the task starts
    fn initial_backup(&self);

    /// Runs after every sleep
    fn run_cycle(&self) -> CycleOutcome;
}

impl BackupJob for BackupManager {
    fn initial_backup(&self) {
        if let Ok(SecondaryInit::Created) = self.initialize_secondary_backup() {
            tracing::debug!("Secondary backup seeded from the store");
        }
        if self.backup_to_secondary().is_ok() {
            tracing::info!("Initial backup completed");
        }
    }

    fn run_cycle(&self) -> CycleOutcome {
        let secondary_ok = self.backup_to_secondary().is_ok();
        let timestamped_ok = self.backup_to_timestamped_file().is_ok();

        CycleOutcome {
            secondary_ok,
            timestamped_ok,
        }
    }
}

/// Handle to the running backup task, owned by whoever manages the process
/// lifecycle. Dropping it does not stop the task; call [`shutdown`].
///
/// [`shutdown`]: BackupScheduler::shutdown
#[derive(Debug)]
pub struct BackupScheduler {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl BackupScheduler {
    /// Spawn the periodic task on the current tokio runtime
    pub fn start<J: BackupJob>(job: Arc<J>, schedule: ScheduleConfig) -> Self {
        let token = CancellationToken::new();
        let handle = tokio::spawn(run(job, schedule, token.clone()));

        Self { token, handle }
    }

    /// Ask the task to stop at its next suspension point
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task and wait until it has exited
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.token.cancel();
        self.handle.await
    }
}

async fn run<J: BackupJob>(job: Arc<J>, schedule: ScheduleConfig, token: CancellationToken) {
    tracing::info!(
        interval_secs = schedule.interval.as_secs(),
        "Starting periodic backup task"
    );

    let initial = {
        let job = Arc::clone(&job);
        tokio::task::spawn_blocking(move || job.initial_backup()).await
    };
    if let Err(fault) = initial {
        tracing::error!(error = %fault, "Error in initial backup");
    }

    loop {
        if !sleep_or_cancel(schedule.interval, &token).await {
            break;
        }

        tracing::info!("Running scheduled backup...");

        let cycle = {
            let job = Arc::clone(&job);
            tokio::task::spawn_blocking(move || job.run_cycle()).await
        };

        match cycle {
            Ok(outcome) => {
                if outcome.secondary_ok {
                    tracing::info!("Scheduled backup completed successfully");
                } else {
                    tracing::error!("Scheduled backup failed");
                }
                if !outcome.timestamped_ok {
                    tracing::error!("Scheduled timestamped backup failed");
                }
            }
            Err(fault) => {
                tracing::error!(
                    error = %fault,
                    retry_secs = schedule.retry_interval.as_secs(),
                    "Error in periodic backup"
                );
                if !sleep_or_cancel(schedule.retry_interval, &token).await {
                    break;
                }
            }
        }

        if token.is_cancelled() {
            break;
        }
    }

    tracing::info!("Backup task stopped");
}

/// Returns `false` if cancelled before the sleep elapsed
async fn sleep_or_cancel(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
