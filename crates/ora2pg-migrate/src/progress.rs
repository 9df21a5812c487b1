//! Migration progress polling.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::{MigrationProgress, MigrationStatus};
use crate::error::{MigrateError, Result};

/// Delay between polls while the migration is running.
pub const RUNNING_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Delay between polls while the migration is idle or paused.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Anything that can report a project's migration progress.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    async fn progress(&self, project_id: &str) -> Result<MigrationProgress>;
}

/// Poll intervals, overridable for tests.
#[derive(Debug, Clone, Copy)]
pub struct PollIntervals {
    pub running: Duration,
    pub idle: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            running: RUNNING_POLL_INTERVAL,
            idle: IDLE_POLL_INTERVAL,
        }
    }
}

impl PollIntervals {
    fn for_status(&self, status: MigrationStatus) -> Duration {
        match status {
            MigrationStatus::Running => self.running,
            _ => self.idle,
        }
    }
}

/// Poll until the migration completes or fails.
///
/// Every snapshot is passed to `on_update`, the final one included. Polls
/// are strictly sequential. Fetch errors end the loop.
pub async fn poll_progress<S, F>(
    source: &S,
    project_id: &str,
    cancel: CancellationToken,
    on_update: F,
) -> Result<MigrationProgress>
where
    S: ProgressSource + ?Sized,
    F: FnMut(&MigrationProgress),
{
    poll_progress_with(source, project_id, cancel, PollIntervals::default(), on_update).await
}

/// [`poll_progress`] with explicit intervals.
pub async fn poll_progress_with<S, F>(
    source: &S,
    project_id: &str,
    cancel: CancellationToken,
    intervals: PollIntervals,
    mut on_update: F,
) -> Result<MigrationProgress>
where
    S: ProgressSource + ?Sized,
    F: FnMut(&MigrationProgress),
{
    loop {
        let progress = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MigrateError::Cancelled),
            result = source.progress(project_id) => result?,
        };
        on_update(&progress);

        if progress.status.is_terminal() {
            info!(
                "Migration {} finished with status {} ({}/{} tables)",
                project_id, progress.status, progress.completed_tables, progress.total_tables
            );
            return Ok(progress);
        }

        let delay = intervals.for_status(progress.status);
        debug!("Migration {} is {}, next poll in {:?}", project_id, progress.status, delay);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MigrateError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedSource {
        script: Mutex<VecDeque<MigrationStatus>>,
        calls: Mutex<usize>,
    }

    impl ScriptedSource {
        fn new(statuses: &[MigrationStatus]) -> Self {
            Self {
                script: Mutex::new(statuses.iter().copied().collect()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ProgressSource for ScriptedSource {
        async fn progress(&self, project_id: &str) -> Result<MigrationProgress> {
            *self.calls.lock().unwrap() += 1;
            let mut script = self.script.lock().unwrap();
            let status = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                *script.front().unwrap()
            };
            Ok(MigrationProgress {
                project_id: project_id.to_string(),
                status,
                ..Default::default()
            })
        }
    }

    fn fast() -> PollIntervals {
        PollIntervals {
            running: Duration::from_millis(1),
            idle: Duration::from_millis(2),
        }
    }

    #[tokio::test]
    async fn test_polls_until_completed() {
        let source = ScriptedSource::new(&[
            MigrationStatus::Idle,
            MigrationStatus::Running,
            MigrationStatus::Paused,
            MigrationStatus::Running,
            MigrationStatus::Completed,
        ]);
        let mut seen = Vec::new();
        let last = poll_progress_with(&source, "p1", CancellationToken::new(), fast(), |p| {
            seen.push(p.status)
        })
        .await
        .unwrap();

        assert_eq!(last.status, MigrationStatus::Completed);
        assert_eq!(last.project_id, "p1");
        assert_eq!(seen.len(), 5);
        assert_eq!(source.calls(), 5);
    }

    #[tokio::test]
    async fn test_error_status_is_terminal() {
        let source = ScriptedSource::new(&[MigrationStatus::Running, MigrationStatus::Error]);
        let last = poll_progress_with(&source, "p1", CancellationToken::new(), fast(), |_| {})
            .await
            .unwrap();
        assert_eq!(last.status, MigrationStatus::Error);
    }

    #[tokio::test]
    async fn test_cancel_stops_polling() {
        let source = ScriptedSource::new(&[MigrationStatus::Running]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut updates = 0;
        let result = poll_progress_with(&source, "p1", cancel, fast(), |_| {
            updates += 1;
            if updates == 3 {
                trigger.cancel();
            }
        })
        .await;

        assert!(matches!(result, Err(MigrateError::Cancelled)));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_already_cancelled() {
        let source = ScriptedSource::new(&[MigrationStatus::Running]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = poll_progress(&source, "p1", cancel, |_| {}).await;
        assert!(matches!(result, Err(MigrateError::Cancelled)));
    }
}
