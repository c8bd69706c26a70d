//! Sync Publisher
//!
//! Writes the dataset locally, then pushes the written file to a remote
//! mirror. The local write always comes first and is never undone: the mirror
//! is a replica that may lag behind, not a gate on local durability.
//!
//! ## Publish cycle
//!
//! ```text
//! Idle -> LocalWriting -> LocalFailed                      (nothing persisted)
//!                      -> LocallyWritten -> RemoteSyncing -> RemoteFailed  (local durable)
//!                                                         -> Synced
//! ```
//!
//! Remote propagation starts from a clean working copy: a working copy left
//! at the configured location is removed before cloning, and the working copy
//! is removed again when the cycle ends, whatever the outcome. A directory
//! there that is not a working copy is left untouched and fails the cycle.
//! There are no retries; a caller may simply publish again.
//!
//! ## Metrics tracked
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `publish_ms` | Timing | Wall-clock time of the whole cycle |
//! | `publish_success` | Counter | Cycles that reached `Synced` |
//! | `publish_local_failure` | Counter | Cycles that stopped at `LocalFailed` |
//! | `publish_remote_failure` | Counter | Cycles that stopped at `RemoteFailed` |

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::RemoteConfig;
use crate::core::error::{RemoteError, RemoteFailureKind, RemoteStep, StoreError};
use crate::core::metrics::{ids, MetricsCollector};
use crate::core::record::InventoryRecord;
use crate::runtime::timer::Timer;
use crate::stages::storage::DatasetStore;
use crate::stages::PipelineStage;

use super::transport::RemoteTransport;

/// Result of one publish cycle
#[derive(Debug, Clone)]
pub enum PublishOutcome {
    /// Written locally and pushed to the mirror
    Success,
    /// Written locally; no mirror is configured
    LocalOnly,
    /// Nothing was persisted
    LocalFailure(StoreError),
    /// Written locally, mirror not updated
    RemoteFailure(RemoteError),
}

impl PublishOutcome {
    /// Whether the new data is on local disk
    pub fn is_durable(&self) -> bool {
        !matches!(self, PublishOutcome::LocalFailure(_))
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, PublishOutcome::Success)
    }

    /// Message suitable for showing to the person who added the record
    pub fn user_message(&self) -> String {
        match self {
            PublishOutcome::Success => "Record saved and synced to the remote mirror".to_string(),
            PublishOutcome::LocalOnly => "Record saved locally (remote sync disabled)".to_string(),
            PublishOutcome::LocalFailure(err) => format!("Record not saved: {}", err),
            PublishOutcome::RemoteFailure(err) => {
                format!("Record saved locally, not yet synced: {}", err)
            }
        }
    }
}

/// Where the last publish cycle got to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishState {
    Idle,
    LocalWriting,
    LocalFailed,
    LocallyWritten,
    RemoteSyncing,
    RemoteFailed,
    Synced,
}

impl PublishState {
    /// A cycle ends in one of these states
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PublishState::LocalFailed | PublishState::RemoteFailed | PublishState::Synced
        )
    }
}

pub struct SyncPublisher {
    remote: RemoteConfig,
    transport: Box<dyn RemoteTransport>,
    state: PublishState,
    metrics: MetricsCollector,
}

impl SyncPublisher {
    pub fn new(remote: RemoteConfig, transport: Box<dyn RemoteTransport>) -> Self {
        Self {
            remote,
            transport,
            state: PublishState::Idle,
            metrics: MetricsCollector::new(),
        }
    }

    /// Record cycle metrics into a shared collector
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn remote(&self) -> &RemoteConfig {
        &self.remote
    }

    /// State reached by the most recent cycle
    pub fn state(&self) -> PublishState {
        self.state
    }

    /// Flush `records` to `store`, then push the file with the configured message
    pub fn publish(&mut self, store: &DatasetStore, records: &[InventoryRecord]) -> PublishOutcome {
        let message = self.remote.commit_message.clone();
        self.publish_with_message(store, records, &message)
    }

    /// Like [`SyncPublisher::publish`] with a caller-supplied commit message
    pub fn publish_with_message(
        &mut self,
        store: &DatasetStore,
        records: &[InventoryRecord],
        message: &str,
    ) -> PublishOutcome {
        let cycle = Uuid::new_v4();
        let span = info_span!("publish", %cycle, stage = %PipelineStage::Distribution);
        let _guard = span.enter();
        let timer = Timer::now();

        self.transition(PublishState::LocalWriting);
        if let Err(err) = store.flush(records) {
            error!(error = %err, "Local write failed, skipping remote sync");
            self.transition(PublishState::LocalFailed);
            self.finish(&timer, ids::PUBLISH_LOCAL_FAILURE);
            return PublishOutcome::LocalFailure(err);
        }
        self.transition(PublishState::LocallyWritten);

        self.transition(PublishState::RemoteSyncing);
        let result = self.propagate(store, message);
        self.cleanup();

        match result {
            Ok(()) => {
                info!(
                    repository = %self.remote.repository_url,
                    branch = %self.remote.branch,
                    rows = records.len(),
                    "Dataset synced to remote mirror"
                );
                self.transition(PublishState::Synced);
                self.finish(&timer, ids::PUBLISH_SUCCESS);
                PublishOutcome::Success
            }
            Err(err) => {
                warn!(error = %err, "Dataset saved locally but not synced");
                self.transition(PublishState::RemoteFailed);
                self.finish(&timer, ids::PUBLISH_REMOTE_FAILURE);
                PublishOutcome::RemoteFailure(err)
            }
        }
    }

    fn propagate(&mut self, store: &DatasetStore, message: &str) -> Result<(), RemoteError> {
        let workdir = self.remote.workdir.clone();
        remove_working_copy(&workdir).map_err(|e| RemoteError::io(RemoteStep::Prepare, e))?;

        let content = store
            .read_bytes()
            .map_err(|e| RemoteError::new(RemoteStep::ReplaceFile, RemoteFailureKind::Io, e.to_string()))?;

        debug!(workdir = %workdir.display(), "Cloning remote mirror");
        self.transport
            .clone_repo(&self.remote.repository_url, &self.remote.branch, &workdir)?;

        let relative = self.remote.dataset_path_in_repo.clone();
        self.transport.replace_file(&workdir.join(&relative), &content)?;
        self.transport.stage(&workdir, &relative)?;
        self.transport.commit(&workdir, message)?;
        self.transport.push(&workdir, &self.remote.branch)?;
        Ok(())
    }

    fn cleanup(&self) {
        if let Err(err) = remove_working_copy(&self.remote.workdir) {
            warn!(
                workdir = %self.remote.workdir.display(),
                error = %err,
                "Failed to remove working copy"
            );
        }
    }

    fn transition(&mut self, next: PublishState) {
        debug!(from = ?self.state, to = ?next, "Publish state change");
        self.state = next;
    }

    fn finish(&self, timer: &Timer, outcome_metric: &str) {
        self.metrics.record(ids::PUBLISH_MS, timer.elapsed_ms());
        self.metrics.increment(outcome_metric);
    }
}

/// Remove a working copy left at `path`
///
/// Only a directory holding a `.git` entry, or an empty directory, is
/// removed. Anything else at `path` is left alone and reported as an error.
fn remove_working_copy(path: &Path) -> std::io::Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if metadata.is_dir() && path.join(".git").exists() {
        return std::fs::remove_dir_all(path);
    }
    if metadata.is_dir() && std::fs::read_dir(path)?.next().is_none() {
        return std::fs::remove_dir(path);
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!(
            "{} exists and is not a git working copy, refusing to delete it",
            path.display()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_durability() {
        assert!(PublishOutcome::Success.is_durable());
        assert!(PublishOutcome::LocalOnly.is_durable());
        assert!(PublishOutcome::RemoteFailure(RemoteError::new(
            RemoteStep::Push,
            RemoteFailureKind::Network,
            "offline"
        ))
        .is_durable());
        assert!(!PublishOutcome::LocalFailure(StoreError::Write {
            path: "lego.csv".into(),
            reason: "disk full".into()
        })
        .is_durable());
    }

    #[test]
    fn test_user_messages_distinguish_partial_failure() {
        let remote = PublishOutcome::RemoteFailure(RemoteError::new(
            RemoteStep::Push,
            RemoteFailureKind::Authentication,
            "denied",
        ));
        assert!(remote.user_message().contains("saved locally, not yet synced"));

        let local = PublishOutcome::LocalFailure(StoreError::Write {
            path: "lego.csv".into(),
            reason: "disk full".into(),
        });
        assert!(local.user_message().starts_with("Record not saved"));
    }

    #[test]
    fn test_terminal_states() {
        assert!(PublishState::Synced.is_terminal());
        assert!(PublishState::RemoteFailed.is_terminal());
        assert!(PublishState::LocalFailed.is_terminal());
        assert!(!PublishState::LocallyWritten.is_terminal());
        assert!(!PublishState::Idle.is_terminal());
    }

    #[test]
    fn test_remove_missing_working_copy_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_working_copy(&dir.path().join("never-created")).is_ok());
    }

    #[test]
    fn test_remove_working_copy_with_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("mirror");
        std::fs::create_dir_all(workdir.join(".git")).unwrap();
        std::fs::write(workdir.join(".git").join("config"), "url = secret").unwrap();
        std::fs::write(workdir.join("lego.csv"), "rows").unwrap();

        remove_working_copy(&workdir).unwrap();
        assert!(!workdir.exists());
    }

    #[test]
    fn test_remove_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("mirror");
        std::fs::create_dir(&workdir).unwrap();

        remove_working_copy(&workdir).unwrap();
        assert!(!workdir.exists());
    }

    #[test]
    fn test_refuses_to_remove_unrelated_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        let err = remove_working_copy(dir.path()).unwrap_err();
        assert!(err.to_string().contains("refusing"));
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_refuses_to_remove_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mirror");
        std::fs::write(&file, "not a directory").unwrap();

        assert!(remove_working_copy(&file).is_err());
        assert!(file.exists());
    }
}
