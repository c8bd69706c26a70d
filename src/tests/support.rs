//! Shared fixtures: dataset files and a scriptable remote transport

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RemoteConfig;
use crate::core::error::{RemoteError, RemoteFailureKind, RemoteStep};
use crate::core::record::InventoryRecord;
use crate::stages::distribution::RemoteTransport;
use crate::stages::storage::DatasetStore;

pub const HEADER: &str =
    "Block Type,Block Shape,Dimensions,Block Color,Available Quantity,Sold Out\n";

/// A dataset file in a fresh temp directory
pub fn dataset(rows: &[InventoryRecord]) -> (tempfile::TempDir, DatasetStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = DatasetStore::new(dir.path().join("lego.csv"));
    store.flush(rows).unwrap();
    (dir, store)
}

pub fn remote_in(dir: &Path) -> RemoteConfig {
    RemoteConfig::new("https://example.com/org/lego.git").with_workdir(dir.join("mirror"))
}

/// The two-row dataset used by most scenarios
pub fn sample_records() -> Vec<InventoryRecord> {
    vec![
        InventoryRecord::new("Brick", "Rectangular", "2x4", "Red", 10, 2),
        InventoryRecord::new("Brick", "Rectangular", "2x4", "Blue", 5, 1),
    ]
}

/// One call made to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Clone { url: String, branch: String, destination: PathBuf, existed: bool },
    ReplaceFile { path: PathBuf, content: Vec<u8> },
    Stage { path: PathBuf },
    Commit { message: String },
    Push { branch: String },
}

impl Call {
    pub fn step(&self) -> RemoteStep {
        match self {
            Call::Clone { .. } => RemoteStep::Clone,
            Call::ReplaceFile { .. } => RemoteStep::ReplaceFile,
            Call::Stage { .. } => RemoteStep::Stage,
            Call::Commit { .. } => RemoteStep::Commit,
            Call::Push { .. } => RemoteStep::Push,
        }
    }
}

/// Transport that records calls and can fail a chosen step
///
/// Cloning creates the destination with an empty `.git` directory so cleanup
/// treats it as a working copy.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<Call>>>,
    failure: Arc<Mutex<Option<(RemoteStep, RemoteFailureKind)>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(step: RemoteStep, kind: RemoteFailureKind) -> Self {
        let transport = Self::new();
        transport.fail_at(Some((step, kind)));
        transport
    }

    pub fn fail_at(&self, failure: Option<(RemoteStep, RemoteFailureKind)>) {
        *self.failure.lock() = failure;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn steps(&self) -> Vec<RemoteStep> {
        self.calls.lock().iter().map(Call::step).collect()
    }

    fn check(&self, step: RemoteStep) -> Result<(), RemoteError> {
        match *self.failure.lock() {
            Some((failing, kind)) if failing == step => {
                Err(RemoteError::new(step, kind, format!("simulated {} failure", kind)))
            }
            _ => Ok(()),
        }
    }
}

impl RemoteTransport for RecordingTransport {
    fn clone_repo(&mut self, url: &str, branch: &str, destination: &Path) -> Result<(), RemoteError> {
        self.calls.lock().push(Call::Clone {
            url: url.to_string(),
            branch: branch.to_string(),
            destination: destination.to_path_buf(),
            existed: destination.exists(),
        });
        self.check(RemoteStep::Clone)?;
        std::fs::create_dir_all(destination.join(".git"))
            .map_err(|e| RemoteError::io(RemoteStep::Clone, e))
    }

    fn replace_file(&mut self, path: &Path, content: &[u8]) -> Result<(), RemoteError> {
        self.calls.lock().push(Call::ReplaceFile {
            path: path.to_path_buf(),
            content: content.to_vec(),
        });
        self.check(RemoteStep::ReplaceFile)?;
        std::fs::write(path, content).map_err(|e| RemoteError::io(RemoteStep::ReplaceFile, e))
    }

    fn stage(&mut self, _workdir: &Path, path: &Path) -> Result<(), RemoteError> {
        self.calls.lock().push(Call::Stage {
            path: path.to_path_buf(),
        });
        self.check(RemoteStep::Stage)
    }

    fn commit(&mut self, _workdir: &Path, message: &str) -> Result<(), RemoteError> {
        self.calls.lock().push(Call::Commit {
            message: message.to_string(),
        });
        self.check(RemoteStep::Commit)
    }

    fn push(&mut self, _workdir: &Path, branch: &str) -> Result<(), RemoteError> {
        self.calls.lock().push(Call::Push {
            branch: branch.to_string(),
        });
        self.check(RemoteStep::Push)
    }
}
