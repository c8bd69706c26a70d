//! Error types for the store, the remote transport and configuration

use std::fmt;
use std::path::{Path, PathBuf};

/// Rejected record input
///
/// Carries every problem found, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid record: {}", .problems.join("; "))]
pub struct ValidationError {
    problems: Vec<String>,
}

impl ValidationError {
    pub fn new(problems: Vec<String>) -> Self {
        Self { problems }
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }
}

/// Dataset store errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Input record failed validation; nothing was read or written
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backing file missing, unreadable or not in the fixed schema
    #[error("failed to read dataset {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    /// Backing file could not be replaced; previous contents are intact
    #[error("failed to write dataset {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },
}

impl StoreError {
    pub(crate) fn read(path: &Path, reason: impl fmt::Display) -> Self {
        StoreError::Read {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, reason: impl fmt::Display) -> Self {
        StoreError::Write {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Step of the remote propagation sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RemoteStep {
    /// Removing a stale working copy before cloning
    Prepare,
    Clone,
    ReplaceFile,
    Stage,
    Commit,
    Push,
}

impl fmt::Display for RemoteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteStep::Prepare => "prepare",
            RemoteStep::Clone => "clone",
            RemoteStep::ReplaceFile => "replace file",
            RemoteStep::Stage => "stage",
            RemoteStep::Commit => "commit",
            RemoteStep::Push => "push",
        };
        f.write_str(name)
    }
}

/// Why a remote step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RemoteFailureKind {
    Authentication,
    Network,
    /// Push rejected or merge conflict against the mirror
    Conflict,
    /// The mirror already holds identical content
    NothingToCommit,
    /// Local filesystem problem inside the working copy
    Io,
    /// Transport tool missing or failed for another reason
    Command,
}

impl fmt::Display for RemoteFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteFailureKind::Authentication => "authentication failure",
            RemoteFailureKind::Network => "network failure",
            RemoteFailureKind::Conflict => "conflict",
            RemoteFailureKind::NothingToCommit => "nothing to commit",
            RemoteFailureKind::Io => "I/O failure",
            RemoteFailureKind::Command => "command failure",
        };
        f.write_str(name)
    }
}

/// Failure of one remote transport step
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("remote {step} failed ({kind}): {message}")]
pub struct RemoteError {
    pub step: RemoteStep,
    pub kind: RemoteFailureKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(step: RemoteStep, kind: RemoteFailureKind, message: impl Into<String>) -> Self {
        Self {
            step,
            kind,
            message: message.into(),
        }
    }

    pub fn io(step: RemoteStep, error: std::io::Error) -> Self {
        Self::new(step, RemoteFailureKind::Io, error.to_string())
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
