//! Remote transport capability
//!
//! The publisher drives a remote mirror through this trait one step at a
//! time. Each step either succeeds or fails with a [`RemoteError`] that names
//! the step and the kind of failure, which lets the publisher order the calls,
//! clean up, and map failures without knowing what tool sits underneath.

use std::fmt;
use std::path::Path;

use crate::core::error::{RemoteError, RemoteStep};

/// Operations needed to push one file to a remote mirror
pub trait RemoteTransport: Send {
    /// Clone `branch` of the mirror at `url` into `destination`, which does
    /// not exist yet. The working copy's `HEAD` must be the tip of `branch`
    /// so a later push to it fast-forwards.
    fn clone_repo(&mut self, url: &str, branch: &str, destination: &Path) -> Result<(), RemoteError>;

    /// Overwrite `path` inside the working copy with `content`
    fn replace_file(&mut self, path: &Path, content: &[u8]) -> Result<(), RemoteError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RemoteError::io(RemoteStep::ReplaceFile, e))?;
        }
        std::fs::write(path, content).map_err(|e| RemoteError::io(RemoteStep::ReplaceFile, e))
    }

    /// Stage `path`, relative to `workdir`, for the next commit
    fn stage(&mut self, workdir: &Path, path: &Path) -> Result<(), RemoteError>;

    fn commit(&mut self, workdir: &Path, message: &str) -> Result<(), RemoteError>;

    /// Push the working copy's current commit to `branch` on the mirror
    fn push(&mut self, workdir: &Path, branch: &str) -> Result<(), RemoteError>;
}

/// Opaque secret used to authenticate against the mirror
///
/// Never printed: `Debug` and `Display` show a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Read the secret from an environment variable; empty values count as unset
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Replace every occurrence of the secret in `text`
    pub fn redact(&self, text: &str) -> String {
        if self.0.is_empty() {
            return text.to_string();
        }
        text.replace(&self.0, "***")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}
