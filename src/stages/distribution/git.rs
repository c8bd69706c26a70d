//! Git command-line transport
//!
//! Runs the `git` executable for every step. Credentials are injected into
//! HTTPS clone URLs and scrubbed from any output that ends up in an error or a
//! log line. Interactive prompts are disabled so a missing credential fails
//! the step instead of blocking on stdin.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::RemoteConfig;
use crate::core::error::{RemoteError, RemoteFailureKind, RemoteStep};

use super::transport::{Credential, RemoteTransport};

pub struct GitCommandTransport {
    program: PathBuf,
    credential: Option<Credential>,
    author: Option<(String, String)>,
}

impl GitCommandTransport {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
            credential: None,
            author: None,
        }
    }

    /// Transport configured from the remote section: credential from the
    /// configured environment variable and the optional commit author
    pub fn from_config(remote: &RemoteConfig) -> Self {
        let mut transport = Self::new().with_credential(remote.credential());
        if let (Some(name), Some(email)) = (&remote.author_name, &remote.author_email) {
            transport = transport.with_author(name.clone(), email.clone());
        }
        transport
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author = Some((name.into(), email.into()));
        self
    }

    /// `url` with the credential embedded, for HTTPS remotes only
    pub fn authenticated_url(&self, url: &str) -> String {
        match (&self.credential, url.strip_prefix("https://")) {
            (Some(credential), Some(rest)) => {
                format!("https://x-access-token:{}@{}", credential.expose(), rest)
            }
            _ => url.to_string(),
        }
    }

    fn redact(&self, text: &str) -> String {
        match &self.credential {
            Some(credential) => credential.redact(text),
            None => text.to_string(),
        }
    }

    fn run<I, S>(&self, step: RemoteStep, workdir: Option<&Path>, args: I) -> Result<(), RemoteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command.args(args).env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = workdir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|e| {
            let message = if e.kind() == std::io::ErrorKind::NotFound {
                format!("{} executable not found", self.program.display())
            } else {
                e.to_string()
            };
            RemoteError::new(step, RemoteFailureKind::Command, message)
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            debug!(step = %step, output = %self.redact(stderr.trim()), "git step finished");
            return Ok(());
        }

        let combined = self.redact(format!("{}\n{}", stderr.trim(), stdout.trim()).trim());
        Err(RemoteError::new(step, classify(&combined), combined))
    }
}

impl Default for GitCommandTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteTransport for GitCommandTransport {
    fn clone_repo(&mut self, url: &str, branch: &str, destination: &Path) -> Result<(), RemoteError> {
        let url = self.authenticated_url(url);
        let args: [&OsStr; 8] = [
            OsStr::new("clone"),
            OsStr::new("--depth"),
            OsStr::new("1"),
            OsStr::new("--branch"),
            OsStr::new(branch),
            OsStr::new("--"),
            OsStr::new(&url),
            destination.as_os_str(),
        ];
        self.run(RemoteStep::Clone, None, args)
    }

    fn stage(&mut self, workdir: &Path, path: &Path) -> Result<(), RemoteError> {
        self.run(
            RemoteStep::Stage,
            Some(workdir),
            [OsStr::new("add"), OsStr::new("--"), path.as_os_str()],
        )
    }

    fn commit(&mut self, workdir: &Path, message: &str) -> Result<(), RemoteError> {
        let mut args: Vec<OsString> = Vec::new();
        if let Some((name, email)) = &self.author {
            args.push("-c".into());
            args.push(format!("user.name={}", name).into());
            args.push("-c".into());
            args.push(format!("user.email={}", email).into());
        }
        args.push("commit".into());
        args.push("-m".into());
        args.push(message.into());
        self.run(RemoteStep::Commit, Some(workdir), args)
    }

    fn push(&mut self, workdir: &Path, branch: &str) -> Result<(), RemoteError> {
        let refspec = format!("HEAD:{}", branch);
        self.run(
            RemoteStep::Push,
            Some(workdir),
            ["push", "origin", refspec.as_str()],
        )
    }
}

/// Map git's output for a failed step to a failure kind
pub fn classify(output: &str) -> RemoteFailureKind {
    let text = output.to_lowercase();

    if contains_any(&text, &[
        "authentication failed",
        "could not read username",
        "could not read password",
        "invalid username or password",
        "permission denied",
        "error: 403",
        "returned error: 401",
    ]) {
        RemoteFailureKind::Authentication
    } else if contains_any(&text, &["nothing to commit", "nothing added to commit", "no changes added to commit"]) {
        RemoteFailureKind::NothingToCommit
    } else if contains_any(&text, &["rejected", "non-fast-forward", "fetch first", "conflict"]) {
        RemoteFailureKind::Conflict
    } else if contains_any(&text, &[
        "could not resolve host",
        "unable to access",
        "connection refused",
        "connection timed out",
        "network is unreachable",
        "could not read from remote repository",
    ]) {
        RemoteFailureKind::Network
    } else {
        RemoteFailureKind::Command
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}
