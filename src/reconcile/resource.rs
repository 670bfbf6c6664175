//! Shared resources a managed block lives in.

use crate::error::{DevhostError, Result};
use crate::fs::atomic::io_error;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A shared, possibly privileged, text resource.
pub trait ExternalResource {
    /// Human-readable name for messages.
    fn describe(&self) -> String;

    /// Current content, or `None` if the resource does not exist.
    fn read_current(&self) -> Result<Option<String>>;

    /// Replace the whole content.
    fn write(&self, content: &str) -> Result<()>;

    /// Delete the resource. Deleting a missing resource succeeds.
    fn remove(&self) -> Result<()>;
}

/// A plain file, written in place.
///
/// When a write is refused and stdin is a terminal the write is retried
/// through `sudo tee`, which may prompt for a password.
#[derive(Debug, Clone)]
pub struct FileResource {
    path: PathBuf,
    allow_sudo: bool,
}

impl FileResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            allow_sudo: io::stdin().is_terminal(),
        }
    }

    /// Never escalate; permission failures surface as errors.
    pub fn without_sudo(mut self) -> Self {
        self.allow_sudo = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn denied(&self) -> DevhostError {
        DevhostError::PermissionDenied {
            path: self.path.clone(),
            fix: "rerun with sudo, e.g. `sudo devhost hosts`".to_string(),
        }
    }

    fn write_with_sudo(&self, content: &str) -> Result<()> {
        tracing::warn!(
            path = %self.path.display(),
            "writing requires elevated privileges; you may be prompted for your password"
        );
        let command = format!("sudo tee {}", self.path.display());
        let failed = |detail: String| DevhostError::CommandFailed {
            command: command.clone(),
            path: self.path.clone(),
            detail,
        };

        let mut child = Command::new("sudo")
            .arg("tee")
            .arg(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(content.as_bytes())
                .map_err(|e| failed(e.to_string()))?;
        }

        let status = child.wait().map_err(|e| failed(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(failed(status.to_string()))
        }
    }
}

impl ExternalResource for FileResource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_current(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&self.path, "failed to read", e)),
        }
    }

    fn write(&self, content: &str) -> Result<()> {
        match fs::write(&self.path, content) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                if self.allow_sudo {
                    self.write_with_sudo(content)
                } else {
                    Err(self.denied())
                }
            }
            Err(e) => Err(io_error(&self.path, "failed to write", e)),
        }
    }

    fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(self.denied()),
            Err(e) => Err(io_error(&self.path, "failed to remove", e)),
        }
    }
}
