//! Filesystem probing behind a narrow trait.
//!
//! The validator and the certificate provisioner only ever ask two
//! questions of the filesystem: does this path exist, and where does this
//! program live. Tests answer them from a fixed set instead of touching the
//! real disk.

use std::path::{Path, PathBuf};

/// Existence checks used by validation and provisioning.
pub trait FsProbe {
    /// Whether `path` names an existing filesystem entry.
    fn exists(&self, path: &Path) -> bool;

    /// Resolve a program to an existing file.
    ///
    /// Paths with more than one component are checked as-is; bare names are
    /// looked up on `PATH`.
    fn resolve_binary(&self, program: &Path) -> Option<PathBuf>;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl FsProbe for SystemProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn resolve_binary(&self, program: &Path) -> Option<PathBuf> {
        if is_bare_name(program) {
            return which::which(program).ok();
        }
        program.exists().then(|| program.to_path_buf())
    }
}

/// A program given without any directory component (`mkcert`, `openssl`).
pub fn is_bare_name(program: &Path) -> bool {
    program.components().count() == 1 && !program.is_absolute()
}
