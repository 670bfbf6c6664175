//! Lock acquisition and reclamation.

use super::guard::LockGuard;
use crate::error::{DevhostError, Result};
use crate::lifecycle::pid_exists;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Locks older than this are reclaimed.
pub const DEFAULT_STALE_MINUTES: u32 = 10;

/// JSON body of a lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub pid: u32,
    pub created_at: DateTime<Utc>,
}

impl LockRecord {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            created_at: Utc::now(),
        }
    }

    /// Read a lock file. `None` when it is missing or not a record.
    pub fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Whether the holder is gone or the lock outlived `stale_minutes`.
    pub fn is_abandoned(&self, stale_minutes: u32) -> bool {
        let age = Utc::now().signed_duration_since(self.created_at);
        age.num_minutes() > i64::from(stale_minutes) || !pid_exists(self.pid)
    }
}

/// Path of the lock file for `name`.
pub fn lock_path(locks_dir: &Path, name: &str) -> PathBuf {
    locks_dir.join(format!("{}.lock", name))
}

/// Acquire the lock named `name` in `locks_dir`.
///
/// # Arguments
///
/// * `locks_dir` - Directory holding lock files (created if missing)
/// * `name` - Worker identity the lock serializes
/// * `action` - What the caller is about to do, for logs
/// * `stale_minutes` - Age after which an existing lock is reclaimed
///
/// # Returns
///
/// * `Ok(LockGuard)` - Lock held until the guard drops
/// * `Err(DevhostError::LockError)` - Another live invocation holds it (exit code 4)
pub fn acquire_lock(
    locks_dir: &Path,
    name: &str,
    action: &str,
    stale_minutes: u32,
) -> Result<LockGuard> {
    fs::create_dir_all(locks_dir).map_err(|e| {
        DevhostError::UserError(format!(
            "failed to create locks directory '{}': {}",
            locks_dir.display(),
            e
        ))
    })?;

    let path = lock_path(locks_dir, name);
    let record = LockRecord::current();

    let outcome = match try_create(&path, &record) {
        Err(CreateError::Held) => match LockRecord::read(&path) {
            Some(seen) if seen.is_abandoned(stale_minutes) && reclaim(&path, &seen) => {
                try_create(&path, &record)
            }
            _ => Err(CreateError::Held),
        },
        other => other,
    };

    let guard = outcome.map_err(|e| e.into_error(&path))?;
    tracing::debug!(lock = %path.display(), action, "acquired lock");
    Ok(guard)
}

enum CreateError {
    Held,
    Io(io::Error),
}

impl CreateError {
    fn into_error(self, path: &Path) -> DevhostError {
        match self {
            CreateError::Held => {
                let holder = LockRecord::read(path)
                    .map(|r| {
                        format!(
                            " (pid {} since {})",
                            r.pid,
                            r.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                        )
                    })
                    .unwrap_or_default();
                DevhostError::LockError(format!(
                    "lock '{}' is held by another process{}; retry once it finishes",
                    path.display(),
                    holder
                ))
            }
            CreateError::Io(e) => DevhostError::LockError(format!(
                "failed to acquire lock '{}': {}",
                path.display(),
                e
            )),
        }
    }
}

fn try_create(path: &Path, record: &LockRecord) -> std::result::Result<LockGuard, CreateError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                CreateError::Held
            } else {
                CreateError::Io(e)
            }
        })?;

    let written = serde_json::to_string(record)
        .map_err(io::Error::other)
        .and_then(|json| file.write_all(json.as_bytes()))
        .and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(CreateError::Io(e));
    }
    Ok(LockGuard::new(path.to_path_buf()))
}

/// Move the abandoned lock `seen` out of the way.
///
/// The lock is renamed to a tombstone owned by this process before it is
/// deleted. If the tombstone turns out to hold a different record, another
/// invocation reclaimed first and already holds a fresh lock, which is put
/// back. Returns `true` only when the lock path is free for this process.
pub(super) fn reclaim(path: &Path, seen: &LockRecord) -> bool {
    let tombstone = tombstone_path(path);
    if fs::rename(path, &tombstone).is_err() {
        return false;
    }

    if LockRecord::read(&tombstone).as_ref() != Some(seen) {
        // hard_link never replaces an existing lock.
        if let Err(e) = fs::hard_link(&tombstone, path) {
            tracing::warn!(lock = %path.display(), error = %e, "failed to restore lock");
        }
        let _ = fs::remove_file(&tombstone);
        return false;
    }

    let _ = fs::remove_file(&tombstone);
    tracing::warn!(lock = %path.display(), holder = seen.pid, "reclaimed abandoned lock");
    true
}

fn tombstone_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.stale", std::process::id()));
    path.with_file_name(name)
}
