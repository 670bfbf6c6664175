//! Atomic file writes.
//!
//! Content goes to `.{filename}.tmp` next to the target, is synced, then
//! renamed over the target. Source and destination share a directory, so the
//! rename never crosses filesystems. A crash can leave the temp file behind
//! but never a truncated target.

use crate::error::{DevhostError, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories.
///
/// # Returns
///
/// * `Ok(())` - On successful atomic write
/// * `Err(DevhostError::PermissionDenied)` - The directory is not writable
/// * `Err(DevhostError::UserError)` - Any other write or rename failure
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .map_err(|e| io_error(parent, "failed to create directory", e))?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        io_error(path, "failed to replace", e)
    })?;

    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Write `content` only if the file is missing or differs.
///
/// Returns `true` when the file was written.
pub fn write_if_changed<P: AsRef<Path>>(path: P, content: &str) -> Result<bool> {
    let path = path.as_ref();
    match fs::read(path) {
        Ok(existing) if existing == content.as_bytes() => {
            tracing::debug!(path = %path.display(), "unchanged, skipping write");
            return Ok(false);
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_error(path, "failed to read", e)),
    }

    atomic_write_file(path, content)?;
    tracing::info!(path = %path.display(), "wrote");
    Ok(true)
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            DevhostError::UserError(format!("invalid file path '{}'", target.display()))
        })?;
    let parent = target.parent().unwrap_or(Path::new("."));
    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| io_error(path, "failed to create", e))?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    written.map_err(|e| {
        let _ = fs::remove_file(path);
        io_error(path, "failed to write", e)
    })
}

/// Map an I/O failure on `path` to a devhost error.
pub(crate) fn io_error(path: &Path, action: &str, err: io::Error) -> DevhostError {
    if err.kind() == io::ErrorKind::PermissionDenied {
        let dir = path.parent().unwrap_or(path);
        DevhostError::PermissionDenied {
            path: path.to_path_buf(),
            fix: format!(
                "make {} writable by the current user or rerun with sudo",
                dir.display()
            ),
        }
    } else {
        DevhostError::UserError(format!("{} '{}': {}", action, path.display(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("httpd.conf");
        fs::write(&file_path, "Listen 80\n").unwrap();

        atomic_write_file(&file_path, "Listen 8080\n").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "Listen 8080\n");
        assert!(!temp_dir.path().join(".httpd.conf.tmp").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("tmp").join("phpfpm").join("php-fpm-8.2.conf");

        atomic_write(&file_path, b"[global]\n").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "[global]\n");
    }

    #[test]
    fn test_write_if_changed_skips_identical_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("httpd.conf");

        assert!(write_if_changed(&file_path, "ServerRoot /opt\n").unwrap());
        assert!(!write_if_changed(&file_path, "ServerRoot /opt\n").unwrap());
        assert!(write_if_changed(&file_path, "ServerRoot /usr\n").unwrap());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "ServerRoot /usr\n");
    }

    #[test]
    fn test_unchanged_write_keeps_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("pool.conf");
        write_if_changed(&file_path, "listen = 127.0.0.1:9082\n").unwrap();
        let before = fs::metadata(&file_path).unwrap().modified().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        write_if_changed(&file_path, "listen = 127.0.0.1:9082\n").unwrap();

        let after = fs::metadata(&file_path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/srv/stack/tmp/httpd.conf")).unwrap();
        assert_eq!(temp, PathBuf::from("/srv/stack/tmp/.httpd.conf.tmp"));
    }

    #[test]
    fn test_permission_error_maps_to_permission_denied() {
        let err = io_error(
            Path::new("/etc/hosts"),
            "failed to write",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        match err {
            DevhostError::PermissionDenied { path, fix } => {
                assert_eq!(path, PathBuf::from("/etc/hosts"));
                assert!(fix.contains("/etc"));
            }
            other => panic!("expected PermissionDenied, got {:?}", other),
        }
    }
}
