//! Project context resolution for devhost.
//!
//! Finds the project root (the directory holding `config.yml`) from any
//! working directory and derives every path devhost reads or writes from it.
//! All commands go through this module so generated files always land in the
//! same place regardless of where devhost is invoked from.

use crate::error::{DevhostError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Config file name looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Resolved project paths. All paths are absolute.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Project root; relative config paths resolve against it.
    pub root: PathBuf,

    /// The config source (default: `{root}/config.yml`).
    pub config_path: PathBuf,

    /// Generated files (`{root}/tmp/`).
    pub tmp_dir: PathBuf,

    /// Worker advisory locks (`{root}/tmp/locks/`).
    pub locks_dir: PathBuf,

    /// Default document root; its subdirectories become hostnames (`{root}/html/`).
    pub html_dir: PathBuf,
}

impl ProjectContext {
    /// Resolve the context from CLI overrides, falling back to the current
    /// working directory.
    ///
    /// # Arguments
    ///
    /// * `root` - Explicit project root (`--root`)
    /// * `config` - Explicit config file (`--config`), relative to the cwd
    pub fn resolve(root: Option<&Path>, config: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            DevhostError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        let mut ctx = match root {
            Some(root) => Self::at_root(absolute(&cwd, root)),
            None => Self::resolve_from(&cwd),
        };
        if let Some(config) = config {
            ctx.config_path = absolute(&cwd, config);
        }
        Ok(ctx)
    }

    /// Resolve the context from a directory inside the project.
    ///
    /// Walks upward to the nearest directory containing `config.yml`. When
    /// none is found, `cwd` itself is the root.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Self {
        let cwd = cwd.as_ref();
        let root = cwd
            .ancestors()
            .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
            .unwrap_or(cwd);
        Self::at_root(root.to_path_buf())
    }

    fn at_root(root: PathBuf) -> Self {
        let tmp_dir = root.join("tmp");
        Self {
            config_path: root.join(CONFIG_FILE_NAME),
            locks_dir: tmp_dir.join("locks"),
            html_dir: root.join("html"),
            tmp_dir,
            root,
        }
    }

    /// Default location of the generated httpd.conf.
    pub fn httpd_conf_path(&self) -> PathBuf {
        self.tmp_dir.join("httpd.conf")
    }

    /// Create the directories generated files go into.
    pub fn ensure_layout(&self, extra: &[PathBuf]) -> Result<()> {
        for dir in [&self.tmp_dir, &self.locks_dir, &self.html_dir]
            .into_iter()
            .chain(extra)
        {
            std::fs::create_dir_all(dir).map_err(|e| {
                crate::fs::atomic::io_error(dir, "failed to create directory", e)
            })?;
        }
        Ok(())
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
