//! php-fpm pool configuration rendering.

use super::RenderContext;
use crate::config::{RuntimeVersionSpec, ServerSpec};
use std::path::{Path, PathBuf};

/// Fixed process-management policy of every pool.
pub const POOL_DEFAULTS: &[(&str, &str)] = &[
    ("pm", "dynamic"),
    ("pm.max_children", "5"),
    ("pm.start_servers", "2"),
    ("pm.min_spare_servers", "1"),
    ("pm.max_spare_servers", "3"),
    ("clear_env", "no"),
];

/// Files belonging to one runtime's worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPaths {
    /// Generated pool configuration (`tmp/phpfpm/php-fpm-<id>.conf`).
    pub config: PathBuf,
    /// Pid file written by the pool master; doubles as the liveness token.
    pub pid_file: PathBuf,
    /// Pool error log.
    pub error_log: PathBuf,
}

impl PoolPaths {
    pub fn new(root: &Path, server: &ServerSpec, id: &str) -> Self {
        let tmp = root.join("tmp");
        Self {
            config: tmp.join("phpfpm").join(format!("php-fpm-{}.conf", id)),
            pid_file: tmp.join(format!("php-fpm-{}.pid", id)),
            error_log: server.log_dir(root).join(format!("php-fpm-{}.log", id)),
        }
    }
}

/// Render the pool configuration for one runtime version.
///
/// `user`/`group` are only emitted when devhost runs privileged; php-fpm
/// refuses them otherwise.
pub fn render_pool(
    server: &ServerSpec,
    runtime: &RuntimeVersionSpec,
    ctx: &RenderContext,
) -> String {
    let paths = PoolPaths::new(&ctx.root, server, &runtime.id);
    let identity = &ctx.identity;

    let mut lines = vec![
        "[global]".to_string(),
        format!("pid = {}", paths.pid_file.display()),
        format!("error_log = {}", paths.error_log.display()),
        String::new(),
        "[php-fpm]".to_string(),
        format!("listen = {}", runtime.effective_listen()),
        format!("listen.owner = {}", identity.user),
        format!("listen.group = {}", identity.group),
        "listen.mode = 0600".to_string(),
    ];
    if identity.privileged {
        lines.push(format!("user = {}", identity.user));
        lines.push(format!("group = {}", identity.group));
    }
    lines.extend(
        POOL_DEFAULTS
            .iter()
            .map(|(key, value)| format!("{} = {}", key, value)),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
