//! Configuration enums, constants, and defaults.

use serde::Serialize;

/// Apache multi-processing module selected by `server.mpm`.
///
/// `Builtin` uses whatever MPM is compiled into httpd and loads nothing
/// extra; every other variant maps to exactly one loadable module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyModel {
    #[default]
    Builtin,
    Prefork,
    Event,
    Worker,
}

impl ConcurrencyModel {
    /// Every accepted selector, in the order shown to users.
    pub const ALL: [ConcurrencyModel; 4] = [
        ConcurrencyModel::Builtin,
        ConcurrencyModel::Prefork,
        ConcurrencyModel::Event,
        ConcurrencyModel::Worker,
    ];

    /// Parse a selector from config text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "builtin" => Some(Self::Builtin),
            "prefork" => Some(Self::Prefork),
            "event" => Some(Self::Event),
            "worker" => Some(Self::Worker),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Prefork => "prefork",
            Self::Event => "event",
            Self::Worker => "worker",
        }
    }

    /// The `(module name, module file)` pair to load, if any.
    pub fn module(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Builtin => None,
            Self::Prefork => Some(("mpm_prefork_module", "mod_mpm_prefork.so")),
            Self::Event => Some(("mpm_event_module", "mod_mpm_event.so")),
            Self::Worker => Some(("mpm_worker_module", "mod_mpm_worker.so")),
        }
    }

    /// Comma-separated list of valid selectors for error messages.
    pub fn valid_options() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Modules every generated httpd.conf loads, in load order.
pub const BASE_MODULES: &[(&str, &str)] = &[
    ("unixd_module", "mod_unixd.so"),
    ("authz_core_module", "mod_authz_core.so"),
    ("authz_host_module", "mod_authz_host.so"),
    ("reqtimeout_module", "mod_reqtimeout.so"),
    ("log_config_module", "mod_log_config.so"),
    ("mime_module", "mod_mime.so"),
    ("dir_module", "mod_dir.so"),
    ("alias_module", "mod_alias.so"),
    ("setenvif_module", "mod_setenvif.so"),
    ("rewrite_module", "mod_rewrite.so"),
    ("access_compat_module", "mod_access_compat.so"),
    ("ssl_module", "mod_ssl.so"),
    ("socache_shmcb_module", "mod_socache_shmcb.so"),
    ("proxy_module", "mod_proxy.so"),
    ("proxy_fcgi_module", "mod_proxy_fcgi.so"),
];

pub const DEFAULT_APACHE_PREFIX: &str = "/opt/local";
pub const DEFAULT_BIND_IP: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_HTTPS_PORT: u16 = 8443;
pub const DEFAULT_DOMAIN_SUFFIX: &str = "test";
pub const DEFAULT_SERVER_NAME: &str = "localdev";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_SSL_DIR: &str = "ssl";
pub const DEFAULT_PID_FILE: &str = "tmp/httpd.pid";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_MKCERT_BIN: &str = "/opt/local/bin/mkcert";
pub const DEFAULT_FPM_SBIN: &str = "/opt/local/sbin";

/// First port of the derived php-fpm listen range.
pub const FPM_BASE_PORT: u32 = 9000;

/// Digits of a runtime version id (`"8.2"` → `"82"`).
pub fn version_digits(id: &str) -> String {
    id.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Listen address used for a runtime version that does not declare one.
pub fn default_fpm_listen(id: &str) -> String {
    let port = version_digits(id)
        .parse::<u32>()
        .ok()
        .and_then(|n| n.checked_add(FPM_BASE_PORT))
        .unwrap_or(FPM_BASE_PORT);
    format!("127.0.0.1:{}", port)
}
