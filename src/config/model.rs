//! Typed views over a parsed [`ConfigModel`].
//!
//! Views are lenient: a missing or mistyped value falls back to its default.
//! Reporting mistyped values is the validator's job; by the time a view is
//! rendered the model has already been validated.

use super::node::{ConfigMap, ConfigModel, ConfigNode};
use super::types::*;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Global `server:` settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSpec {
    pub apache_prefix: PathBuf,
    pub server_root: PathBuf,
    pub modules_dir: PathBuf,
    pub conf_dir: PathBuf,
    pub types_config: PathBuf,
    /// Explicit httpd binary, if configured.
    pub httpd_bin: Option<PathBuf>,
    /// Directory holding httpd, if configured.
    pub sbin_dir: Option<PathBuf>,
    pub bind_ip: String,
    pub http_port: u16,
    pub https_port: u16,
    pub domain_suffix: String,
    pub server_name: String,
    /// Whether `server_name` was set in the config rather than defaulted.
    pub server_name_configured: bool,
    pub server_admin: String,
    /// Log directory, relative to the project root unless absolute.
    pub log_dir: PathBuf,
    /// Certificate directory, relative to the project root unless absolute.
    pub ssl_dir: PathBuf,
    /// httpd pid file, relative to the project root unless absolute.
    pub pid_file: PathBuf,
    pub log_level: String,
    pub mpm: ConcurrencyModel,
    pub run_user: Option<String>,
    pub run_group: Option<String>,
    pub use_mkcert: bool,
    pub mkcert_bin: PathBuf,
}

impl ServerSpec {
    pub fn from_model(model: &ConfigModel) -> Self {
        let empty = ConfigMap::new();
        let server = model.map(&["server"]).unwrap_or(&empty);
        let text = |key: &str| non_empty_text(server, key);

        let apache_prefix =
            PathBuf::from(text("apache_prefix").unwrap_or(DEFAULT_APACHE_PREFIX.into()));
        let server_root = text("server_root")
            .map(PathBuf::from)
            .unwrap_or_else(|| apache_prefix.clone());
        let modules_dir = text("modules_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| apache_prefix.join("lib/apache2/modules"));
        let conf_dir = text("conf_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| apache_prefix.join("etc/apache2"));
        let types_config = text("types_config")
            .map(PathBuf::from)
            .unwrap_or_else(|| conf_dir.join("mime.types"));

        let domain_suffix = text("domain_suffix").unwrap_or(DEFAULT_DOMAIN_SUFFIX.into());
        let configured_name = text("server_name");
        let server_name_configured = configured_name.is_some();
        let server_name = configured_name.unwrap_or(DEFAULT_SERVER_NAME.into());
        let server_admin = text("server_admin")
            .unwrap_or_else(|| format!("webmaster@{}.{}", server_name, domain_suffix));

        Self {
            server_root,
            modules_dir,
            conf_dir,
            types_config,
            httpd_bin: text("httpd_bin").map(PathBuf::from),
            sbin_dir: text("sbin_dir").map(PathBuf::from),
            bind_ip: text("bind_ip").unwrap_or(DEFAULT_BIND_IP.into()),
            http_port: port(server, "http_port").unwrap_or(DEFAULT_HTTP_PORT),
            https_port: port(server, "https_port").unwrap_or(DEFAULT_HTTPS_PORT),
            log_dir: PathBuf::from(text("log_dir").unwrap_or(DEFAULT_LOG_DIR.into())),
            ssl_dir: PathBuf::from(text("ssl_dir").unwrap_or(DEFAULT_SSL_DIR.into())),
            pid_file: PathBuf::from(text("pid_file").unwrap_or(DEFAULT_PID_FILE.into())),
            log_level: text("log_level").unwrap_or(DEFAULT_LOG_LEVEL.into()),
            mpm: text("mpm")
                .and_then(|s| ConcurrencyModel::from_str(&s))
                .unwrap_or_default(),
            run_user: text("run_user"),
            run_group: text("run_group"),
            use_mkcert: server
                .get("use_mkcert")
                .and_then(ConfigNode::as_scalar)
                .and_then(|s| s.as_bool())
                .unwrap_or(false),
            mkcert_bin: PathBuf::from(text("mkcert_bin").unwrap_or(DEFAULT_MKCERT_BIN.into())),
            apache_prefix,
            domain_suffix,
            server_name,
            server_name_configured,
            server_admin,
        }
    }

    /// Fully qualified domain for a host or server name.
    pub fn fqdn(&self, name: &str) -> String {
        format!("{}.{}", name, self.domain_suffix)
    }

    pub fn log_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.log_dir)
    }

    pub fn ssl_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.ssl_dir)
    }

    pub fn pid_file(&self, root: &Path) -> PathBuf {
        root.join(&self.pid_file)
    }

    /// The httpd binary to launch: `httpd_bin`, else `<sbin_dir>/httpd`,
    /// else `<apache_prefix>/sbin/httpd`.
    pub fn httpd_binary(&self) -> PathBuf {
        if let Some(bin) = &self.httpd_bin {
            return bin.clone();
        }
        if let Some(sbin) = &self.sbin_dir {
            return sbin.join("httpd");
        }
        self.apache_prefix.join("sbin").join("httpd")
    }
}

/// One entry of `php.versions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeVersionSpec {
    pub id: String,
    pub fpm_bin: Option<PathBuf>,
    pub fpm_listen: Option<String>,
}

impl RuntimeVersionSpec {
    fn from_node(id: &str, node: &ConfigNode) -> Self {
        let entry = node.as_map();
        let text = |key: &str| entry.and_then(|m| non_empty_text(m, key));
        Self {
            id: id.to_string(),
            fpm_bin: text("fpm_bin").map(PathBuf::from),
            fpm_listen: text("fpm_listen"),
        }
    }

    /// The explicitly configured listen address, if non-empty.
    pub fn listen_address(&self) -> Option<&str> {
        self.fpm_listen.as_deref().filter(|s| !s.is_empty())
    }

    /// Listen address used by the worker pool, derived from the id when unset.
    pub fn effective_listen(&self) -> String {
        self.listen_address()
            .map(str::to_string)
            .unwrap_or_else(|| default_fpm_listen(&self.id))
    }

    /// The php-fpm binary: `fpm_bin`, else `/opt/local/sbin/php-fpm<digits>`.
    pub fn fpm_binary(&self) -> PathBuf {
        self.fpm_bin.clone().unwrap_or_else(|| {
            Path::new(DEFAULT_FPM_SBIN).join(format!("php-fpm{}", version_digits(&self.id)))
        })
    }
}

/// One entry of `hosts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub name: String,
    /// Document root as written in the config.
    pub folder: Option<String>,
    /// Explicit runtime version id (`php:`), if any.
    pub runtime: Option<String>,
}

impl HostSpec {
    fn from_node(name: &str, node: &ConfigNode) -> Self {
        let entry = node.as_map();
        let text = |key: &str| entry.and_then(|m| non_empty_text(m, key));
        Self {
            name: name.to_string(),
            folder: text("folder"),
            runtime: text("php"),
        }
    }

    /// Runtime id used by this host: explicit, else the declared default.
    pub fn resolved_runtime<'a>(&'a self, default: Option<&'a str>) -> Option<&'a str> {
        self.runtime.as_deref().or(default)
    }

    /// Document root resolved against the project root.
    pub fn document_root(&self, root: &Path) -> PathBuf {
        root.join(self.folder.as_deref().unwrap_or_default())
    }
}

/// All typed views of one model.
#[derive(Debug, Clone)]
pub struct StackSpec {
    pub server: ServerSpec,
    pub default_runtime: Option<String>,
    pub runtimes: IndexMap<String, RuntimeVersionSpec>,
    pub hosts: Vec<HostSpec>,
}

impl StackSpec {
    pub fn from_model(model: &ConfigModel) -> Self {
        let runtimes = model
            .map(&["php", "versions"])
            .map(|versions| {
                versions
                    .iter()
                    .map(|(id, node)| (id.clone(), RuntimeVersionSpec::from_node(id, node)))
                    .collect()
            })
            .unwrap_or_default();

        let hosts = model
            .map(&["hosts"])
            .map(|hosts| {
                hosts
                    .iter()
                    .map(|(name, node)| HostSpec::from_node(name, node))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            server: ServerSpec::from_model(model),
            default_runtime: model.text(&["php", "default"]).filter(|s| !s.is_empty()),
            runtimes,
            hosts,
        }
    }

    /// The runtime version a host routes to, if it resolves.
    pub fn runtime_for(&self, host: &HostSpec) -> Option<&RuntimeVersionSpec> {
        host.resolved_runtime(self.default_runtime.as_deref())
            .and_then(|id| self.runtimes.get(id))
    }
}

fn non_empty_text(map: &ConfigMap, key: &str) -> Option<String> {
    map.get(key)
        .and_then(ConfigNode::as_text)
        .filter(|s| !s.is_empty())
}

fn port(map: &ConfigMap, key: &str) -> Option<u16> {
    map.get(key)
        .and_then(ConfigNode::as_scalar)
        .and_then(|s| s.as_int())
        .and_then(|n| u16::try_from(n).ok())
        .filter(|p| *p != 0)
}
