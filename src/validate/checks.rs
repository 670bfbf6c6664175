//! Individual validation checks.

use super::{ValidationError, ValidationErrorKind};
use crate::config::{ConcurrencyModel, ConfigModel, ConfigNode, StackSpec};
use crate::probe::FsProbe;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// A host name must be a single DNS label.
static HOST_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("Invalid host name regex")
});

/// Check 1: a declared default must name a declared version.
pub fn check_default_runtime(stack: &StackSpec, errors: &mut Vec<ValidationError>) {
    if let Some(default) = &stack.default_runtime
        && !stack.runtimes.contains_key(default)
    {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownDefaultRuntime,
            default.as_str(),
            format!("php.default '{}' is not declared under php.versions", default),
            format!("add php.versions.{} or point php.default at a declared version", default),
        ));
    }
}

/// Checks 2 and 3, host by host in declaration order.
pub fn check_hosts(
    model: &ConfigModel,
    stack: &StackSpec,
    root: &Path,
    errors: &mut Vec<ValidationError>,
) {
    let Some(hosts) = model.map(&["hosts"]) else {
        return;
    };
    let default_missing = stack
        .default_runtime
        .as_ref()
        .is_some_and(|d| !stack.runtimes.contains_key(d));

    for (host, (name, node)) in stack.hosts.iter().zip(hosts.iter()) {
        if !matches!(node, ConfigNode::Map(_)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidEntry,
                name.as_str(),
                format!("host '{}' must be a mapping with at least a folder", name),
                format!("write hosts.{}: on its own line and indent folder/php below it", name),
            ));
            continue;
        }

        if !HOST_NAME_REGEX.is_match(name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidHostName,
                name.as_str(),
                format!("host '{}' is not a valid DNS label", name),
                "use letters, digits, and inner hyphens only (max 63 characters)",
            ));
        }

        match (&host.runtime, &stack.default_runtime) {
            (Some(id), _) => check_host_runtime(stack, &host.name, id, errors),
            // Already reported by check 1.
            (None, Some(_)) if default_missing => {}
            (None, Some(id)) => check_host_runtime(stack, &host.name, id, errors),
            (None, None) => errors.push(ValidationError::new(
                ValidationErrorKind::NoRuntime,
                host.name.as_str(),
                format!("host '{}' has no php version and no php.default is declared", host.name),
                format!("set hosts.{}.php or declare php.default", host.name),
            )),
        }

        let document_root = host.document_root(root);
        if host.folder.is_none() || document_root.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingDocumentRoot,
                host.name.as_str(),
                format!("host '{}' needs a folder", host.name),
                format!("set hosts.{}.folder to the document root", host.name),
            ));
        }
    }
}

fn check_host_runtime(stack: &StackSpec, host: &str, id: &str, errors: &mut Vec<ValidationError>) {
    match stack.runtimes.get(id) {
        None => errors.push(ValidationError::new(
            ValidationErrorKind::UnknownRuntime,
            host,
            format!("host '{}' references php version '{}', which is not declared", host, id),
            format!("add php.versions.{} or change hosts.{}.php", id, host),
        )),
        Some(runtime) if runtime.listen_address().is_none() => {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingListenAddress,
                host,
                format!(
                    "host '{}' references php version '{}' with no fpm_listen address",
                    host, id
                ),
                format!("set php.versions.{}.fpm_listen (e.g. 127.0.0.1:9000)", id),
            ))
        }
        Some(_) => {}
    }
}

/// Check 4 and the remaining server-level checks.
pub fn check_server(
    model: &ConfigModel,
    stack: &StackSpec,
    probe: &dyn FsProbe,
    errors: &mut Vec<ValidationError>,
) {
    check_section_shapes(model, errors);
    check_ports(model, errors);
    check_concurrency_model(model, stack, probe, errors);
    check_listen_conflicts(stack, errors);
}

fn check_section_shapes(model: &ConfigModel, errors: &mut Vec<ValidationError>) {
    for section in ["server", "php", "hosts"] {
        if let Some(ConfigNode::Scalar(_)) = model.get(&[section]) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidEntry,
                section,
                format!("'{}' must be a section, not a single value", section),
                format!("write '{}:' alone and indent its settings below it", section),
            ));
        }
    }

    if let Some(ConfigNode::Scalar(_)) = model.get(&["php", "versions"]) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidEntry,
            "php.versions",
            "'php.versions' must be a section keyed by version id",
            "write 'versions:' alone and indent one entry per version below it",
        ));
    }

    if let Some(versions) = model.map(&["php", "versions"]) {
        for (id, node) in versions {
            if !matches!(node, ConfigNode::Map(_)) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidEntry,
                    id.as_str(),
                    format!("php version '{}' must be a mapping", id),
                    format!("indent fpm_bin/fpm_listen below php.versions.{}", id),
                ));
            }
        }
    }
}

fn check_ports(model: &ConfigModel, errors: &mut Vec<ValidationError>) {
    let mut seen: Vec<(i64, &str)> = Vec::new();

    for key in ["http_port", "https_port"] {
        let Some(node) = model.get(&["server", key]) else {
            continue;
        };
        let value = node.as_scalar().and_then(|s| s.as_int());
        match value {
            Some(port) if (1..=65535).contains(&port) => {
                if let Some((_, other)) = seen.iter().find(|(p, _)| *p == port) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidPort,
                        format!("server.{}", key),
                        format!("server.{} and server.{} both use port {}", other, key, port),
                        "give the plaintext and encrypted listeners different ports",
                    ));
                }
                seen.push((port, key));
            }
            _ => errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPort,
                format!("server.{}", key),
                format!(
                    "server.{} must be an integer between 1 and 65535, got '{}'",
                    key,
                    node.as_text().unwrap_or_else(|| "a section".to_string())
                ),
                format!("set server.{} to a port number", key),
            )),
        }
    }
}

fn check_concurrency_model(
    model: &ConfigModel,
    stack: &StackSpec,
    probe: &dyn FsProbe,
    errors: &mut Vec<ValidationError>,
) {
    let Some(selector) = model.text(&["server", "mpm"]) else {
        return;
    };
    let Some(mpm) = ConcurrencyModel::from_str(&selector) else {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownConcurrencyModel,
            selector.as_str(),
            format!("unsupported mpm '{}'", selector),
            format!("set server.mpm to one of: {}", ConcurrencyModel::valid_options()),
        ));
        return;
    };

    if let Some((_, file)) = mpm.module() {
        let module_path = stack.server.modules_dir.join(file);
        if !probe.exists(&module_path) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingModule,
                module_path.display().to_string(),
                format!(
                    "mpm module {} not found under {}",
                    file,
                    stack.server.modules_dir.display()
                ),
                format!(
                    "compile Apache with the {} MPM or set server.mpm to builtin",
                    mpm.as_str()
                ),
            ));
        }
    }
}

fn check_listen_conflicts(stack: &StackSpec, errors: &mut Vec<ValidationError>) {
    let mut owners: HashMap<&str, &str> = HashMap::new();

    for runtime in stack.runtimes.values() {
        let Some(address) = runtime.listen_address() else {
            continue;
        };
        match owners.get(address) {
            Some(owner) => errors.push(ValidationError::new(
                ValidationErrorKind::ListenConflict,
                runtime.id.as_str(),
                format!(
                    "php versions '{}' and '{}' both listen on {}",
                    owner, runtime.id, address
                ),
                format!("give php.versions.{}.fpm_listen its own port", runtime.id),
            )),
            None => {
                owners.insert(address, runtime.id.as_str());
            }
        }
    }
}
