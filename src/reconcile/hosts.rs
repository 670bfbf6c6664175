//! The `/etc/hosts` block.

use super::ManagedBlock;
use crate::config::StackSpec;
use crate::error::Result;
use crate::fs::atomic::io_error;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

pub const HOSTS_START_MARKER: &str = "# devhost managed hosts start";
pub const HOSTS_END_MARKER: &str = "# devhost managed hosts end";

/// Every domain the stack answers for, sorted and de-duplicated.
///
/// The server name when the config sets one, each configured host, and each
/// visible subdirectory of `html_dir` (a missing directory contributes
/// nothing).
pub fn gather_domains(stack: &StackSpec, html_dir: &Path) -> Result<Vec<String>> {
    let server = &stack.server;
    let mut domains = BTreeSet::new();

    if server.server_name_configured {
        domains.insert(server.fqdn(&server.server_name));
    }
    for host in &stack.hosts {
        domains.insert(server.fqdn(&host.name));
    }
    for dir in visible_subdirs(html_dir)? {
        domains.insert(server.fqdn(&dir));
    }

    Ok(domains.into_iter().collect())
}

/// IPv4 and IPv6 loopback entries for each domain.
pub fn hosts_block(domains: &[String]) -> ManagedBlock {
    let lines = domains
        .iter()
        .flat_map(|domain| [format!("127.0.0.1 {}", domain), format!("::1 {}", domain)])
        .collect();
    ManagedBlock::new(HOSTS_START_MARKER, HOSTS_END_MARKER, lines)
}

fn visible_subdirs(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(dir, "failed to read", e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error(dir, "failed to read", e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if entry.path().is_dir() {
            names.push(name);
        }
    }
    Ok(names)
}
