//! The operating identity that generated files name.
//!
//! httpd's `User`/`Group` and the worker pool's socket owner default to the
//! person running devhost. When devhost runs under sudo, that is the invoking
//! user rather than root. The lookup sits behind [`IdentitySource`] so
//! rendering stays a pure function of its inputs.

use crate::config::ServerSpec;

/// User and group the generated stack runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub group: String,
    /// Whether devhost itself runs with root privileges.
    pub privileged: bool,
}

/// Supplies the identity of the current invocation.
pub trait IdentitySource {
    fn current(&self) -> Identity;
}

/// Identity derived from the environment and the user/group databases.
///
/// User: `SUDO_USER`, then `USER`, then the passwd entry of the effective uid.
/// Group: the group of `SUDO_GID`, then the group of the real gid.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentitySource for SystemIdentity {
    fn current(&self) -> Identity {
        let user = non_empty_env("SUDO_USER")
            .or_else(|| non_empty_env("USER"))
            .or_else(current_user_name)
            .unwrap_or_else(|| "nobody".to_string());

        let group = non_empty_env("SUDO_GID")
            .and_then(|gid| gid.parse::<u32>().ok())
            .and_then(group_name)
            .or_else(|| group_name(real_gid()))
            .unwrap_or_else(|| real_gid().to_string());

        Identity {
            user,
            group,
            privileged: effective_uid() == 0,
        }
    }
}

/// Apply `server.run_user` / `server.run_group` over the detected identity.
pub fn resolve_identity(server: &ServerSpec, source: &dyn IdentitySource) -> Identity {
    let detected = source.current();
    Identity {
        user: server.run_user.clone().unwrap_or(detected.user),
        group: server.run_group.clone().unwrap_or(detected.group),
        privileged: detected.privileged,
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(unix)]
fn effective_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() }
}

#[cfg(unix)]
fn real_gid() -> u32 {
    // SAFETY: getgid has no preconditions and cannot fail.
    unsafe { libc::getgid() }
}

#[cfg(unix)]
fn current_user_name() -> Option<String> {
    // SAFETY: getpwuid returns null or a pointer to a static passwd record
    // that stays valid until the next call; the name is copied out at once.
    unsafe {
        let entry = libc::getpwuid(libc::geteuid());
        if entry.is_null() || (*entry).pw_name.is_null() {
            return None;
        }
        Some(std::ffi::CStr::from_ptr((*entry).pw_name).to_string_lossy().into_owned())
    }
}

#[cfg(unix)]
fn group_name(gid: u32) -> Option<String> {
    // SAFETY: getgrgid returns null or a pointer to a static group record
    // that stays valid until the next call; the name is copied out at once.
    unsafe {
        let entry = libc::getgrgid(gid);
        if entry.is_null() || (*entry).gr_name.is_null() {
            return None;
        }
        Some(std::ffi::CStr::from_ptr((*entry).gr_name).to_string_lossy().into_owned())
    }
}

#[cfg(not(unix))]
fn effective_uid() -> u32 {
    u32::MAX
}

#[cfg(not(unix))]
fn real_gid() -> u32 {
    0
}

#[cfg(not(unix))]
fn current_user_name() -> Option<String> {
    None
}

#[cfg(not(unix))]
fn group_name(_gid: u32) -> Option<String> {
    None
}
