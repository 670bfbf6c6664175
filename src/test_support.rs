use crate::error::{DevhostError, Result};
use crate::identity::Identity;
use crate::lifecycle::ProcessLauncher;
use crate::probe::FsProbe;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// One runtime, one host relying on the default runtime.
pub(crate) const SHOP_CONFIG: &str = "\
server:
  bind_ip: 127.0.0.1
  http_port: 8080
  https_port: 8443
  domain_suffix: test
  server_name: localdev
php:
  default: 8.2
  versions:
    8.2:
      fpm_bin: /opt/local/sbin/php-fpm82
      fpm_listen: 127.0.0.1:9082
hosts:
  shop:
    folder: sites/shop
";

/// Two runtimes and two hosts, one pinned to an explicit runtime.
pub(crate) const MULTI_CONFIG: &str = "\
# local stack
server:
  apache_prefix: /usr/local/apache2
  domain_suffix: local
  server_name: dev
  mpm: event
php:
  default: 8.3
  versions:
    8.3:
      fpm_listen: 127.0.0.1:9083
    7.4:
      fpm_bin: /usr/sbin/php-fpm7.4
      fpm_listen: 127.0.0.1:9074
hosts:
  blog:
    folder: /var/www/blog
    php: 7.4
  api:
    folder: api/public
";

/// Probe that answers from a fixed set of existing paths.
#[derive(Debug, Default)]
pub(crate) struct FakeProbe {
    existing: HashSet<PathBuf>,
}

impl FakeProbe {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.existing.insert(path.into());
        self
    }
}

impl FsProbe for FakeProbe {
    fn exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
    }

    fn resolve_binary(&self, program: &Path) -> Option<PathBuf> {
        self.existing
            .contains(program)
            .then(|| program.to_path_buf())
    }
}

pub(crate) fn test_identity() -> Identity {
    Identity {
        user: "dev".to_string(),
        group: "staff".to_string(),
        privileged: false,
    }
}

/// Launcher that hands out fake pids and remembers which are alive.
#[derive(Default)]
pub(crate) struct FakeLauncher {
    pub(crate) alive: RefCell<HashSet<u32>>,
    pub(crate) launches: RefCell<Vec<(PathBuf, Vec<String>)>>,
    pub(crate) terminated: RefCell<Vec<u32>>,
    pub(crate) next_pid: Cell<u32>,
    pub(crate) fail_launch: bool,
}

impl FakeLauncher {
    pub(crate) fn new() -> Self {
        let launcher = Self::default();
        launcher.next_pid.set(4000);
        launcher
    }

    pub(crate) fn with_alive(self, pid: u32) -> Self {
        self.alive.borrow_mut().insert(pid);
        self
    }

    pub(crate) fn launch_count(&self) -> usize {
        self.launches.borrow().len()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch_detached(&self, program: &Path, args: &[String]) -> Result<u32> {
        if self.fail_launch {
            return Err(DevhostError::CommandFailed {
                command: program.display().to_string(),
                path: program.to_path_buf(),
                detail: "exec format error".to_string(),
            });
        }
        let pid = self.next_pid.get() + 1;
        self.next_pid.set(pid);
        self.alive.borrow_mut().insert(pid);
        self.launches
            .borrow_mut()
            .push((program.to_path_buf(), args.to_vec()));
        Ok(pid)
    }

    fn probe_alive(&self, pid: u32) -> bool {
        self.alive.borrow().contains(&pid)
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        self.alive.borrow_mut().remove(&pid);
        self.terminated.borrow_mut().push(pid);
        Ok(())
    }
}
