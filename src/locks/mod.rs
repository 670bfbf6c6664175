//! Advisory locks for worker lifecycle operations.
//!
//! One lock file per worker identity lives in `<root>/tmp/locks/`, e.g.
//! `php-fpm-8.2.lock`. Files are created with **create_new** semantics so
//! only one invocation can hold a given lock. The file body is a JSON
//! [`LockRecord`] naming the holder pid and when it took the lock.
//!
//! A lock whose holder pid is gone, or that is older than the stale
//! threshold, is reclaimed on the next acquisition attempt. Reclaiming
//! renames the file to a per-process tombstone first, so two invocations
//! racing for the same abandoned lock cannot both win.
//!
//! [`LockGuard`] deletes the lock file when dropped. A failed delete is
//! logged, never a panic.

mod guard;
mod operations;


pub use guard::LockGuard;
pub use operations::{DEFAULT_STALE_MINUTES, LockRecord, acquire_lock, lock_path};
