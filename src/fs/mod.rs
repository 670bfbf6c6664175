//! Filesystem helpers for generated artifacts.
//!
//! Every file devhost generates is written atomically and only when its
//! content actually changes, so repeated runs leave mtimes alone.

pub mod atomic;

pub use atomic::{atomic_write, atomic_write_file, write_if_changed};
