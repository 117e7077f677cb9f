//! Common utilities shared by the CLI and the workflow

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Whether the process runs with an effective uid of root
#[cfg(unix)]
pub fn is_privileged() -> bool {
    effective_uid() == 0
}

#[cfg(not(unix))]
pub fn is_privileged() -> bool {
    false
}

/// Effective uid of the current process
#[cfg(unix)]
pub fn effective_uid() -> u32 {
    unsafe { libc::geteuid() }
}

#[cfg(not(unix))]
pub fn effective_uid() -> u32 {
    u32::MAX
}
