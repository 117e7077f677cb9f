//! Error types for the smoke harness
//!
//! Every fatal condition carries enough context (the failing command and its
//! captured output) for a human to diagnose the underlying tool's failure.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the smoke harness
#[derive(Error, Debug)]
pub enum Error {
    // === Precondition Errors ===
    #[error("Smoke test requires root privileges (effective uid is {0})")]
    NotPrivileged(u32),

    // === External Command Errors ===
    #[error("Error running {command}: {reason}\nstdout: {stdout}\nstderr: {stderr}")]
    CommandFailed {
        command: String,
        reason: String,
        stdout: String,
        stderr: String,
    },

    // === Verification Errors ===
    #[error("{what}: got {got} nodes, expected {expected} nodes.")]
    CountMismatch {
        what: String,
        got: usize,
        expected: usize,
    },

    #[error("Smoke test failed at phase '{0}'")]
    RunFailed(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a command failed error from the captured output of a command
    pub fn command_failed(command: &str, reason: &str, stdout: &str, stderr: &str) -> Self {
        Self::CommandFailed {
            command: command.to_string(),
            reason: reason.to_string(),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    /// Create a count mismatch error
    pub fn count_mismatch(what: &str, got: usize, expected: usize) -> Self {
        Self::CountMismatch {
            what: what.to_string(),
            got,
            expected,
        }
    }
}
