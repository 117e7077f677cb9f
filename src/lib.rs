//! kube-spawn smoke test harness
//!
//! This library runs the kube-spawn provisioning workflow against the real
//! tools and verifies the resulting machines and cluster nodes.

pub mod cli;
pub mod commands;
pub mod common;
pub mod exec;
pub mod verify;
pub mod workflow;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use exec::{CommandLine, CommandResult, CommandRunner, SystemRunner};
pub use workflow::{Phase, PhaseRunner, PhaseState, RunConfig, RunReport};
