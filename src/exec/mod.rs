//! External command execution
//!
//! Every interaction with kube-spawn, kubectl and machinectl goes through a
//! [`CommandRunner`], which makes the workflow testable with scripted doubles.

mod command;
mod runner;

pub use command::{CommandLine, CommandResult, Failure};
pub use runner::{CommandRunner, SystemRunner};
