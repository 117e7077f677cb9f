//! Process-backed command execution

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::command::{CommandLine, CommandResult, Failure};

/// Runs one external command to completion
///
/// Implementations never retry and never swallow failures; the caller
/// decides whether a failed result is fatal.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and capture stdout and stderr separately
    async fn run(&self, command: &CommandLine) -> CommandResult;

    /// Tokenize a line on whitespace and run it
    async fn run_line(&self, line: &str) -> CommandResult {
        self.run(&CommandLine::parse(line)).await
    }
}

/// Spawns real child processes and waits for them without a timeout
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandLine) -> CommandResult {
        tracing::info!("{}", command);

        if command.program().is_empty() {
            return CommandResult::failed(
                command,
                Failure::Spawn("empty command line".to_string()),
                "",
                "",
            );
        }

        let output = Command::new(command.program())
            .args(command.args())
            .envs(command.envs().iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(command = %command, error = %e, "failed to spawn");
                return CommandResult::failed(command, Failure::Spawn(e.to_string()), "", "");
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::debug!(command = %command, status = %output.status, "command exited");

        if output.status.success() {
            CommandResult::success(command, stdout, stderr)
        } else {
            CommandResult::failed(command, Failure::Exit(output.status.code()), stdout, stderr)
        }
    }
}
