//! Command lines and captured results

use std::fmt;

use crate::common::{Error, Result};

/// An external program invocation
///
/// Built either from a whitespace-tokenized line (no quoting support, so an
/// argument can never contain whitespace) or incrementally with [`arg`].
///
/// [`arg`]: CommandLine::arg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CommandLine {
    /// Create a command line for a program with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Tokenize a line on whitespace: the first token is the program
    ///
    /// An empty line yields an empty program, which fails to start.
    pub fn parse(line: &str) -> Self {
        let mut tokens = line.split_whitespace().map(str::to_string);
        Self {
            program: tokens.next().unwrap_or_default(),
            args: tokens.collect(),
            envs: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable for this invocation only
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Why a command did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The process could not be started
    Spawn(String),
    /// The process exited unsuccessfully; `None` when killed by a signal
    Exit(Option<i32>),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Spawn(reason) => write!(f, "failed to start: {}", reason),
            Failure::Exit(Some(code)) => write!(f, "exit status {}", code),
            Failure::Exit(None) => write!(f, "terminated by signal"),
        }
    }
}

/// Captured output of one finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// The command as it was issued
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    /// Set precisely when the command did not start or exited non-zero
    pub failure: Option<Failure>,
}

impl CommandResult {
    /// A successful result
    pub fn success(command: &CommandLine, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            command: command.to_string(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            failure: None,
        }
    }

    /// A failed result
    pub fn failed(
        command: &CommandLine,
        failure: Failure,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            command: command.to_string(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            failure: Some(failure),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Turn a failure into [`Error::CommandFailed`], keeping the captured output
    pub fn into_result(self) -> Result<Self> {
        match &self.failure {
            None => Ok(self),
            Some(failure) => Err(Error::command_failed(
                &self.command,
                &failure.to_string(),
                &self.stdout,
                &self.stderr,
            )),
        }
    }
}
