//! Workflow phases and the report of a run

use serde::Serialize;
use std::fmt;

/// One step of the smoke workflow, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    CheckRequirements,
    ResolvePaths,
    EnsureImage,
    Setup,
    Init,
    VerifyNodes,
}

impl Phase {
    /// All phases in the order they run
    pub const ALL: [Phase; 6] = [
        Phase::CheckRequirements,
        Phase::ResolvePaths,
        Phase::EnsureImage,
        Phase::Setup,
        Phase::Init,
        Phase::VerifyNodes,
    ];

    /// Human readable description
    pub fn description(&self) -> &'static str {
        match self {
            Phase::CheckRequirements => "check root privileges",
            Phase::ResolvePaths => "resolve kube-spawn, kubectl and machinectl",
            Phase::EnsureImage => "ensure base image is available",
            Phase::Setup => "kube-spawn setup",
            Phase::Init => "kube-spawn init",
            Phase::VerifyNodes => "verify cluster nodes",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::CheckRequirements => "check-requirements",
            Phase::ResolvePaths => "resolve-paths",
            Phase::EnsureImage => "ensure-image",
            Phase::Setup => "setup",
            Phase::Init => "init",
            Phase::VerifyNodes => "verify-nodes",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a single phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub state: PhaseState,
}

/// Outcome of a whole run
///
/// A phase only leaves `NotStarted` once its predecessor has `Succeeded`;
/// the first `Failed` phase ends the run and leaves the rest untouched.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub phases: Vec<PhaseRecord>,
    /// Diagnostic of the failed phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            phases: Phase::ALL
                .iter()
                .map(|&phase| PhaseRecord {
                    phase,
                    state: PhaseState::NotStarted,
                })
                .collect(),
            error: None,
        }
    }
}

impl RunReport {
    pub fn state(&self, phase: Phase) -> PhaseState {
        self.phases
            .iter()
            .find(|r| r.phase == phase)
            .map(|r| r.state)
            .unwrap_or(PhaseState::NotStarted)
    }

    pub(crate) fn set(&mut self, phase: Phase, state: PhaseState) {
        if let Some(record) = self.phases.iter_mut().find(|r| r.phase == phase) {
            record.state = state;
        }
    }

    /// True iff every phase succeeded
    pub fn passed(&self) -> bool {
        self.phases.iter().all(|r| r.state == PhaseState::Succeeded)
    }

    /// The phase that ended the run, if any
    pub fn failed_phase(&self) -> Option<Phase> {
        self.phases
            .iter()
            .find(|r| r.state == PhaseState::Failed)
            .map(|r| r.phase)
    }
}
