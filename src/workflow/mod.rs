//! The kube-spawn smoke workflow
//!
//! Six phases run strictly in order:
//!
//! 1. check root privileges
//! 2. resolve the kube-spawn, kubectl and machinectl executables
//! 3. make sure the CoreOS base image is registered, pulling it if absent
//! 4. `kube-spawn setup`, then check the machines machinectl lists
//! 5. `kube-spawn init`, then point `KUBECONFIG` at the generated credentials
//! 6. check the nodes `kubectl get nodes` reports
//!
//! The first failing phase ends the run.

mod config;
mod phase;
mod resolve;
mod runner;

pub use config::{ExpectedTopology, ImageSource, RunConfig};
pub use phase::{Phase, PhaseRecord, PhaseState, RunReport};
pub use resolve::{ExecutableSearch, Executables, Origin, Resolved};
pub use runner::PhaseRunner;
