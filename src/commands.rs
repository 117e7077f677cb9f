//! CLI command definitions
//!
//! Defines the clap commands for the smoke harness.

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Where configuration and the kube-spawn source tree come from
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file (default: ~/.config/kube-spawn-smoke/config.toml)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// kube-spawn source tree containing ./kube-spawn and ./k8s/kubectl
    /// (default: current directory)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision a cluster with kube-spawn and verify it (requires root)
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Number of nodes to set up
        #[arg(long)]
        nodes: Option<usize>,

        /// Kubernetes version passed to kube-spawn
        #[arg(long)]
        kubernetes_version: Option<String>,

        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show where kube-spawn, kubectl and machinectl resolve to
    Paths {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse tool output from stdin
    #[command(subcommand)]
    Parse(ParseCommands),
}

#[derive(Subcommand)]
pub enum ParseCommands {
    /// Print cluster machine names from `machinectl list --no-legend` output
    Instances {
        /// Machine name prefix
        #[arg(long, default_value = crate::verify::INSTANCE_PREFIX)]
        prefix: String,
    },

    /// Print the node count from `kubectl get nodes --no-headers` output
    Nodes,
}
