//! Run configuration fixed for the duration of one run

use std::path::PathBuf;

use crate::common::config::{Config, VerifyPolicy};
use crate::common::{Error, Result};

use super::resolve::ExecutableSearch;

/// The cluster shape a run must end up with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedTopology {
    node_count: usize,
}

impl ExpectedTopology {
    pub fn new(node_count: usize) -> Result<Self> {
        if node_count == 0 {
            return Err(Error::Config("node count must be at least 1".to_string()));
        }
        Ok(Self { node_count })
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }
}

/// Where the base image comes from when it is not registered locally
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub name: String,
    pub url: String,
    /// `No` skips integrity verification of the download entirely
    pub verify: VerifyPolicy,
}

/// Everything a [`PhaseRunner`](super::PhaseRunner) needs, passed in once
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub topology: ExpectedTopology,
    pub kubernetes_version: String,
    pub cluster_name: String,
    pub instance_prefix: String,
    pub image: ImageSource,
    pub search: ExecutableSearch,
}

impl RunConfig {
    /// Build a run configuration from the config file and a working tree
    pub fn from_config(config: &Config, work_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            topology: ExpectedTopology::new(config.cluster.nodes)?,
            kubernetes_version: config.cluster.kubernetes_version.clone(),
            cluster_name: config.cluster.name.clone(),
            instance_prefix: config.cluster.instance_prefix.clone(),
            image: ImageSource {
                name: config.image.name.clone(),
                url: config.image.url.clone(),
                verify: config.image.verify,
            },
            search: ExecutableSearch::new(work_dir).with_overrides(config.executables.clone()),
        })
    }
}
