//! Configuration file handling

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Cluster topology and version
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Base image the nodes boot from
    #[serde(default)]
    pub image: ImageConfig,

    /// Explicit executable locations
    #[serde(default)]
    pub executables: ExecutablesConfig,
}

/// Cluster settings
#[derive(Debug, Deserialize)]
pub struct ClusterConfig {
    /// Number of nodes to request from `kube-spawn setup`
    #[serde(default = "default_nodes")]
    pub nodes: usize,

    /// Value passed as `--kubernetes-version`
    #[serde(default = "default_kubernetes_version")]
    pub kubernetes_version: String,

    /// Cluster name, used to locate the generated kubeconfig
    #[serde(default = "default_cluster_name")]
    pub name: String,

    /// Prefix of machine names that belong to the cluster
    #[serde(default = "default_instance_prefix")]
    pub instance_prefix: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            kubernetes_version: default_kubernetes_version(),
            name: default_cluster_name(),
            instance_prefix: default_instance_prefix(),
        }
    }
}

fn default_nodes() -> usize {
    2
}
fn default_kubernetes_version() -> String {
    "1.7.0".to_string()
}
fn default_cluster_name() -> String {
    "default".to_string()
}
fn default_instance_prefix() -> String {
    crate::verify::INSTANCE_PREFIX.to_string()
}

/// Integrity verification applied by `machinectl pull-raw`
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerifyPolicy {
    /// No verification. The downloaded image is trusted as-is.
    #[default]
    No,
    /// Verify against a SHA256SUMS file
    Checksum,
    /// Verify SHA256SUMS and its GPG signature
    Signature,
}

impl VerifyPolicy {
    /// Value of the `--verify=` flag
    pub fn as_flag(&self) -> &'static str {
        match self {
            VerifyPolicy::No => "no",
            VerifyPolicy::Checksum => "checksum",
            VerifyPolicy::Signature => "signature",
        }
    }
}

impl fmt::Display for VerifyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

/// Base image settings
#[derive(Debug, Deserialize)]
pub struct ImageConfig {
    /// Local image name registered with machinectl
    #[serde(default = "default_image_name")]
    pub name: String,

    /// Remote location the image is pulled from when absent
    #[serde(default = "default_image_url")]
    pub url: String,

    /// Integrity verification for the pull
    #[serde(default)]
    pub verify: VerifyPolicy,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            name: default_image_name(),
            url: default_image_url(),
            verify: VerifyPolicy::default(),
        }
    }
}

fn default_image_name() -> String {
    "coreos".to_string()
}
fn default_image_url() -> String {
    "https://alpha.release.core-os.net/amd64-usr/current/coreos_developer_container.bin.bz2"
        .to_string()
}

/// Explicit executable paths; unset entries are searched for
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ExecutablesConfig {
    pub kube_spawn: Option<PathBuf>,
    pub kubectl: Option<PathBuf>,
    pub machinectl: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.cluster.nodes == 0 {
            return Err(Error::Config(
                "cluster.nodes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
