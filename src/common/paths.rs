//! Well-known filesystem locations
//!
//! Configuration lives in the platform config directory; the generated
//! cluster credentials live under the provisioning tool's working directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "kube-spawn-smoke";

/// Directory the provisioning tool writes its per-cluster state into
pub const STATE_DIR: &str = ".kube-spawn";

/// Environment variable the cluster CLI reads its credentials path from
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// Well-known absolute path of the provisioning tool
pub const FALLBACK_KUBE_SPAWN: &str = "/usr/bin/kube-spawn";

/// Well-known absolute path of the cluster CLI
pub const FALLBACK_KUBECTL: &str = "/usr/bin/kubectl";

/// Well-known absolute path of the supervisor CLI
pub const FALLBACK_MACHINECTL: &str = "/usr/bin/machinectl";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/kube-spawn-smoke/`
/// - macOS: `~/Library/Application Support/kube-spawn-smoke/`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Path of the kubeconfig generated by `kube-spawn init` for a cluster
///
/// An inherited `KUBECONFIG` takes precedence over the generated location.
pub fn kubeconfig_path(work_dir: &Path, cluster_name: &str) -> PathBuf {
    select_kubeconfig(std::env::var_os(KUBECONFIG_ENV), work_dir, cluster_name)
}

/// Pick between an inherited `KUBECONFIG` value and the generated location
///
/// An empty inherited value counts as unset.
pub fn select_kubeconfig(
    inherited: Option<OsString>,
    work_dir: &Path,
    cluster_name: &str,
) -> PathBuf {
    match inherited {
        Some(inherited) if !inherited.is_empty() => PathBuf::from(inherited),
        _ => generated_kubeconfig(work_dir, cluster_name),
    }
}

/// The kubeconfig location `kube-spawn init` writes for a cluster
pub fn generated_kubeconfig(work_dir: &Path, cluster_name: &str) -> PathBuf {
    work_dir
        .join(STATE_DIR)
        .join(cluster_name)
        .join("kubeconfig")
}
