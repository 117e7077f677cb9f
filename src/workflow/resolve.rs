//! Executable path resolution
//!
//! Resolution never fails: a tool that cannot be found resolves to its
//! well-known absolute path, and a wrong path surfaces later when the tool
//! is actually invoked.

use serde::Serialize;
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::common::config::ExecutablesConfig;
use crate::common::paths::{FALLBACK_KUBECTL, FALLBACK_KUBE_SPAWN, FALLBACK_MACHINECTL};

/// Where a resolved path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Configured explicitly, used without searching
    Configured,
    /// Found by searching
    Found,
    /// Not found; the well-known path is assumed
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub path: PathBuf,
    pub origin: Origin,
}

impl Resolved {
    /// Path in the form used on a command line
    pub fn display(&self) -> String {
        self.path.display().to_string()
    }
}

/// Resolved locations of the three external tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Executables {
    pub kube_spawn: Resolved,
    pub kubectl: Resolved,
    pub machinectl: Resolved,
}

/// Inputs to path resolution
#[derive(Debug, Clone)]
pub struct ExecutableSearch {
    /// Source tree the locally built tools live in
    pub work_dir: PathBuf,
    pub overrides: ExecutablesConfig,
}

impl ExecutableSearch {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            overrides: ExecutablesConfig::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: ExecutablesConfig) -> Self {
        self.overrides = overrides;
        self
    }

    /// Resolve all three tools
    ///
    /// kube-spawn and kubectl are looked up in the working tree
    /// (`./kube-spawn`, `./k8s/kubectl`), machinectl on `PATH`.
    pub fn resolve(&self) -> Executables {
        Executables {
            kube_spawn: resolve_one(
                self.overrides.kube_spawn.as_ref(),
                self.work_dir.join("kube-spawn"),
                FALLBACK_KUBE_SPAWN,
            ),
            kubectl: resolve_one(
                self.overrides.kubectl.as_ref(),
                self.work_dir.join("k8s").join("kubectl"),
                FALLBACK_KUBECTL,
            ),
            machinectl: resolve_one(
                self.overrides.machinectl.as_ref(),
                "machinectl",
                FALLBACK_MACHINECTL,
            ),
        }
    }
}

fn resolve_one<S: AsRef<OsStr>>(
    configured: Option<&PathBuf>,
    candidate: S,
    fallback: &str,
) -> Resolved {
    if let Some(path) = configured {
        return Resolved {
            path: path.clone(),
            origin: Origin::Configured,
        };
    }

    match which::which(candidate.as_ref()) {
        Ok(path) => Resolved {
            path,
            origin: Origin::Found,
        },
        Err(e) => {
            tracing::warn!(
                "{} not found ({}), falling back to {}",
                candidate.as_ref().to_string_lossy(),
                e,
                fallback
            );
            Resolved {
                path: PathBuf::from(fallback),
                origin: Origin::Fallback,
            }
        }
    }
}
