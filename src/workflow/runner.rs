//! Phase runner
//!
//! Runs the fixed linear workflow. Each phase returns a `Result`; the first
//! error marks its phase `Failed` and ends the run. Nothing is retried and
//! machines created before a failure are left in place.

use std::path::PathBuf;

use crate::common::config::VerifyPolicy;
use crate::common::paths::{self, KUBECONFIG_ENV};
use crate::common::{effective_uid, is_privileged, Error, Result};
use crate::exec::{CommandLine, CommandRunner};
use crate::verify::{count_non_blank_lines, parse_instance_listing};

use super::config::RunConfig;
use super::phase::{Phase, PhaseState, RunReport};
use super::resolve::Executables;

/// Drives kube-spawn through setup and init and checks the result
pub struct PhaseRunner<R> {
    config: RunConfig,
    runner: R,
    privilege_probe: fn() -> bool,
    executables: Option<Executables>,
    kubeconfig: Option<PathBuf>,
    report: RunReport,
}

impl<R: CommandRunner> PhaseRunner<R> {
    pub fn new(config: RunConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            privilege_probe: is_privileged,
            executables: None,
            kubeconfig: None,
            report: RunReport::default(),
        }
    }

    /// Replace the root check, e.g. to run against stand-in tools
    pub fn with_privilege_probe(mut self, probe: fn() -> bool) -> Self {
        self.privilege_probe = probe;
        self
    }

    /// Run every phase in order, stopping at the first failure
    pub async fn run(mut self) -> RunReport {
        for phase in Phase::ALL {
            tracing::info!("Phase {}: {}", phase, phase.description());
            self.report.set(phase, PhaseState::Running);

            match self.execute(phase).await {
                Ok(()) => self.report.set(phase, PhaseState::Succeeded),
                Err(e) => {
                    tracing::error!("Phase {} failed: {}", phase, e);
                    self.report.set(phase, PhaseState::Failed);
                    self.report.error = Some(e.to_string());
                    break;
                }
            }
        }
        self.report
    }

    async fn execute(&mut self, phase: Phase) -> Result<()> {
        match phase {
            Phase::CheckRequirements => self.check_requirements(),
            Phase::ResolvePaths => {
                self.resolve_paths();
                Ok(())
            }
            Phase::EnsureImage => self.ensure_image().await,
            Phase::Setup => self.setup().await,
            Phase::Init => self.init().await,
            Phase::VerifyNodes => self.verify_nodes().await,
        }
    }

    fn check_requirements(&self) -> Result<()> {
        if !(self.privilege_probe)() {
            return Err(Error::NotPrivileged(effective_uid()));
        }
        Ok(())
    }

    fn resolve_paths(&mut self) {
        let executables = self.config.search.resolve();
        tracing::debug!(?executables, "resolved executables");
        self.executables = Some(executables);
    }

    fn resolved(&self) -> Result<&Executables> {
        self.executables
            .as_ref()
            .ok_or_else(|| Error::Internal("executables used before resolve-paths".to_string()))
    }

    /// Pull the base image unless machinectl already knows it
    async fn ensure_image(&self) -> Result<()> {
        let machinectl = self.resolved()?.machinectl.display();
        let image = &self.config.image;

        let show = CommandLine::new(&machinectl)
            .arg("show-image")
            .arg(&image.name);
        if self.runner.run(&show).await.succeeded() {
            tracing::info!("Image {} already present", image.name);
            return Ok(());
        }

        tracing::info!("Image {} not found, pulling {}", image.name, image.url);
        if image.verify == VerifyPolicy::No {
            tracing::warn!("Pulling {} without integrity verification", image.url);
        }

        let pull = CommandLine::new(&machinectl)
            .arg("pull-raw")
            .arg(format!("--verify={}", image.verify))
            .arg(&image.url)
            .arg(&image.name);
        self.runner.run(&pull).await.into_result()?;
        Ok(())
    }

    async fn setup(&self) -> Result<()> {
        let kube_spawn = self.resolved()?.kube_spawn.display();
        let expected = self.config.topology.node_count();

        let setup = CommandLine::new(kube_spawn)
            .arg(format!("--kubernetes-version={}", self.config.kubernetes_version))
            .arg("setup")
            .arg(format!("--nodes={}", expected));
        self.runner.run(&setup).await.into_result()?;

        let machines = self.running_instances().await?;
        tracing::info!("Running machines: {:?}", machines);
        if machines.len() != expected {
            return Err(Error::count_mismatch("machinectl list", machines.len(), expected));
        }
        Ok(())
    }

    /// Names of the cluster machines machinectl currently lists
    pub async fn running_instances(&self) -> Result<Vec<String>> {
        let machinectl = self.resolved()?.machinectl.display();
        let list = CommandLine::new(machinectl).arg("list").arg("--no-legend");
        let result = self.runner.run(&list).await.into_result()?;
        Ok(parse_instance_listing(
            &result.stdout,
            &self.config.instance_prefix,
        ))
    }

    async fn init(&mut self) -> Result<()> {
        let kube_spawn = self.resolved()?.kube_spawn.display();

        let init = CommandLine::new(kube_spawn)
            .arg(format!("--kubernetes-version={}", self.config.kubernetes_version))
            .arg("init");
        self.runner.run(&init).await.into_result()?;

        let kubeconfig =
            paths::kubeconfig_path(&self.config.search.work_dir, &self.config.cluster_name);
        tracing::info!("Using {}={}", KUBECONFIG_ENV, kubeconfig.display());
        self.kubeconfig = Some(kubeconfig);
        Ok(())
    }

    async fn verify_nodes(&self) -> Result<()> {
        let kubectl = self.resolved()?.kubectl.display();
        let kubeconfig = self
            .kubeconfig
            .as_ref()
            .ok_or_else(|| Error::Internal("kubeconfig used before init".to_string()))?;
        let expected = self.config.topology.node_count();

        let get_nodes = CommandLine::new(kubectl)
            .arg("get")
            .arg("nodes")
            .arg("--no-headers")
            .env(KUBECONFIG_ENV, kubeconfig.display().to_string());
        let result = self.runner.run(&get_nodes).await.into_result()?;

        let nodes = count_non_blank_lines(&result.stdout);
        if nodes != expected {
            return Err(Error::count_mismatch("kubectl get nodes", nodes, expected));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::{Config, ExecutablesConfig};
    use crate::exec::{CommandResult, Failure};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const TWO_MACHINES: &str = "kube-spawn-0 container systemd-nspawn coreos 1478.0.0 10.22.0.130\n\
                                kube-spawn-1 container systemd-nspawn coreos 1478.0.0 10.22.0.131\n";
    const ONE_MACHINE: &str = "kube-spawn-0 container systemd-nspawn coreos 1478.0.0 10.22.0.130\n\
                               fedora container systemd-nspawn fedora 26 -\n";
    const TWO_NODES: &str = "kube-spawn-0   Ready     1m        v1.7.0\n\
                             kube-spawn-1   Ready     1m        v1.7.0\n";

    type CallLog = Arc<Mutex<Vec<CommandLine>>>;

    /// Answers commands by their subcommand argument and records every call
    #[derive(Default)]
    struct ScriptedRunner {
        responses: Vec<(&'static str, bool, &'static str)>,
        calls: CallLog,
    }

    impl ScriptedRunner {
        fn ok(mut self, subcommand: &'static str, stdout: &'static str) -> Self {
            self.responses.push((subcommand, true, stdout));
            self
        }

        fn fail(mut self, subcommand: &'static str) -> Self {
            self.responses.push((subcommand, false, "failure output"));
            self
        }

        fn happy() -> Self {
            Self::default()
                .ok("show-image", "")
                .ok("setup", "")
                .ok("list", TWO_MACHINES)
                .ok("init", "")
                .ok("get", TWO_NODES)
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, command: &CommandLine) -> CommandResult {
            self.calls.lock().unwrap().push(command.clone());
            let response = self
                .responses
                .iter()
                .find(|(sub, _, _)| command.args().iter().any(|a| a == sub));
            match response {
                Some((_, true, stdout)) => CommandResult::success(command, *stdout, ""),
                Some((_, false, stdout)) => {
                    CommandResult::failed(command, Failure::Exit(Some(1)), *stdout, "scripted error")
                }
                None => CommandResult::failed(
                    command,
                    Failure::Spawn("unscripted command".to_string()),
                    "",
                    "",
                ),
            }
        }
    }

    fn find_call(calls: &CallLog, subcommand: &str) -> Option<CommandLine> {
        calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.args().iter().any(|a| a == subcommand))
            .cloned()
    }

    fn run_config(nodes: usize) -> RunConfig {
        let mut config = Config::default();
        config.cluster.nodes = nodes;
        config.executables = ExecutablesConfig {
            kube_spawn: Some(PathBuf::from("/fake/kube-spawn")),
            kubectl: Some(PathBuf::from("/fake/kubectl")),
            machinectl: Some(PathBuf::from("/fake/machinectl")),
        };
        RunConfig::from_config(&config, "/fake").unwrap()
    }

    /// Run the workflow as root against a scripted runner
    async fn run_scripted(nodes: usize, runner: ScriptedRunner) -> (RunReport, CallLog) {
        let calls = runner.calls.clone();
        let report = PhaseRunner::new(run_config(nodes), runner)
            .with_privilege_probe(|| true)
            .run()
            .await;
        (report, calls)
    }

    #[tokio::test]
    async fn test_full_run_passes() {
        let (report, calls) = run_scripted(2, ScriptedRunner::happy()).await;

        assert!(report.passed(), "{:?}", report.error);
        assert!(find_call(&calls, "pull-raw").is_none());

        let setup = find_call(&calls, "setup").unwrap();
        assert_eq!(
            setup.to_string(),
            "/fake/kube-spawn --kubernetes-version=1.7.0 setup --nodes=2"
        );
        let get_nodes = find_call(&calls, "get").unwrap();
        assert_eq!(get_nodes.to_string(), "/fake/kubectl get nodes --no-headers");
        assert!(get_nodes.envs().iter().any(|(k, _)| k == KUBECONFIG_ENV));
    }

    #[tokio::test]
    async fn test_unprivileged_run_stops_before_any_command() {
        let runner = ScriptedRunner::happy();
        let calls = runner.calls.clone();
        let report = PhaseRunner::new(run_config(2), runner)
            .with_privilege_probe(|| false)
            .run()
            .await;

        assert_eq!(report.failed_phase(), Some(Phase::CheckRequirements));
        assert_eq!(report.state(Phase::ResolvePaths), PhaseState::NotStarted);
        assert!(report.error.unwrap().contains("root privileges"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_setup_with_expected_machines_passes() {
        let runner = ScriptedRunner::default()
            .ok("show-image", "")
            .ok("setup", "")
            .ok("list", TWO_MACHINES);
        let (report, _) = run_scripted(2, runner).await;

        assert_eq!(report.state(Phase::Setup), PhaseState::Succeeded);
        // init is unscripted, so the run ends right after setup
        assert_eq!(report.failed_phase(), Some(Phase::Init));
    }

    #[tokio::test]
    async fn test_setup_with_missing_machine_fails() {
        let runner = ScriptedRunner::default()
            .ok("show-image", "")
            .ok("setup", "")
            .ok("list", ONE_MACHINE)
            .ok("init", "");
        let (report, calls) = run_scripted(2, runner).await;

        assert_eq!(report.failed_phase(), Some(Phase::Setup));
        assert!(report
            .error
            .as_deref()
            .unwrap()
            .contains("got 1 nodes, expected 2 nodes."));
        assert_eq!(report.state(Phase::Init), PhaseState::NotStarted);
        assert!(find_call(&calls, "init").is_none());
    }

    #[tokio::test]
    async fn test_failed_setup_reports_output() {
        let runner = ScriptedRunner::default()
            .ok("show-image", "")
            .fail("setup");
        let (report, calls) = run_scripted(2, runner).await;

        assert_eq!(report.failed_phase(), Some(Phase::Setup));
        assert!(report.error.unwrap().contains("exit status 1"));
        assert!(find_call(&calls, "list").is_none());
    }

    #[tokio::test]
    async fn test_missing_image_is_pulled() {
        let runner = ScriptedRunner::default()
            .fail("show-image")
            .ok("pull-raw", "")
            .ok("setup", "")
            .ok("list", TWO_MACHINES)
            .ok("init", "")
            .ok("get", TWO_NODES);
        let (report, calls) = run_scripted(2, runner).await;

        assert_eq!(report.state(Phase::EnsureImage), PhaseState::Succeeded);
        assert!(report.passed());

        let pull = find_call(&calls, "pull-raw").unwrap();
        assert_eq!(
            pull.to_string(),
            "/fake/machinectl pull-raw --verify=no \
             https://alpha.release.core-os.net/amd64-usr/current/coreos_developer_container.bin.bz2 coreos"
        );
    }

    #[tokio::test]
    async fn test_failed_pull_aborts_before_setup() {
        let runner = ScriptedRunner::default()
            .fail("show-image")
            .fail("pull-raw")
            .ok("setup", "")
            .ok("list", TWO_MACHINES);
        let (report, calls) = run_scripted(2, runner).await;

        assert_eq!(report.failed_phase(), Some(Phase::EnsureImage));
        assert_eq!(report.state(Phase::Setup), PhaseState::NotStarted);
        assert!(find_call(&calls, "setup").is_none());

        let error = report.error.unwrap();
        assert!(error.contains("pull-raw"));
        assert!(error.contains("stdout: failure output"));
        assert!(error.contains("stderr: scripted error"));
    }

    #[tokio::test]
    async fn test_failed_init_stops_run() {
        let runner = ScriptedRunner::default()
            .ok("show-image", "")
            .ok("setup", "")
            .ok("list", TWO_MACHINES)
            .fail("init");
        let (report, calls) = run_scripted(2, runner).await;

        assert_eq!(report.failed_phase(), Some(Phase::Init));
        assert!(find_call(&calls, "get").is_none());
    }

    #[tokio::test]
    async fn test_failed_machine_listing_fails_setup() {
        let runner = ScriptedRunner::default()
            .ok("show-image", "")
            .ok("setup", "")
            .fail("list")
            .ok("init", "");
        let (report, calls) = run_scripted(2, runner).await;

        assert_eq!(report.failed_phase(), Some(Phase::Setup));
        assert!(find_call(&calls, "init").is_none());

        let error = report.error.unwrap();
        assert!(error.contains("/fake/machinectl list --no-legend"));
        assert!(error.contains("exit status 1"));
        assert!(error.contains("stdout: failure output"));
        assert!(error.contains("stderr: scripted error"));
    }

    #[tokio::test]
    async fn test_failed_node_listing_fails_verification() {
        let runner = ScriptedRunner::default()
            .ok("show-image", "")
            .ok("setup", "")
            .ok("list", TWO_MACHINES)
            .ok("init", "")
            .fail("get");
        let (report, _) = run_scripted(2, runner).await;

        assert_eq!(report.failed_phase(), Some(Phase::VerifyNodes));
        assert_eq!(report.state(Phase::Init), PhaseState::Succeeded);

        let error = report.error.unwrap();
        assert!(error.contains("/fake/kubectl get nodes --no-headers"));
        assert!(error.contains("exit status 1"));
        assert!(error.contains("stdout: failure output"));
        assert!(error.contains("stderr: scripted error"));
    }

    #[tokio::test]
    async fn test_node_count_mismatch_fails_verification() {
        let runner = ScriptedRunner::default()
            .ok("show-image", "")
            .ok("setup", "")
            .ok("list", TWO_MACHINES)
            .ok("init", "")
            .ok("get", "kube-spawn-0   Ready     1m        v1.7.0\n\n");
        let (report, _) = run_scripted(2, runner).await;

        assert_eq!(report.failed_phase(), Some(Phase::VerifyNodes));
        assert!(report
            .error
            .unwrap()
            .contains("got 1 nodes, expected 2 nodes."));
    }

    #[tokio::test]
    async fn test_running_instances_filters_foreign_machines() {
        let runner = ScriptedRunner::default().ok("list", ONE_MACHINE);
        let mut phases = PhaseRunner::new(run_config(2), runner);
        phases.resolve_paths();
        let names = phases.running_instances().await.unwrap();
        assert_eq!(names, vec!["kube-spawn-0"]);
    }
}
