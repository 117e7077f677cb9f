//! CLI command handling
//!
//! Dispatches CLI commands and formats output.

use std::io::Read;
use std::path::PathBuf;

use colored::Colorize;

use crate::commands::{Commands, ConfigArgs, ParseCommands};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::exec::SystemRunner;
use crate::verify::{count_non_blank_lines, parse_instance_listing};
use crate::workflow::{
    ExpectedTopology, Executables, Origin, PhaseRunner, PhaseState, Resolved, RunConfig,
    RunReport,
};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            config,
            nodes,
            kubernetes_version,
            json,
        } => {
            let mut run_config = load_run_config(&config)?;
            if let Some(nodes) = nodes {
                run_config.topology = ExpectedTopology::new(nodes)?;
            }
            if let Some(version) = kubernetes_version {
                run_config.kubernetes_version = version;
            }

            if !json {
                println!(
                    "\n{} kube-spawn {} with {} nodes",
                    "Smoke Test:".blue().bold(),
                    run_config.kubernetes_version.white().bold(),
                    run_config.topology.node_count()
                );
            }

            let report = PhaseRunner::new(run_config, SystemRunner).run().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            match report.failed_phase() {
                Some(phase) => Err(Error::RunFailed(phase.to_string())),
                None => Ok(()),
            }
        }

        Commands::Paths { config, json } => {
            let run_config = load_run_config(&config)?;
            let executables = run_config.search.resolve();

            if json {
                println!("{}", serde_json::to_string_pretty(&executables)?);
            } else {
                print_executables(&executables);
            }
            Ok(())
        }

        Commands::Parse(parse_cmd) => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;

            match parse_cmd {
                ParseCommands::Instances { prefix } => {
                    for name in parse_instance_listing(&input, &prefix) {
                        println!("{}", name);
                    }
                }
                ParseCommands::Nodes => {
                    println!("{}", count_non_blank_lines(&input));
                }
            }
            Ok(())
        }
    }
}

/// Load the config file and bind it to a working tree
fn load_run_config(args: &ConfigArgs) -> Result<RunConfig> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let work_dir = match &args.work_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    RunConfig::from_config(&config, absolute(work_dir)?)
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn print_report(report: &RunReport) {
    println!();
    for record in &report.phases {
        let line = format!("{} ({})", record.phase, record.phase.description());
        match record.state {
            PhaseState::Succeeded => println!("  {} {}", "✓".green(), line),
            PhaseState::Failed => println!("  {} {}", "✗".red(), line),
            PhaseState::NotStarted | PhaseState::Running => {
                println!("  {} {}", "-".dimmed(), line.dimmed())
            }
        }
    }

    if let Some(error) = &report.error {
        println!("\n{}\n{}", "Error:".red().bold(), error);
    }

    if report.passed() {
        println!("\n{} {}\n", "✓".green().bold(), "Smoke Test Passed".green().bold());
    } else {
        println!("\n{} {}\n", "✗".red().bold(), "Smoke Test Failed".red().bold());
    }
}

fn print_executables(executables: &Executables) {
    print_resolved("kube-spawn", &executables.kube_spawn);
    print_resolved("kubectl", &executables.kubectl);
    print_resolved("machinectl", &executables.machinectl);
}

fn print_resolved(name: &str, resolved: &Resolved) {
    let origin = match resolved.origin {
        Origin::Configured => "configured".cyan(),
        Origin::Found => "found".green(),
        Origin::Fallback => "fallback".yellow(),
    };
    println!("  {:<12} {} ({})", name, resolved.display(), origin);
}
