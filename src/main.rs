//! kube-spawn smoke test harness
//!
//! Drives kube-spawn through image preparation, cluster setup and cluster
//! initialization, and checks the machines and nodes that result.

use clap::Parser;
use commands::Commands;
use smoke::{cli, commands, common};

#[derive(Parser)]
#[command(name = "smoke", about = "End-to-end smoke test for kube-spawn")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    common::logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
