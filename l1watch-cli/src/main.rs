//! l1watch CLI
//!
//! Terminal dashboard for the latest blocks of many EVM chains.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "l1watch")]
#[command(author = "LogicCrafter")]
#[command(version = "0.1.0")]
#[command(about = "l1watch - Live latest-block telemetry across EVM chains", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: ~/.l1watch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List chains selected for polling
    Chains(commands::chains::ChainsArgs),

    /// Fetch every chain once and print the result
    Snapshot(commands::snapshot::SnapshotArgs),

    /// Poll continuously and keep the table up to date
    Watch(commands::watch::WatchArgs),
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = match config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    let exit_code = match cli.command {
        Commands::Chains(args) => commands::chains::run(args, &config),
        Commands::Snapshot(args) => commands::snapshot::run(args, &config).await,
        Commands::Watch(args) => commands::watch::run(args, &config).await,
    };

    std::process::exit(exit_code);
}
