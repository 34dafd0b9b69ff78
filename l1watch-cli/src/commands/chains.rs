//! Chains command implementation.

use clap::Args;
use colored::Colorize;

use l1watch_core::{ChainDescriptor, ChainRegistry, RegistryEntry};

use crate::config::WatchConfig;
use crate::output;

/// Arguments for the chains command.
#[derive(Args)]
pub struct ChainsArgs {
    /// Show details for one chain (case-insensitive)
    pub name: Option<String>,

    /// Also list registry entries that are not polled
    #[arg(short, long)]
    pub all: bool,

    /// Print active chains as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the chains command.
pub fn run(args: ChainsArgs, config: &WatchConfig) -> i32 {
    let registry = config.registry();

    if let Some(name) = &args.name {
        return show_one(&registry, name);
    }

    let active = registry.active_chains();

    if args.json {
        return match serde_json::to_string_pretty(&active) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                output::error(&format!("Failed to serialize chains: {}", e));
                1
            }
        };
    }

    output::header("Active Chains");

    println!();
    println!(
        "{:<18} {:<10} {:<10} {}",
        "Name".bold(),
        "EVM ID".bold(),
        "Status".bold(),
        "RPC".bold()
    );
    println!("{}", "─".repeat(70).dimmed());

    for entry in registry.entries() {
        let polled = active.iter().any(|c| c.chain_name == entry.chain_name);
        if !polled && !args.all {
            continue;
        }

        let status = if polled {
            "polled".green()
        } else {
            "skipped".dimmed()
        };
        println!(
            "{:<18} {:<10} {:<10} {}",
            entry.chain_name.green(),
            entry.evm_chain_id.as_deref().unwrap_or("-"),
            status,
            entry.rpc_url.as_deref().unwrap_or("-").dimmed()
        );
    }

    println!();
    output::hint(&format!(
        "{} of {} registry entries are polled.",
        active.len(),
        registry.entries().len()
    ));
    if !args.all {
        output::hint("Use --all to include skipped entries.");
    }

    0
}

fn show_one(registry: &ChainRegistry, name: &str) -> i32 {
    let Some(entry) = registry.find(name) else {
        output::error(&format!("Chain '{}' is not in the registry.", name));
        return 1;
    };

    output::header(&entry.chain_name);
    output::kv("EVM chain id", entry.evm_chain_id.as_deref().unwrap_or("-"));
    output::kv("RPC", entry.rpc_url.as_deref().unwrap_or("-"));
    output::kv("Debug enabled", &entry.debug_enabled.to_string());
    if let Some(description) = &entry.description {
        output::kv("Description", description);
    }
    output::kv("Polled", &polling_status(registry, entry));
    println!();

    0
}

fn polling_status(registry: &ChainRegistry, entry: &RegistryEntry) -> String {
    if !registry.policy().allows(entry) {
        return "no (not allowed)".to_string();
    }
    match ChainDescriptor::try_from(entry) {
        Ok(_) => "yes".to_string(),
        Err(e) => format!("no ({})", e),
    }
}
