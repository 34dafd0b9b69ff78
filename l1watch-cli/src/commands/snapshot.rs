//! Snapshot command: run one round, print it, exit.

use clap::Args;

use l1watch_poller::{PollingEngine, RpcFetcher};

use crate::config::WatchConfig;
use crate::output;

/// Arguments for the snapshot command.
#[derive(Args)]
pub struct SnapshotArgs {
    /// Proxy base URL serving /api/rpc/{chain id}/rpc
    #[arg(long)]
    pub proxy_url: Option<String>,

    /// Print the view as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: SnapshotArgs, config: &WatchConfig) -> i32 {
    let (engine_config, fetcher_config) = match (
        config.engine_config(None),
        config.fetcher_config(args.proxy_url),
    ) {
        (Ok(e), Ok(f)) => (e, f),
        (Err(e), _) | (_, Err(e)) => {
            output::error(&e.to_string());
            return 1;
        }
    };

    let fetcher = match RpcFetcher::new(fetcher_config) {
        Ok(f) => f,
        Err(e) => {
            output::error(&format!("Failed to create RPC client: {}", e));
            return 1;
        }
    };

    let options = engine_config.aggregate;
    let chains = config.registry().active_chains();
    if chains.is_empty() {
        output::warn("No chains are active. Check the [allow] section of your config.");
    }

    let mut engine = PollingEngine::new(fetcher, chains, engine_config);
    let summary = engine.run_round().await;
    let view = engine.view();

    if args.json {
        return match serde_json::to_string_pretty(&*view) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                output::error(&format!("Failed to serialize view: {}", e));
                1
            }
        };
    }

    output::render_view(&view, &options, unix_now());
    output::hint(&format!(
        "{} chains fetched, {} failed in {:.2}s",
        summary.succeeded,
        summary.failed,
        summary.elapsed.as_secs_f64()
    ));

    0
}

pub(crate) fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
