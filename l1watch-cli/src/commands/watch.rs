//! Watch command: live dashboard until Ctrl+C.

use std::future::Future;

use clap::Args;
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use l1watch_core::{AggregateOptions, DashboardView};
use l1watch_poller::{EngineHandle, PollingEngine, RefreshOutcome, RpcFetcher};

use crate::commands::snapshot::unix_now;
use crate::config::WatchConfig;
use crate::output;

/// Arguments for the watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Polling interval (e.g., "5s", "1m")
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Proxy base URL serving /api/rpc/{chain id}/rpc
    #[arg(long)]
    pub proxy_url: Option<String>,

    /// Print every view as a JSON line instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WatchArgs, config: &WatchConfig) -> i32 {
    let engine_config = match config.engine_config(args.interval.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            output::error(&e.to_string());
            return 1;
        }
    };
    let fetcher = match config
        .fetcher_config(args.proxy_url)
        .map_err(|e| e.to_string())
        .and_then(|c| RpcFetcher::new(c).map_err(|e| e.to_string()))
    {
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

    let handle = PollingEngine::new(fetcher, chains, engine_config).spawn();
    let interrupted = async {
        let _ = tokio::signal::ctrl_c().await;
        debug!("Interrupted, stopping");
    };
    drive(
        &handle,
        BufReader::new(tokio::io::stdin()),
        interrupted,
        args.json,
        &options,
    )
    .await;

    match handle.shutdown().await {
        Ok(()) => 0,
        Err(e) => {
            output::error(&format!("Polling task failed: {}", e));
            1
        }
    }
}

/// Render views and forward refresh requests until `stop` resolves or the
/// engine goes away. Each line read from `input` requests a refresh.
async fn drive<R, F>(
    handle: &EngineHandle,
    input: R,
    stop: F,
    json: bool,
    options: &AggregateOptions,
) where
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut views = handle.subscribe();
    let mut lines = input.lines();
    let mut input_open = true;
    let mut last_refresh: Option<RefreshOutcome> = None;
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if json {
                    print_json(&view);
                } else {
                    redraw(&view, options, last_refresh);
                }
            }
            line = lines.next_line(), if input_open => {
                match line {
                    Ok(Some(_)) => {
                        let outcome = handle.refresh();
                        debug!("Manual refresh: {:?}", outcome);
                        last_refresh = Some(outcome);
                    }
                    Ok(None) | Err(_) => input_open = false,
                }
            }
        }
    }
}

fn print_json(view: &DashboardView) {
    match serde_json::to_string(view) {
        Ok(line) => println!("{}", line),
        Err(e) => output::error(&format!("Failed to serialize view: {}", e)),
    }
}

fn redraw(
    view: &DashboardView,
    options: &AggregateOptions,
    last_refresh: Option<RefreshOutcome>,
) {
    // Clear screen, cursor home
    print!("\x1B[2J\x1B[1;1H");
    output::render_view(view, options, unix_now());

    let note = match last_refresh {
        Some(RefreshOutcome::Queued) => " (refresh queued)",
        Some(RefreshOutcome::Coalesced) => " (refresh merged into running round)",
        Some(RefreshOutcome::Stopped) => " (engine stopped)",
        None => "",
    };
    println!(
        "{}{}",
        "Enter to refresh · Ctrl+C to stop".dimmed(),
        note.dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use l1watch_poller::{EngineConfig, FetcherConfig};

    fn engine_every(interval: Duration) -> EngineHandle {
        let fetcher = RpcFetcher::new(FetcherConfig::default()).unwrap();
        let config = EngineConfig {
            interval,
            ..EngineConfig::default()
        };
        PollingEngine::new(fetcher, vec![], config).spawn()
    }

    #[tokio::test]
    async fn test_stop_is_seen_while_views_keep_changing() {
        let handle = engine_every(Duration::from_millis(5));
        let stop = tokio::time::sleep(Duration::from_millis(200));

        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            drive(&handle, tokio::io::empty(), stop, true, &AggregateOptions::default()),
        )
        .await;

        assert!(finished.is_ok());
        assert!(handle.view().round > 1);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_input_line_requests_a_round() {
        let handle = engine_every(Duration::from_secs(60));
        handle.subscribe().wait_for(|v| v.round == 1).await.unwrap();

        let input: &[u8] = b"\n";
        let stop = tokio::time::sleep(Duration::from_millis(200));
        drive(&handle, input, stop, true, &AggregateOptions::default()).await;

        assert_eq!(handle.view().round, 2);
        handle.shutdown().await.unwrap();
    }
}
