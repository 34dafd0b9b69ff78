//! # l1watch poller
//!
//! **Concurrent latest-block polling across many independent chains**
//!
//! This crate fetches the latest block of every active chain, tolerates
//! any mix of per-chain failures, and reconciles the results into a
//! snapshot set that readers observe as immutable views.
//!
//! ## Features
//!
//! - **Proxy first**: requests go through `/api/rpc/{id}/rpc`, with a
//!   time-bounded direct fallback for chains the proxy does not route
//! - **Independent chains**: one slow or broken endpoint never delays another row
//! - **Stable rows**: display order is fixed once and never reshuffled
//! - **No overlap**: manual refreshes coalesce with a round in flight
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use l1watch_core::ChainRegistry;
//! use l1watch_poller::{EngineConfig, FetcherConfig, PollingEngine, RpcFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = RpcFetcher::new(FetcherConfig::default())?;
//!     let chains = ChainRegistry::builtin().active_chains();
//!
//!     let handle = PollingEngine::new(fetcher, chains, EngineConfig::default()).spawn();
//!     let mut views = handle.subscribe();
//!
//!     while views.changed().await.is_ok() {
//!         let view = views.borrow().clone();
//!         println!("round {}: {} chains", view.round, view.chains.len());
//!     }
//!
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod rpc;

// Re-export main types for convenience
pub use engine::{
    EngineConfig, EngineHandle, PollingEngine, RefreshOutcome, RoundSummary, DEFAULT_POLL_INTERVAL,
};
pub use error::{FetchError, FetchErrorKind, PollerError};
pub use rpc::{
    BlockSource, FetcherConfig, RpcFetcher, DEFAULT_DIRECT_TIMEOUT, DEFAULT_PROXY_TIMEOUT,
};
