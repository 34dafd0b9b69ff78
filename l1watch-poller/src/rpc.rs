//! RPC fetcher for latest blocks.
//!
//! Sends `eth_getBlockByNumber("latest", true)` through a same-origin
//! proxy route keyed by the chain's EVM id, and falls back to the chain's
//! own endpoint when the proxy reports that it has no route for it. Both
//! paths are bounded by a timeout, so a hung endpoint only ever costs its
//! own chain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use l1watch_core::{Block, ChainDescriptor};

use crate::error::{FetchError, PollerError, Result};

/// Time bound for a direct request to a chain's own endpoint.
pub const DEFAULT_DIRECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Time bound for a request through the proxy route.
pub const DEFAULT_PROXY_TIMEOUT: Duration = Duration::from_secs(10);

/// Proxy error bodies that mean "this chain has no proxy route".
pub const DEFAULT_FALLBACK_MARKERS: &[&str] = &["chain config not found", "chain not configured"];

/// Anything that can produce a chain's latest block.
///
/// The engine only talks to this trait, so tests can drive it with
/// scripted sources instead of HTTP endpoints.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Fetch the latest block for one chain.
    async fn fetch_latest_block(&self, chain: &ChainDescriptor) -> Result<Block>;
}

#[async_trait]
impl<T: BlockSource + ?Sized> BlockSource for std::sync::Arc<T> {
    async fn fetch_latest_block(&self, chain: &ChainDescriptor) -> Result<Block> {
        (**self).fetch_latest_block(chain).await
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (&'static str, bool),
}

impl RpcRequest {
    fn latest_block() -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_getBlockByNumber",
            params: ("latest", true),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Block>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    message: Option<String>,
}

/// Fetcher settings.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Base URL serving `/api/rpc/{id}/rpc`. `None` sends every request
    /// straight to the chain's endpoint.
    pub proxy_url: Option<String>,
    /// Bound on the proxy path.
    pub proxy_timeout: Duration,
    /// Bound on the direct path.
    pub direct_timeout: Duration,
    /// Case-insensitive substrings of a proxy 5xx body that trigger the fallback.
    pub fallback_markers: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            proxy_timeout: DEFAULT_PROXY_TIMEOUT,
            direct_timeout: DEFAULT_DIRECT_TIMEOUT,
            fallback_markers: DEFAULT_FALLBACK_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// HTTP JSON-RPC fetcher with proxy-first routing.
///
/// # Example
///
/// ```rust,no_run
/// use l1watch_core::ChainRegistry;
/// use l1watch_poller::{BlockSource, FetcherConfig, RpcFetcher};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = RpcFetcher::new(FetcherConfig::default())?;
///
///     for chain in ChainRegistry::builtin().active_chains() {
///         match fetcher.fetch_latest_block(&chain).await {
///             Ok(block) => println!("{}: block {}", chain.chain_name, block.block_number()?),
///             Err(e) => println!("{}", e),
///         }
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RpcFetcher {
    client: Client,
    proxy_base: Option<String>,
    proxy_timeout: Duration,
    direct_timeout: Duration,
    fallback_markers: Vec<String>,
}

impl RpcFetcher {
    /// Create a fetcher.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProxyUrl` if the proxy base is not an absolute URL.
    pub fn new(config: FetcherConfig) -> std::result::Result<Self, PollerError> {
        let proxy_base = match config.proxy_url {
            Some(raw) => {
                Url::parse(&raw).map_err(|e| PollerError::InvalidProxyUrl {
                    url: raw.clone(),
                    reason: e.to_string(),
                })?;
                Some(raw.trim_end_matches('/').to_string())
            }
            None => None,
        };

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            proxy_base,
            proxy_timeout: config.proxy_timeout,
            direct_timeout: config.direct_timeout,
            fallback_markers: config
                .fallback_markers
                .into_iter()
                .map(|m| m.to_lowercase())
                .collect(),
        })
    }

    /// Proxy route for a chain, if a proxy is configured.
    pub fn proxy_route(&self, chain: &ChainDescriptor) -> Option<String> {
        self.proxy_base
            .as_ref()
            .map(|base| format!("{}/api/rpc/{}/rpc", base, chain.evm_chain_id))
    }

    /// POST the request and read the whole body. Only transport failures
    /// are errors here; status handling is up to the caller.
    async fn post(&self, chain: &ChainDescriptor, url: &str) -> Result<(StatusCode, String)> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            chain_name: chain.chain_name.clone(),
            message: e.to_string(),
        };

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&RpcRequest::latest_block())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        Ok((status, body))
    }

    fn is_unrouted_chain(&self, body: &str) -> bool {
        let body = body.to_lowercase();
        self.fallback_markers.iter().any(|m| body.contains(m.as_str()))
    }

    /// `post`, aborted after `limit`.
    async fn post_within(
        &self,
        chain: &ChainDescriptor,
        url: &str,
        limit: Duration,
    ) -> Result<(StatusCode, String)> {
        timeout(limit, self.post(chain, url))
            .await
            .unwrap_or_else(|_| {
                Err(FetchError::Timeout {
                    chain_name: chain.chain_name.clone(),
                    timeout: limit,
                })
            })
    }

    /// Direct request to the chain's own endpoint.
    async fn fetch_direct(&self, chain: &ChainDescriptor) -> Result<Block> {
        let (status, body) = self
            .post_within(chain, &chain.rpc_url, self.direct_timeout)
            .await?;
        decode_reply(chain, status, &body)
    }
}

#[async_trait]
impl BlockSource for RpcFetcher {
    async fn fetch_latest_block(&self, chain: &ChainDescriptor) -> Result<Block> {
        let Some(route) = self.proxy_route(chain) else {
            return self.fetch_direct(chain).await;
        };

        let (status, body) = self.post_within(chain, &route, self.proxy_timeout).await?;

        if status.is_server_error() && self.is_unrouted_chain(&body) {
            warn!(
                "Proxy has no route for {} (chain id {}), falling back to {}",
                chain.chain_name, chain.evm_chain_id, chain.rpc_url
            );
            return self.fetch_direct(chain).await;
        }

        debug!(chain = %chain.chain_name, status = status.as_u16(), "proxy replied");
        decode_reply(chain, status, &body)
    }
}

/// Turn a status and body into a block or the matching error.
fn decode_reply(chain: &ChainDescriptor, status: StatusCode, body: &str) -> Result<Block> {
    if !status.is_success() {
        return Err(FetchError::Http {
            chain_name: chain.chain_name.clone(),
            status: status.as_u16(),
        });
    }

    let reply: RpcResponse = serde_json::from_str(body).map_err(|e| FetchError::Decode {
        chain_name: chain.chain_name.clone(),
        message: e.to_string(),
    })?;

    if let Some(error) = reply.error {
        return Err(FetchError::Rpc {
            chain_name: chain.chain_name.clone(),
            message: error
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Unknown RPC error".to_string()),
        });
    }

    reply.result.ok_or_else(|| FetchError::Decode {
        chain_name: chain.chain_name.clone(),
        message: "response has no block".to_string(),
    })
}
