//! Error types for the l1watch poller.
//!
//! [`FetchError`] describes why one chain's latest block could not be
//! retrieved. It always names the chain, and its display text is what a
//! failed row shows. [`PollerError`] covers engine and client setup.

use std::time::Duration;

use thiserror::Error;

/// Broad class of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Network failure or non-success HTTP status.
    Transport,
    /// The endpoint answered with a JSON-RPC error envelope.
    Rpc,
    /// The direct request exceeded its time bound.
    Timeout,
    /// The response could not be understood.
    Decode,
}

/// Errors that can occur while fetching a chain's latest block.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Endpoint returned a non-success status.
    #[error("HTTP {status}: Failed to fetch data for chain {chain_name}")]
    Http {
        /// Chain being fetched
        chain_name: String,
        /// HTTP status code
        status: u16,
    },

    /// Connection-level failure.
    #[error("Network error for {chain_name}: {message}")]
    Transport {
        /// Chain being fetched
        chain_name: String,
        /// Underlying transport error
        message: String,
    },

    /// Remote reported a JSON-RPC error.
    #[error("RPC Error for {chain_name}: {message}")]
    Rpc {
        /// Chain being fetched
        chain_name: String,
        /// Message from the error envelope
        message: String,
    },

    /// Direct request did not complete in time.
    #[error("Request to {chain_name} timed out after {timeout:?}")]
    Timeout {
        /// Chain being fetched
        chain_name: String,
        /// The bound that elapsed
        timeout: Duration,
    },

    /// Response body was not a usable JSON-RPC reply.
    #[error("Invalid response from {chain_name}: {message}")]
    Decode {
        /// Chain being fetched
        chain_name: String,
        /// What was wrong with it
        message: String,
    },
}

impl FetchError {
    /// Name of the chain the failure belongs to.
    pub fn chain_name(&self) -> &str {
        match self {
            Self::Http { chain_name, .. }
            | Self::Transport { chain_name, .. }
            | Self::Rpc { chain_name, .. }
            | Self::Timeout { chain_name, .. }
            | Self::Decode { chain_name, .. } => chain_name,
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Http { .. } | Self::Transport { .. } => FetchErrorKind::Transport,
            Self::Rpc { .. } => FetchErrorKind::Rpc,
            Self::Timeout { .. } => FetchErrorKind::Timeout,
            Self::Decode { .. } => FetchErrorKind::Decode,
        }
    }
}

/// Errors raised while setting up a fetcher or engine.
#[derive(Debug, Error)]
pub enum PollerError {
    /// The proxy base URL could not be parsed.
    #[error("Invalid proxy URL '{url}': {reason}")]
    InvalidProxyUrl {
        /// The configured value
        url: String,
        /// Parser message
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The engine task panicked or was aborted.
    #[error("Engine task failed: {0}")]
    Join(String),
}

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
