//! Error types for the l1watch core library.
//!
//! This module defines the errors that can occur while decoding
//! block quantities and loading chain configuration.

use thiserror::Error;

/// Errors that can occur in l1watch core operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum L1WatchError {
    /// A block field was not a valid `0x`-prefixed hex quantity.
    #[error("Invalid hex quantity in field '{field}': '{value}'")]
    InvalidQuantity {
        /// Name of the block field being decoded
        field: &'static str,
        /// The raw value received from the RPC
        value: String,
    },

    /// A registry entry is missing something the poller needs.
    #[error("Chain '{chain}' is not pollable: {reason}")]
    ChainNotPollable {
        /// Chain name from the registry
        chain: String,
        /// What is missing
        reason: String,
    },

    /// Configuration or persistence error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for l1watch core operations.
pub type Result<T> = std::result::Result<T, L1WatchError>;
