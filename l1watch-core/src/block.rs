//! Latest-block payload and per-chain metrics derived from it.
//!
//! Blocks are kept exactly as the RPC returned them: every numeric
//! field stays a hex-encoded string and is decoded only when a metric
//! is computed from it.

use serde::{Deserialize, Serialize};

use crate::error::{L1WatchError, Result};

/// Default assumed block interval in seconds, used to turn per-block
/// counts into per-second rates.
pub const DEFAULT_BLOCK_TIME_SECS: f64 = 2.0;

/// A block as returned by `eth_getBlockByNumber("latest", true)`.
///
/// Only the fields the metrics need are modelled; anything else in the
/// payload is ignored. Transactions are opaque JSON objects since only
/// their count is consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub number: String,
    pub gas_used: String,
    pub gas_limit: String,
    #[serde(default = "zero_quantity")]
    pub size: String,
    pub timestamp: String,
    #[serde(default)]
    pub transactions: Vec<serde_json::Value>,
}

fn zero_quantity() -> String {
    "0x0".to_string()
}

/// Decode a `0x`-prefixed hex quantity.
///
/// An empty quantity (`"0x"`) decodes to zero, matching how some nodes
/// report empty fields.
pub fn parse_quantity(field: &'static str, value: &str) -> Result<u64> {
    let invalid = || L1WatchError::InvalidQuantity {
        field,
        value: value.to_string(),
    };

    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(invalid)?;

    if digits.is_empty() {
        return Ok(0);
    }

    u64::from_str_radix(digits, 16).map_err(|_| invalid())
}

impl Block {
    /// Block height.
    pub fn block_number(&self) -> Result<u64> {
        parse_quantity("number", &self.number)
    }

    /// Gas consumed by the block.
    pub fn gas_used_value(&self) -> Result<u64> {
        parse_quantity("gasUsed", &self.gas_used)
    }

    /// Gas limit of the block.
    pub fn gas_limit_value(&self) -> Result<u64> {
        parse_quantity("gasLimit", &self.gas_limit)
    }

    /// Block size in bytes.
    pub fn size_bytes(&self) -> Result<u64> {
        parse_quantity("size", &self.size)
    }

    /// Block timestamp in unix seconds.
    pub fn timestamp_secs(&self) -> Result<u64> {
        parse_quantity("timestamp", &self.timestamp)
    }

    /// Number of transactions included in the block.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

/// Ratio of gas used to gas limit. A zero limit yields zero utilization.
pub fn utilization(gas_used: u64, gas_limit: u64) -> f64 {
    if gas_limit == 0 {
        0.0
    } else {
        gas_used as f64 / gas_limit as f64
    }
}

/// Per-chain values shown on one table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainMetrics {
    pub block_number: u64,
    /// Transactions per second under the assumed block time.
    pub tps: f64,
    pub gas_used: u64,
    pub gas_limit: u64,
    /// `gas_used / gas_limit`, in `[0, 1]` for well-formed blocks.
    pub gas_utilization: f64,
    pub block_size: u64,
    pub transaction_count: usize,
    /// Block timestamp in unix seconds.
    pub timestamp: u64,
}

impl ChainMetrics {
    /// Derive row metrics from a block, assuming `block_time_secs` between blocks.
    pub fn from_block(block: &Block, block_time_secs: f64) -> Result<Self> {
        let gas_used = block.gas_used_value()?;
        let gas_limit = block.gas_limit_value()?;
        let transaction_count = block.transaction_count();

        Ok(Self {
            block_number: block.block_number()?,
            tps: per_second(transaction_count as f64, block_time_secs),
            gas_used,
            gas_limit,
            gas_utilization: utilization(gas_used, gas_limit),
            block_size: block.size_bytes()?,
            transaction_count,
            timestamp: block.timestamp_secs()?,
        })
    }

    /// Gas consumed per second under the assumed block time.
    pub fn gas_per_second(&self, block_time_secs: f64) -> f64 {
        per_second(self.gas_used as f64, block_time_secs)
    }
}

pub(crate) fn per_second(amount: f64, block_time_secs: f64) -> f64 {
    if block_time_secs > 0.0 {
        amount / block_time_secs
    } else {
        0.0
    }
}
