//! Per-chain snapshot records.
//!
//! A [`ChainSnapshot`] is never edited field by field: every transition
//! below consumes the previous record and returns its replacement, so a
//! reader holding an older copy always sees a complete record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::block::{Block, ChainMetrics};
use crate::registry::ChainDescriptor;

/// What happens to a previously fetched block when a later fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep showing the last block that was fetched successfully.
    #[default]
    PreserveLastKnownGood,
    /// Drop the block so the row shows only the error.
    ClearData,
}

/// Latest known state of one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain_name: String,
    pub blockchain_id: String,
    pub block_data: Option<Block>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl ChainSnapshot {
    /// Placeholder row shown before the first fetch completes.
    pub fn loading(descriptor: &ChainDescriptor, now: DateTime<Utc>) -> Self {
        Self {
            chain_name: descriptor.chain_name.clone(),
            blockchain_id: descriptor.blockchain_id.clone(),
            block_data: None,
            loading: true,
            error: None,
            last_updated: now,
        }
    }

    /// Replacement record after a successful fetch.
    pub fn succeeded(self, block: Block, now: DateTime<Utc>) -> Self {
        Self {
            block_data: Some(block),
            loading: false,
            error: None,
            last_updated: self.last_updated.max(now),
            ..self
        }
    }

    /// Replacement record after a failed fetch.
    pub fn failed(self, message: String, now: DateTime<Utc>, policy: FailurePolicy) -> Self {
        let block_data = match policy {
            FailurePolicy::PreserveLastKnownGood => self.block_data,
            FailurePolicy::ClearData => None,
        };

        Self {
            block_data,
            loading: false,
            error: Some(message),
            last_updated: self.last_updated.max(now),
            chain_name: self.chain_name,
            blockchain_id: self.blockchain_id,
        }
    }

    /// The latest fetch succeeded and its block is on the record.
    pub fn has_fresh_data(&self) -> bool {
        self.block_data.is_some() && !self.loading && self.error.is_none()
    }

    /// Block height of the held block, if any and well-formed.
    pub fn block_number(&self) -> Option<u64> {
        self.block_data.as_ref().and_then(|b| b.block_number().ok())
    }

    /// Row metrics for the held block. `None` while loading, without a
    /// block, or when the block carries malformed quantities.
    pub fn metrics(&self, block_time_secs: f64) -> Option<ChainMetrics> {
        self.block_data
            .as_ref()
            .and_then(|b| ChainMetrics::from_block(b, block_time_secs).ok())
    }
}
