//! Read-only view handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::metrics::{aggregate, highest_utilization, AggregateMetrics, AggregateOptions};
use crate::order::DisplayOrder;
use crate::snapshot::ChainSnapshot;

/// Everything a renderer needs, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub chains: Vec<ChainSnapshot>,
    /// `None` only when no chain is configured.
    pub aggregate: Option<AggregateMetrics>,
    /// `blockchain_id` of the live chain with the highest utilization.
    pub highlighted: Option<String>,
    /// True until the first round's placeholder rows are published.
    pub loading: bool,
    /// Number of rounds started so far.
    pub round: u64,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::initial()
    }
}

impl DashboardView {
    /// View published before the engine has produced anything.
    pub fn initial() -> Self {
        Self {
            chains: Vec::new(),
            aggregate: None,
            highlighted: None,
            loading: true,
            round: 0,
        }
    }

    /// Assemble a view from the current snapshot set.
    pub fn assemble(
        snapshots: &[ChainSnapshot],
        order: &DisplayOrder,
        options: &AggregateOptions,
        now_secs: u64,
        round: u64,
    ) -> Self {
        let chains = order.apply(snapshots);
        Self {
            aggregate: aggregate(&chains, options, now_secs),
            highlighted: highest_utilization(&chains, options, now_secs),
            chains,
            loading: false,
            round,
        }
    }

    /// Snapshot for one chain.
    pub fn chain(&self, blockchain_id: &str) -> Option<&ChainSnapshot> {
        self.chains.iter().find(|c| c.blockchain_id == blockchain_id)
    }

    /// Display order as a list of ids.
    pub fn order(&self) -> Vec<&str> {
        self.chains.iter().map(|c| c.blockchain_id.as_str()).collect()
    }
}
