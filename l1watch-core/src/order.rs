//! Stable display order for table rows.
//!
//! Rows are ranked once, on the first round that yields any block data,
//! and the ranking is then frozen so rows do not reshuffle on every poll.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::snapshot::ChainSnapshot;

/// Ordering over `blockchain_id`s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOrder {
    ids: Vec<String>,
    computed: bool,
}

/// Chains with fresh data first, by descending block number (ties by
/// name), then the rest alphabetically.
fn rank(a: &ChainSnapshot, b: &ChainSnapshot) -> Ordering {
    let key = |s: &ChainSnapshot| {
        if s.has_fresh_data() {
            s.block_number()
        } else {
            None
        }
    };

    match (key(a), key(b)) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.chain_name.cmp(&b.chain_name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.chain_name.cmp(&b.chain_name),
    }
}

/// Rank snapshots without freezing anything.
pub fn ranked(snapshots: &[ChainSnapshot]) -> Vec<&ChainSnapshot> {
    let mut rows: Vec<&ChainSnapshot> = snapshots.iter().collect();
    rows.sort_by(|a, b| rank(a, b));
    rows
}

impl DisplayOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the order has been frozen.
    pub fn is_computed(&self) -> bool {
        self.computed
    }

    /// Frozen ids, empty until computed.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Freeze the order if it is not frozen yet and some chain has data.
    ///
    /// Returns `true` when this call froze the order.
    pub fn compute_once(&mut self, snapshots: &[ChainSnapshot]) -> bool {
        if self.computed || !snapshots.iter().any(ChainSnapshot::has_fresh_data) {
            return false;
        }

        self.ids = ranked(snapshots)
            .into_iter()
            .map(|s| s.blockchain_id.clone())
            .collect();
        self.computed = true;
        true
    }

    /// Arrange snapshots for display.
    ///
    /// Once frozen, rows follow the stored order regardless of their
    /// current values; ids unknown to the frozen order are appended
    /// alphabetically. Before that, rows are ranked on the fly.
    pub fn apply(&self, snapshots: &[ChainSnapshot]) -> Vec<ChainSnapshot> {
        if !self.computed {
            return ranked(snapshots).into_iter().cloned().collect();
        }

        let by_id: HashMap<&str, &ChainSnapshot> = snapshots
            .iter()
            .map(|s| (s.blockchain_id.as_str(), s))
            .collect();

        let mut rows: Vec<ChainSnapshot> = self
            .ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|s| (*s).clone()))
            .collect();

        let known: HashSet<&str> = self.ids.iter().map(String::as_str).collect();
        let mut extra: Vec<ChainSnapshot> = snapshots
            .iter()
            .filter(|s| !known.contains(s.blockchain_id.as_str()))
            .cloned()
            .collect();
        extra.sort_by(|a, b| a.chain_name.cmp(&b.chain_name));
        rows.extend(extra);
        rows
    }
}
