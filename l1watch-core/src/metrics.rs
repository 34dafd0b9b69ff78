//! Cross-chain summary statistics.
//!
//! Only chains that look live contribute: their latest fetch succeeded and
//! their block is newer than the recency window. Stale chains stay in the
//! table but are left out of the totals.

use serde::{Deserialize, Serialize};

use crate::block::{per_second, ChainMetrics, DEFAULT_BLOCK_TIME_SECS};
use crate::snapshot::ChainSnapshot;

/// Default recency window: one hour.
pub const DEFAULT_WINDOW_SECS: u64 = 3600;

/// Parameters shared by aggregation and row highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateOptions {
    /// Blocks older than this many seconds are considered stale.
    pub window_secs: u64,
    /// Assumed interval between blocks.
    pub block_time_secs: f64,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
            block_time_secs: DEFAULT_BLOCK_TIME_SECS,
        }
    }
}

/// Totals across live chains.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total_tps: f64,
    pub total_gas_per_second: f64,
    /// Mean of per-chain `gas_used / gas_limit`. A chain with a zero gas
    /// limit contributes `0.0`.
    pub average_utilization: f64,
    /// Number of chains that contributed.
    pub included_chains: usize,
}

/// Row metrics for a snapshot if it counts as live at `now_secs`.
pub fn live_metrics(
    snapshot: &ChainSnapshot,
    options: &AggregateOptions,
    now_secs: u64,
) -> Option<ChainMetrics> {
    if !snapshot.has_fresh_data() {
        return None;
    }

    let metrics = snapshot.metrics(options.block_time_secs)?;
    let cutoff = now_secs.saturating_sub(options.window_secs);
    (metrics.timestamp > cutoff).then_some(metrics)
}

/// Summarize the snapshot set.
///
/// Returns `None` only when there are no snapshots at all. An empty live
/// set yields all-zero totals.
pub fn aggregate(
    snapshots: &[ChainSnapshot],
    options: &AggregateOptions,
    now_secs: u64,
) -> Option<AggregateMetrics> {
    if snapshots.is_empty() {
        return None;
    }

    let live: Vec<ChainMetrics> = snapshots
        .iter()
        .filter_map(|s| live_metrics(s, options, now_secs))
        .collect();

    if live.is_empty() {
        return Some(AggregateMetrics::default());
    }

    let total_tps = live.iter().map(|m| m.tps).sum();
    let total_gas: f64 = live.iter().map(|m| m.gas_used as f64).sum();
    let utilization_sum: f64 = live.iter().map(|m| m.gas_utilization).sum();

    Some(AggregateMetrics {
        total_tps,
        total_gas_per_second: per_second(total_gas, options.block_time_secs),
        average_utilization: utilization_sum / live.len() as f64,
        included_chains: live.len(),
    })
}

/// The live chain with the highest gas utilization. The first one wins on ties.
pub fn highest_utilization(
    snapshots: &[ChainSnapshot],
    options: &AggregateOptions,
    now_secs: u64,
) -> Option<String> {
    let mut best: Option<(&ChainSnapshot, f64)> = None;

    for snapshot in snapshots {
        let Some(metrics) = live_metrics(snapshot, options, now_secs) else {
            continue;
        };
        if best.map_or(true, |(_, u)| metrics.gas_utilization > u) {
            best = Some((snapshot, metrics.gas_utilization));
        }
    }

    best.map(|(s, _)| s.blockchain_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use chrono::Utc;

    const NOW: u64 = 1_700_000_000;

    fn snapshot(id: &str, gas_used: u64, gas_limit: u64, txs: usize, ts: u64) -> ChainSnapshot {
        ChainSnapshot {
            chain_name: format!("chain-{}", id),
            blockchain_id: id.to_string(),
            block_data: Some(Block {
                number: "0x1".to_string(),
                gas_used: format!("0x{:x}", gas_used),
                gas_limit: format!("0x{:x}", gas_limit),
                size: "0x0".to_string(),
                timestamp: format!("0x{:x}", ts),
                transactions: vec![serde_json::Value::Null; txs],
            }),
            loading: false,
            error: None,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_no_snapshots_is_absent() {
        assert_eq!(aggregate(&[], &AggregateOptions::default(), NOW), None);
    }

    #[test]
    fn test_no_live_chains_is_zero() {
        let stale = snapshot("1", 10, 20, 4, NOW - 7200);
        let agg = aggregate(&[stale], &AggregateOptions::default(), NOW).unwrap();
        assert_eq!(agg, AggregateMetrics::default());
    }

    #[test]
    fn test_totals() {
        let snaps = vec![
            snapshot("1", 50, 100, 4, NOW - 5),
            snapshot("2", 100, 100, 2, NOW - 10),
        ];
        let agg = aggregate(&snaps, &AggregateOptions::default(), NOW).unwrap();
        assert!((agg.total_tps - 3.0).abs() < 1e-9);
        assert!((agg.total_gas_per_second - 75.0).abs() < 1e-9);
        assert!((agg.average_utilization - 0.75).abs() < 1e-9);
        assert_eq!(agg.included_chains, 2);
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let at_cutoff = snapshot("1", 1, 2, 1, NOW - DEFAULT_WINDOW_SECS);
        let agg = aggregate(&[at_cutoff], &AggregateOptions::default(), NOW).unwrap();
        assert_eq!(agg.included_chains, 0);
    }

    #[test]
    fn test_errored_and_loading_chains_excluded() {
        let mut errored = snapshot("1", 1, 2, 1, NOW);
        errored.error = Some("down".to_string());
        let mut loading = snapshot("2", 1, 2, 1, NOW);
        loading.loading = true;

        let agg = aggregate(&[errored, loading], &AggregateOptions::default(), NOW).unwrap();
        assert_eq!(agg.included_chains, 0);
    }

    #[test]
    fn test_highest_utilization() {
        let snaps = vec![
            snapshot("1", 10, 100, 0, NOW),
            snapshot("2", 90, 100, 0, NOW),
            snapshot("3", 99, 100, 0, NOW - 7200),
        ];
        assert_eq!(
            highest_utilization(&snaps, &AggregateOptions::default(), NOW),
            Some("2".to_string())
        );
        assert_eq!(highest_utilization(&[], &AggregateOptions::default(), NOW), None);
    }
}
