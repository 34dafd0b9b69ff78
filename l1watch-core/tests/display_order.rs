//! Display order freezing: once computed, later values never reorder rows.

use chrono::Utc;
use l1watch_core::{Block, ChainSnapshot, DisplayOrder};
use proptest::prelude::*;

fn snapshot(index: usize, number: Option<u64>) -> ChainSnapshot {
    ChainSnapshot {
        chain_name: format!("chain-{:02}", index),
        blockchain_id: index.to_string(),
        block_data: number.map(|n| Block {
            number: format!("0x{:x}", n),
            gas_used: "0x0".to_string(),
            gas_limit: "0x0".to_string(),
            size: "0x0".to_string(),
            timestamp: "0x0".to_string(),
            transactions: vec![],
        }),
        loading: false,
        error: number.is_none().then(|| "unreachable".to_string()),
        last_updated: Utc::now(),
    }
}

fn round(values: &[Option<u64>]) -> Vec<ChainSnapshot> {
    values
        .iter()
        .enumerate()
        .map(|(i, n)| snapshot(i, *n))
        .collect()
}

fn ids(rows: &[ChainSnapshot]) -> Vec<String> {
    rows.iter().map(|s| s.blockchain_id.clone()).collect()
}

#[test]
fn test_three_chain_scenario() {
    let snaps = vec![
        ChainSnapshot {
            chain_name: "failed".to_string(),
            ..snapshot(0, None)
        },
        ChainSnapshot {
            chain_name: "hundred".to_string(),
            ..snapshot(1, Some(100))
        },
        ChainSnapshot {
            chain_name: "two-fifty".to_string(),
            ..snapshot(2, Some(250))
        },
    ];

    let mut order = DisplayOrder::new();
    assert!(order.compute_once(&snaps));
    let names: Vec<_> = order
        .apply(&snaps)
        .into_iter()
        .map(|s| s.chain_name)
        .collect();
    assert_eq!(names, ["two-fifty", "hundred", "failed"]);
}

proptest! {
    #[test]
    fn prop_order_frozen_after_first_data(
        first in proptest::collection::vec(proptest::option::weighted(0.8, 0u64..1_000_000), 1..12),
        later in proptest::collection::vec(proptest::collection::vec(proptest::option::of(0u64..1_000_000), 12), 1..6),
    ) {
        let first_round = round(&first);
        let mut order = DisplayOrder::new();
        let froze = order.compute_once(&first_round);
        prop_assume!(froze);

        let frozen = ids(&order.apply(&first_round));

        for values in later {
            let next = round(&values[..first.len()]);
            prop_assert!(!order.compute_once(&next));
            prop_assert_eq!(ids(&order.apply(&next)), frozen.clone());
        }
    }
}
