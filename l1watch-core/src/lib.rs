//! # l1watch core
//!
//! **Pure data layer for multi-chain block telemetry**
//!
//! This crate holds everything that needs no network and no runtime:
//! the chain registry, the latest-block payload, per-chain snapshots,
//! derived metrics and the frozen display order.
//!
//! ## Features
//!
//! - **Deterministic**: registry filtering, ranking and aggregation are pure functions
//! - **Lazy decoding**: block quantities stay hex strings until a metric needs them
//! - **Whole-record updates**: snapshot transitions replace records, never patch them
//!
//! ## Quick Start
//!
//! ```rust
//! use l1watch_core::{aggregate, AggregateOptions, ChainRegistry};
//!
//! let registry = ChainRegistry::builtin();
//! for chain in registry.active_chains() {
//!     println!("{} -> {}", chain.chain_name, chain.rpc_url);
//! }
//!
//! // No snapshots at all: the totals are absent rather than zero
//! assert!(aggregate(&[], &AggregateOptions::default(), 0).is_none());
//! ```

pub mod block;
pub mod error;
pub mod metrics;
pub mod order;
pub mod registry;
pub mod snapshot;
pub mod view;

// Re-export main types for convenience
pub use block::{Block, ChainMetrics, DEFAULT_BLOCK_TIME_SECS};
pub use error::L1WatchError;
pub use metrics::{aggregate, highest_utilization, AggregateMetrics, AggregateOptions};
pub use order::DisplayOrder;
pub use registry::{active_chains, AllowPolicy, ChainDescriptor, ChainRegistry, RegistryEntry};
pub use snapshot::{ChainSnapshot, FailurePolicy};
pub use view::DashboardView;
