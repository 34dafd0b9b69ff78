//! CLI command implementations.

pub mod chains;
pub mod snapshot;
pub mod watch;
