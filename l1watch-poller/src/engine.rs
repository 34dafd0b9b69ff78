//! Polling and reconciliation engine.
//!
//! [`PollingEngine`] owns the snapshot set. A round fires one fetch per
//! chain, applies each result as soon as it settles, and finishes only
//! when every fetch has settled. Every change is published as a fresh
//! immutable [`DashboardView`] on a watch channel; nothing else ever
//! writes the snapshots.
//!
//! [`PollingEngine::spawn`] runs rounds on an interval in a background
//! task and returns an [`EngineHandle`] for manual refreshes, view
//! subscriptions and shutdown.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use l1watch_core::{
    AggregateOptions, Block, ChainDescriptor, ChainSnapshot, DashboardView, DisplayOrder,
    FailurePolicy,
};

use crate::error::{FetchError, PollerError};
use crate::rpc::BlockSource;

/// Default time between scheduled rounds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Time between scheduled rounds.
    pub interval: Duration,
    /// Recency window and assumed block time for totals and highlighting.
    pub aggregate: AggregateOptions,
    /// What a failed fetch does to a previously fetched block.
    pub failure_policy: FailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            aggregate: AggregateOptions::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Outcome counts for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: u64,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// What a manual refresh request turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A round will start.
    Queued,
    /// A round is in flight or a refresh is already pending.
    Coalesced,
    /// The engine is no longer running.
    Stopped,
}

/// Single owner of the snapshot set.
pub struct PollingEngine<S> {
    source: Arc<S>,
    chains: Vec<ChainDescriptor>,
    /// Parallel to `chains`.
    snapshots: Vec<ChainSnapshot>,
    order: DisplayOrder,
    config: EngineConfig,
    round: u64,
    in_flight: Arc<AtomicBool>,
    view_tx: watch::Sender<Arc<DashboardView>>,
}

impl<S: BlockSource + 'static> PollingEngine<S> {
    /// Create an engine over the given chains.
    ///
    /// Chains sharing a `blockchain_id` with an earlier chain are dropped so
    /// that every id maps to exactly one snapshot.
    pub fn new(source: S, chains: Vec<ChainDescriptor>, config: EngineConfig) -> Self {
        let mut seen = HashSet::new();
        let chains: Vec<ChainDescriptor> = chains
            .into_iter()
            .filter(|c| {
                let fresh = seen.insert(c.blockchain_id.clone());
                if !fresh {
                    warn!("Ignoring duplicate chain id {} ({})", c.blockchain_id, c.chain_name);
                }
                fresh
            })
            .collect();

        let (view_tx, _) = watch::channel(Arc::new(DashboardView::initial()));

        Self {
            source: Arc::new(source),
            chains,
            snapshots: Vec::new(),
            order: DisplayOrder::new(),
            config,
            round: 0,
            in_flight: Arc::new(AtomicBool::new(false)),
            view_tx,
        }
    }

    /// Chains this engine polls.
    pub fn chains(&self) -> &[ChainDescriptor] {
        &self.chains
    }

    /// Latest published view.
    pub fn view(&self) -> Arc<DashboardView> {
        self.view_tx.borrow().clone()
    }

    /// Receiver that observes every published view.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardView>> {
        self.view_tx.subscribe()
    }

    /// Frozen or provisional display order.
    pub fn display_order(&self) -> &DisplayOrder {
        &self.order
    }

    /// Run one round over every chain.
    pub async fn run_round(&mut self) -> RoundSummary {
        let started = Instant::now();
        self.in_flight.store(true, Ordering::SeqCst);
        self.round += 1;

        if self.snapshots.len() != self.chains.len() {
            let now = Utc::now();
            self.snapshots = self
                .chains
                .iter()
                .map(|c| ChainSnapshot::loading(c, now))
                .collect();
        }
        // Placeholders on the first round, otherwise just the new round number
        self.publish();

        let mut pending: FuturesUnordered<_> = self
            .chains
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, chain)| {
                let source = Arc::clone(&self.source);
                async move {
                    let result = source.fetch_latest_block(&chain).await;
                    (index, result)
                }
            })
            .collect();

        let mut summary = RoundSummary {
            round: self.round,
            succeeded: 0,
            failed: 0,
            elapsed: Duration::ZERO,
        };

        while let Some((index, result)) = pending.next().await {
            match &result {
                Ok(_) => summary.succeeded += 1,
                Err(_) => summary.failed += 1,
            }
            self.apply(index, result);
        }

        if self.order.compute_once(&self.snapshots) {
            info!(
                "Display order fixed after round {}: {}",
                self.round,
                self.order.ids().join(", ")
            );
        }
        self.publish();

        summary.elapsed = started.elapsed();
        info!(
            "Round {} complete: {} ok, {} failed in {:?}",
            summary.round, summary.succeeded, summary.failed, summary.elapsed
        );

        self.in_flight.store(false, Ordering::SeqCst);
        summary
    }

    /// Replace one chain's record with the outcome of its fetch.
    fn apply(&mut self, index: usize, result: Result<Block, FetchError>) {
        let now = Utc::now();
        let previous = self.snapshots[index].clone();

        self.snapshots[index] = match result {
            Ok(block) => {
                debug!(chain = %previous.chain_name, number = %block.number, "fetched latest block");
                previous.succeeded(block, now)
            }
            Err(e) => {
                warn!("{}", e);
                previous.failed(e.to_string(), now, self.config.failure_policy)
            }
        };

        self.publish();
    }

    fn publish(&self) {
        let now_secs = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        let view = DashboardView::assemble(
            &self.snapshots,
            &self.order,
            &self.config.aggregate,
            now_secs,
            self.round,
        );
        self.view_tx.send_replace(Arc::new(view));
    }

    /// Run rounds in a background task: one immediately, then one per
    /// interval, plus any manual refreshes.
    pub fn spawn(self) -> EngineHandle {
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let view_rx = self.subscribe();
        let in_flight = Arc::clone(&self.in_flight);

        let task = tokio::spawn(self.run(refresh_rx, shutdown_rx));

        EngineHandle {
            refresh_tx,
            shutdown_tx,
            view_rx,
            in_flight,
            task,
        }
    }

    async fn run(mut self, mut refresh_rx: mpsc::Receiver<()>, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Polling {} chains every {:?}",
            self.chains.len(),
            self.config.interval
        );

        loop {
            let manual = tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => false,
                Some(()) = refresh_rx.recv() => true,
            };

            if manual {
                debug!("Manual refresh triggered round {}", self.round + 1);
            }

            {
                let round = self.run_round();
                tokio::pin!(round);
                loop {
                    tokio::select! {
                        _ = &mut round => break,
                        Some(()) = refresh_rx.recv() => {
                            debug!("Refresh requested during a round, coalesced");
                        }
                    }
                }
            }

            // Requests that raced with the end of the round
            while refresh_rx.try_recv().is_ok() {
                debug!("Refresh requested during a round, coalesced");
            }

            if *shutdown_rx.borrow() {
                break;
            }
        }

        info!("Polling stopped after {} rounds", self.round);
    }
}

/// Control surface for a spawned engine.
pub struct EngineHandle {
    refresh_tx: mpsc::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
    view_rx: watch::Receiver<Arc<DashboardView>>,
    in_flight: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Latest published view.
    pub fn view(&self) -> Arc<DashboardView> {
        self.view_rx.borrow().clone()
    }

    /// Receiver that observes every published view.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardView>> {
        self.view_rx.clone()
    }

    /// Whether a round is running right now.
    pub fn is_round_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Ask for an extra round outside the schedule.
    pub fn refresh(&self) -> RefreshOutcome {
        if self.is_round_in_flight() {
            return RefreshOutcome::Coalesced;
        }

        match self.refresh_tx.try_send(()) {
            Ok(()) => RefreshOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(())) => RefreshOutcome::Coalesced,
            Err(mpsc::error::TrySendError::Closed(())) => RefreshOutcome::Stopped,
        }
    }

    /// Stop scheduling rounds and wait for the task to exit. A round in
    /// flight finishes and its results are applied first.
    pub async fn shutdown(self) -> Result<(), PollerError> {
        let _ = self.shutdown_tx.send(true);
        self.task
            .await
            .map_err(|e| PollerError::Join(e.to_string()))
    }
}
