//! Timer-driven sync: poll height, fetch new blocks, decode, aggregate.

use crate::block_fetcher::BlockFetcher;
use crate::config::IngestConfig;
use crate::error::SyncError;
use crate::state::AppState;
use crate::tx_decoder::TxDecoder;
use lava_leaderboard_chain::{Block, ChainConnector, Height};
use lava_leaderboard_core::LeaderboardView;
use lava_leaderboard_telemetry::Metrics;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Receives sync events for presentation.
pub trait SyncObserver: Send + Sync {
    /// A poll saw a height different from the recorded one.
    fn on_new_block(&self, height: Height) {
        let _ = height;
    }

    /// The leaderboard changed (sync started or finished).
    fn on_leaderboard(&self, view: &LeaderboardView) {
        let _ = view;
    }
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}

/// Idle/Syncing guard. Acquiring is a single compare-and-swap, so two
/// ticks can never both enter a cycle.
#[derive(Debug, Default)]
pub struct SyncGuard {
    busy: AtomicBool,
}

/// Held for the duration of a cycle; dropping it returns the guard to Idle.
#[derive(Debug)]
pub struct SyncPermit<'a> {
    guard: &'a SyncGuard,
}

impl SyncGuard {
    /// Move Idle -> Syncing, or return `None` if a cycle is in flight.
    pub fn try_acquire(&self) -> Option<SyncPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SyncPermit { guard: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for SyncPermit<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

/// Inclusive block range to fetch after observing `current`.
///
/// The first poll (nothing recorded yet) looks back `lookback` blocks;
/// later polls fetch from the last recorded height up to `current`.
pub fn plan_range(last: Height, current: Height, lookback: u64) -> (Height, Height) {
    if last == 0 {
        (current.saturating_sub(lookback), current)
    } else {
        (last, current)
    }
}

/// What a sync cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    /// Height recorded at the end of the cycle.
    pub height: Height,
    pub start: Height,
    pub end: Height,
    /// Blocks decoded (after dropping ones already ingested).
    pub blocks: usize,
    pub relays: usize,
    pub errors: usize,
    pub fetch_failed: bool,
}

/// Result of one timer tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was in flight; nothing was done.
    Skipped,
    /// The chain height matched the recorded one.
    Unchanged { height: Height },
    Synced(CycleSummary),
    /// Connecting or reading the height failed; the error was recorded.
    Failed,
    /// The controller was torn down while the cycle ran; results dropped.
    Discarded,
}

/// Owns the application state and runs sync cycles against it.
pub struct SyncController {
    config: IngestConfig,
    connector: Arc<dyn ChainConnector>,
    fetcher: BlockFetcher,
    decoder: TxDecoder,
    state: RwLock<AppState>,
    guard: SyncGuard,
    observer: Arc<dyn SyncObserver>,
    metrics: Metrics,
    torn_down: AtomicBool,
}

impl SyncController {
    /// Create a new sync controller.
    ///
    /// # Arguments
    /// * `config` - Ingestion settings
    /// * `connector` - Opens chain clients
    /// * `observer` - Presentation hooks
    /// * `metrics` - Metrics collector
    pub fn new(
        config: IngestConfig,
        connector: Arc<dyn ChainConnector>,
        observer: Arc<dyn SyncObserver>,
        metrics: Metrics,
    ) -> Self {
        let fetcher = BlockFetcher::new(
            connector.clone(),
            config.endpoint.clone(),
            config.window_capacity,
            metrics.clone(),
        );
        let decoder = TxDecoder::new(config.decode_failure_scope);
        let state = RwLock::new(AppState::new(config.top_n, config.error_log_capacity));

        Self {
            config,
            connector,
            fetcher,
            decoder,
            state,
            guard: SyncGuard::default(),
            observer,
            metrics,
            torn_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn state(&self) -> &RwLock<AppState> {
        &self.state
    }

    pub fn guard(&self) -> &SyncGuard {
        &self.guard
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Current leaderboard view.
    pub async fn view(&self) -> LeaderboardView {
        self.state.read().await.view(self.config.window_capacity)
    }

    /// Stop applying results. Cycles already in flight finish but change nothing.
    pub fn teardown(&self) {
        if !self.torn_down.swap(true, Ordering::AcqRel) {
            info!("Sync controller torn down");
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    /// Run one sync cycle.
    pub async fn tick(&self) -> CycleOutcome {
        let Some(_permit) = self.guard.try_acquire() else {
            debug!("Sync already in progress, skipping tick");
            self.metrics.inc_skipped_ticks();
            return CycleOutcome::Skipped;
        };

        let current = match self.poll_height().await {
            Ok(height) => height,
            Err(e) => {
                if !self.is_torn_down() {
                    let mut state = self.state.write().await;
                    self.record_error(&mut state, e);
                }
                return CycleOutcome::Failed;
            }
        };

        if self.is_torn_down() {
            return CycleOutcome::Discarded;
        }

        let last = self.state.read().await.last_height;
        if current == last {
            debug!("No new blocks, height: {}", current);
            return CycleOutcome::Unchanged { height: current };
        }

        self.state.write().await.syncing = true;
        info!("New block mined: {} (recorded {})", current, last);
        self.observer.on_new_block(current);
        self.notify().await;

        let (start, end) = plan_range(last, current, self.config.initial_lookback);
        let fetched = self.fetcher.fetch_range(start, end).await;

        if self.is_torn_down() {
            return CycleOutcome::Discarded;
        }

        let mut summary = CycleSummary {
            height: current,
            start,
            end,
            blocks: 0,
            relays: 0,
            errors: 0,
            fetch_failed: false,
        };
        let mut errors = Vec::new();

        let decoded = match fetched {
            Ok(window) => {
                let ingested = self.state.read().await.ingested_height;
                let fresh: Vec<&Block> = window
                    .iter()
                    .filter(|block| ingested.map_or(true, |h| block.height > h))
                    .collect();
                if fresh.len() < window.len() {
                    debug!("Skipping {} already ingested blocks", window.len() - fresh.len());
                }
                let newest = fresh.iter().map(|block| block.height).max();
                Some((newest, self.decoder.decode_blocks(fresh)))
            }
            Err(e) => {
                summary.fetch_failed = true;
                errors.push(e);
                None
            }
        };

        {
            let mut state = self.state.write().await;

            if let Some((newest, batch)) = decoded {
                self.metrics.inc_transactions_decoded(batch.transactions);
                self.metrics.inc_relay_payments(batch.relay_payments);
                self.metrics.inc_relay_sessions(batch.relays.len() as u64);

                summary.blocks = batch.blocks;
                summary.relays = batch.relays.len();
                state.aggregator.extend(batch.relays);
                if newest.is_some() {
                    state.ingested_height = newest.max(state.ingested_height);
                }
                errors.extend(
                    batch
                        .errors
                        .into_iter()
                        .map(|(height, source)| SyncError::Decode { height, source }),
                );
            }

            summary.errors = errors.len();
            for e in errors {
                self.record_error(&mut state, e);
            }

            state.syncing = false;
            state.last_height = current;
            self.metrics.set_accumulated_relays(state.relays().len());
        }

        self.metrics.set_chain_height(current);
        self.metrics.inc_sync_cycles();
        self.notify().await;

        info!(
            "Synced blocks {} to {}: {} blocks decoded, {} relay sessions, {} errors",
            summary.start, summary.end, summary.blocks, summary.relays, summary.errors
        );
        CycleOutcome::Synced(summary)
    }

    /// Tick every `poll_interval` until `shutdown` flips to true or its
    /// sender is dropped, then tear down.
    ///
    /// Each tick runs on its own task, so a slow cycle does not delay the
    /// timer; overlapping ticks are skipped by the guard.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let period = self.config.poll_interval.max(Duration::from_millis(1));
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Polling for new blocks every {:?}", period);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let controller = Arc::clone(&self);
                    tokio::spawn(async move {
                        controller.tick().await;
                    });
                }
                changed = shutdown.changed() => {
                    let stop = changed.is_err() || *shutdown.borrow();
                    if stop {
                        break;
                    }
                }
            }
        }

        self.teardown();
    }

    async fn poll_height(&self) -> Result<Height, SyncError> {
        let endpoint = self.config.endpoint()?;
        let client = self.connector.connect(endpoint).await?;
        Ok(client.get_height().await?)
    }

    async fn notify(&self) {
        let view = self.view().await;
        self.observer.on_leaderboard(&view);
    }

    fn record_error(&self, state: &mut AppState, error: SyncError) {
        match &error {
            SyncError::Network(_) => self.metrics.inc_rpc_errors(),
            SyncError::Decode { .. } => self.metrics.inc_decode_errors(),
            SyncError::Config(_) => {}
        }
        match &error {
            SyncError::Decode { .. } => warn!("Sync cycle {} error: {}", error.kind(), error),
            _ => error!("Sync cycle {} error: {}", error.kind(), error),
        }
        state.errors.push(error);
    }
}
