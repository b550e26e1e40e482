//! Prometheus metrics for the leaderboard sync loop.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

/// Metrics collector for the leaderboard service.
///
/// Each instance owns its registry, so several controllers (and tests)
/// can live in one process.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    blocks_fetched: IntCounter,
    transactions_decoded: IntCounter,
    relay_payments: IntCounter,
    relay_sessions: IntCounter,
    decode_errors: IntCounter,
    rpc_errors: IntCounter,
    sync_cycles: IntCounter,
    skipped_ticks: IntCounter,
    accumulated_relays: IntGauge,
    chain_height: IntGauge,
    rpc_latency: HistogramVec,
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let counter = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntGauge> {
    let gauge = IntGauge::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

impl Metrics {
    /// Create a new metrics instance.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let blocks_fetched = counter(
            &registry,
            "lava_leaderboard_blocks_fetched_total",
            "Total number of blocks fetched",
        )?;
        let transactions_decoded = counter(
            &registry,
            "lava_leaderboard_transactions_decoded_total",
            "Total number of transaction envelopes decoded",
        )?;
        let relay_payments = counter(
            &registry,
            "lava_leaderboard_relay_payments_total",
            "Total number of MsgRelayPayment messages decoded",
        )?;
        let relay_sessions = counter(
            &registry,
            "lava_leaderboard_relay_sessions_total",
            "Total number of relay sessions extracted",
        )?;
        let decode_errors = counter(
            &registry,
            "lava_leaderboard_decode_errors_total",
            "Total number of transaction decode failures",
        )?;
        let rpc_errors = counter(
            &registry,
            "lava_leaderboard_rpc_errors_total",
            "Total number of RPC errors",
        )?;
        let sync_cycles = counter(
            &registry,
            "lava_leaderboard_sync_cycles_total",
            "Total number of sync cycles that fetched blocks",
        )?;
        let skipped_ticks = counter(
            &registry,
            "lava_leaderboard_skipped_ticks_total",
            "Timer ticks skipped because a sync was in flight",
        )?;
        let accumulated_relays = gauge(
            &registry,
            "lava_leaderboard_accumulated_relay_sessions",
            "Relay sessions held in memory",
        )?;
        let chain_height = gauge(
            &registry,
            "lava_leaderboard_chain_height",
            "Last recorded chain height",
        )?;

        let rpc_latency = HistogramVec::new(
            HistogramOpts::new(
                "lava_leaderboard_rpc_latency_seconds",
                "RPC call latency in seconds",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(rpc_latency.clone()))?;

        Ok(Self {
            registry,
            blocks_fetched,
            transactions_decoded,
            relay_payments,
            relay_sessions,
            decode_errors,
            rpc_errors,
            sync_cycles,
            skipped_ticks,
            accumulated_relays,
            chain_height,
            rpc_latency,
        })
    }

    /// Increment the blocks fetched counter.
    pub fn inc_blocks_fetched(&self, count: u64) {
        self.blocks_fetched.inc_by(count);
    }

    /// Increment the decoded transactions counter.
    pub fn inc_transactions_decoded(&self, count: u64) {
        self.transactions_decoded.inc_by(count);
    }

    /// Increment the relay payment message counter.
    pub fn inc_relay_payments(&self, count: u64) {
        self.relay_payments.inc_by(count);
    }

    /// Increment the relay session counter.
    pub fn inc_relay_sessions(&self, count: u64) {
        self.relay_sessions.inc_by(count);
    }

    pub fn inc_decode_errors(&self) {
        self.decode_errors.inc();
    }

    /// Increment the RPC errors counter.
    pub fn inc_rpc_errors(&self) {
        self.rpc_errors.inc();
    }

    pub fn inc_sync_cycles(&self) {
        self.sync_cycles.inc();
    }

    pub fn inc_skipped_ticks(&self) {
        self.skipped_ticks.inc();
    }

    pub fn set_accumulated_relays(&self, count: usize) {
        self.accumulated_relays.set(count as i64);
    }

    pub fn set_chain_height(&self, height: u64) {
        self.chain_height.set(height as i64);
    }

    /// Record RPC latency.
    pub fn observe_rpc_latency(&self, operation: &str, duration_secs: f64) {
        self.rpc_latency.with_label_values(&[operation]).observe(duration_secs);
    }

    /// Get Prometheus metrics as a string.
    pub fn gather(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instances_do_not_collide() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.inc_blocks_fetched(3);
        second.inc_blocks_fetched(1);

        assert!(first.gather().unwrap().contains("lava_leaderboard_blocks_fetched_total 3"));
        assert!(second.gather().unwrap().contains("lava_leaderboard_blocks_fetched_total 1"));
    }

    #[test]
    fn test_latency_is_labelled() {
        let metrics = Metrics::new().unwrap();
        metrics.observe_rpc_latency("get_block", 0.25);
        let text = metrics.gather().unwrap();
        assert!(text.contains("lava_leaderboard_rpc_latency_seconds_count{operation=\"get_block\"} 1"));
    }
}
