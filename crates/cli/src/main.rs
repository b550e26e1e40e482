//! CLI application for the Lava relay leaderboard.

mod render;
mod server;

use clap::{Args, Parser, Subcommand};
use lava_leaderboard_ingestion::{
    CometConnector, CycleOutcome, DecodeFailureScope, IngestConfig, NoopObserver, SyncController,
};
use lava_leaderboard_telemetry::{init_logging, Metrics};
use render::{render_table, TerminalRenderer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Endpoint variable used by earlier web deployments of the leaderboard.
const LEGACY_ENDPOINT_ENV: &str = "NEXT_PUBLIC_LAVA_WSS_URL";

#[derive(Parser)]
#[command(name = "lava-leaderboard")]
#[command(about = "Live leaderboard of Lava relay payments per chain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the chain and keep the leaderboard up to date
    Watch {
        #[command(flatten)]
        sync: SyncArgs,

        /// Bind address for /metrics and /leaderboard
        #[arg(long, default_value = "0.0.0.0:9090")]
        http_bind_address: String,

        /// Append each finished leaderboard to this JSON-lines file
        #[arg(long)]
        snapshot_output_path: Option<PathBuf>,
    },
    /// Sync once, print the leaderboard and exit
    Snapshot {
        #[command(flatten)]
        sync: SyncArgs,

        /// Print JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct SyncArgs {
    /// Lava node RPC endpoint (http, https, ws or wss)
    #[arg(long, env = "LAVA_RPC_URL")]
    rpc_url: Option<String>,

    /// Poll interval in seconds
    #[arg(
        long,
        env = "LAVA_POLL_INTERVAL_SECONDS",
        default_value = "5",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval_seconds: u64,

    /// Maximum blocks kept by one fetch
    #[arg(long, default_value = "50")]
    window_capacity: usize,

    /// Blocks fetched behind the tip on the first poll
    #[arg(long, default_value = "20")]
    initial_lookback: u64,

    /// Rows shown on the leaderboard
    #[arg(long, default_value = "10")]
    top_n: usize,

    /// Per-request RPC timeout in seconds
    #[arg(long, default_value = "30")]
    request_timeout_seconds: u64,

    /// What a malformed transaction costs: "block" or "transaction"
    #[arg(long, default_value = "block")]
    decode_failure_scope: DecodeFailureScope,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,
}

impl SyncArgs {
    fn ingest_config(&self) -> IngestConfig {
        let endpoint = self
            .rpc_url
            .clone()
            .or_else(|| std::env::var(LEGACY_ENDPOINT_ENV).ok());

        IngestConfig {
            endpoint,
            poll_interval: Duration::from_secs(self.poll_interval_seconds),
            window_capacity: self.window_capacity,
            initial_lookback: self.initial_lookback,
            top_n: self.top_n,
            decode_failure_scope: self.decode_failure_scope,
            ..IngestConfig::default()
        }
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            sync,
            http_bind_address,
            snapshot_output_path,
        } => {
            init_logging(sync.log_level.as_deref())?;
            run_watch(&sync, &http_bind_address, snapshot_output_path).await?;
        }
        Commands::Snapshot { sync, json } => {
            init_logging(sync.log_level.as_deref())?;
            run_snapshot(&sync, json).await?;
        }
    }

    Ok(())
}

async fn run_watch(
    sync: &SyncArgs,
    http_addr: &str,
    snapshot_output_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    info!("Starting Lava relay leaderboard");

    let config = sync.ingest_config();
    config.validate()?;

    let metrics = Metrics::new()?;
    let connector = Arc::new(CometConnector::new(sync.request_timeout(), metrics.clone()));
    let renderer = Arc::new(TerminalRenderer::new(snapshot_output_path));
    let controller = Arc::new(SyncController::new(config, connector, renderer, metrics));

    server::start_http_server(http_addr, controller.clone()).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sync_task = tokio::spawn(controller.clone().run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    let _ = shutdown_tx.send(true);
    sync_task.await?;

    Ok(())
}

async fn run_snapshot(sync: &SyncArgs, json: bool) -> anyhow::Result<()> {
    let config = sync.ingest_config();
    config.validate()?;

    let metrics = Metrics::new()?;
    let connector = Arc::new(CometConnector::new(sync.request_timeout(), metrics.clone()));
    let controller = SyncController::new(config, connector, Arc::new(NoopObserver), metrics);

    if let CycleOutcome::Failed = controller.tick().await {
        let state = controller.state().read().await;
        match state.errors.iter().last() {
            Some(e) => anyhow::bail!("sync failed: {}", e),
            None => anyhow::bail!("sync failed"),
        }
    }

    let view = controller.view().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", render_table(&view));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from([
            "lava-leaderboard",
            "snapshot",
            "--rpc-url",
            "wss://lava.example:443",
        ])
        .unwrap();

        let Commands::Snapshot { sync, json } = cli.command else {
            panic!("expected snapshot command");
        };
        assert!(!json);
        let config = sync.ingest_config();
        assert_eq!(config.endpoint.as_deref(), Some("wss://lava.example:443"));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.window_capacity, 50);
        assert_eq!(config.initial_lookback, 20);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.decode_failure_scope, DecodeFailureScope::Block);
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let parsed = Cli::try_parse_from([
            "lava-leaderboard",
            "watch",
            "--poll-interval-seconds",
            "0",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parses_decode_failure_scope() {
        let cli = Cli::try_parse_from([
            "lava-leaderboard",
            "watch",
            "--decode-failure-scope",
            "transaction",
        ])
        .unwrap();
        let Commands::Watch { sync, .. } = cli.command else {
            panic!("expected watch command");
        };
        assert_eq!(sync.decode_failure_scope, DecodeFailureScope::Transaction);
    }
}
