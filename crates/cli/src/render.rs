//! Terminal presentation of the leaderboard.

use lava_leaderboard_core::{LeaderboardView, SyncStatus};
use lava_leaderboard_ingestion::SyncObserver;
use lava_leaderboard_telemetry::snapshot::write_snapshot;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

const CHAIN_HEADER: &str = "Chain Name";
const RELAYS_HEADER: &str = "Number of Relays";

/// Render the leaderboard as a plain-text table.
pub fn render_table(view: &LeaderboardView) -> String {
    let status = match view.status {
        SyncStatus::NotStarted => "not started",
        SyncStatus::Syncing => "syncing",
        SyncStatus::Idle => "idle",
    };

    let totals: Vec<String> = view.rows.iter().map(|r| r.total.to_string()).collect();
    let message = view.empty_message();

    let mut left = CHAIN_HEADER.len();
    let mut right = RELAYS_HEADER.len();
    for (row, total) in view.rows.iter().zip(&totals) {
        left = left.max(row.spec_id.len());
        right = right.max(total.len());
    }
    if let Some(message) = &message {
        let needed = message.len().saturating_sub(left + 3);
        right = right.max(needed);
    }

    let rule = format!("+{}+{}+", "-".repeat(left + 2), "-".repeat(right + 2));
    let mut out = String::new();
    out.push_str(&format!(
        "Lavanet Chains Leaderboard (height {}, {})\n",
        view.height, status
    ));
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        "| {:<left$} | {:<right$} |\n",
        CHAIN_HEADER, RELAYS_HEADER
    ));
    out.push_str(&rule);
    out.push('\n');

    match message {
        Some(message) => {
            let width = left + right + 3;
            out.push_str(&format!("| {:<width$} |\n", message));
        }
        None => {
            for (row, total) in view.rows.iter().zip(&totals) {
                out.push_str(&format!("| {:<left$} | {:>right$} |\n", row.spec_id, total));
            }
        }
    }

    out.push_str(&rule);
    out
}

/// Prints the table on every update and a notice on every new block.
pub struct TerminalRenderer {
    snapshot_output_path: Option<PathBuf>,
}

impl TerminalRenderer {
    /// # Arguments
    /// * `snapshot_output_path` - Optional JSON-lines file receiving each finished leaderboard
    pub fn new(snapshot_output_path: Option<PathBuf>) -> Self {
        Self {
            snapshot_output_path,
        }
    }
}

impl SyncObserver for TerminalRenderer {
    fn on_new_block(&self, height: u64) {
        info!("New block mined: {}", height);
        println!("New block mined (#{height})");
    }

    fn on_leaderboard(&self, view: &LeaderboardView) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", render_table(view)) {
            warn!("Failed to render leaderboard: {}", e);
        }

        if view.status == SyncStatus::Idle {
            if let Err(e) = write_snapshot(self.snapshot_output_path.as_ref(), view) {
                warn!("Failed to write snapshot: {}", e);
            }
        }
    }
}
