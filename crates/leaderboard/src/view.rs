//! What the presentation layer shows: sync status and the ranking table.

use crate::aggregator::RankingEntry;
use serde::{Deserialize, Serialize};

/// Sync status shown next to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No height has been recorded yet.
    NotStarted,
    /// A block range is being fetched and decoded.
    Syncing,
    /// Waiting for the next new block.
    Idle,
}

/// Snapshot of the leaderboard for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardView {
    pub status: SyncStatus,
    /// Last recorded chain height, 0 before the first successful poll.
    pub height: u64,
    /// Number of blocks a single fetch keeps.
    pub window_capacity: usize,
    pub rows: Vec<RankingEntry>,
}

impl LeaderboardView {
    /// Text shown in place of the table when there are no rows.
    pub fn empty_message(&self) -> Option<String> {
        if !self.rows.is_empty() {
            return None;
        }
        Some(match self.status {
            SyncStatus::NotStarted => "Stargate activating...".to_string(),
            SyncStatus::Syncing => "Decoding block data".to_string(),
            SyncStatus::Idle => format!(
                "No MsgRelayPayment data found in the past {} blocks",
                self.window_capacity
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(status: SyncStatus, rows: Vec<RankingEntry>) -> LeaderboardView {
        LeaderboardView {
            status,
            height: 120,
            window_capacity: 50,
            rows,
        }
    }

    #[test]
    fn test_empty_messages() {
        assert_eq!(
            view(SyncStatus::NotStarted, vec![]).empty_message().as_deref(),
            Some("Stargate activating...")
        );
        assert_eq!(
            view(SyncStatus::Syncing, vec![]).empty_message().as_deref(),
            Some("Decoding block data")
        );
        assert_eq!(
            view(SyncStatus::Idle, vec![]).empty_message().as_deref(),
            Some("No MsgRelayPayment data found in the past 50 blocks")
        );
    }

    #[test]
    fn test_rows_suppress_message() {
        let rows = vec![RankingEntry {
            spec_id: "ETH1".to_string(),
            total: 8,
        }];
        assert_eq!(view(SyncStatus::Syncing, rows).empty_message(), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&SyncStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
    }
}
