//! Application state owned by the sync controller.

use crate::error::SyncError;
use lava_leaderboard_chain::Height;
use lava_leaderboard_core::{Aggregator, LeaderboardView, RankingEntry, RelaySession, SyncStatus};
use std::collections::VecDeque;

/// Bounded log of cycle errors, oldest dropped first.
#[derive(Debug)]
pub struct ErrorLog {
    entries: VecDeque<SyncError>,
    capacity: usize,
    total: u64,
}

impl ErrorLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            total: 0,
        }
    }

    pub fn push(&mut self, error: SyncError) {
        self.total += 1;
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(error);
    }

    /// Retained errors, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SyncError> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Errors recorded since startup, including dropped ones.
    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Everything the leaderboard knows.
#[derive(Debug)]
pub struct AppState {
    /// Last chain height seen by a poll; 0 until the first successful poll.
    pub last_height: Height,
    /// Highest block whose transactions have been decoded.
    pub ingested_height: Option<Height>,
    pub syncing: bool,
    pub aggregator: Aggregator,
    pub errors: ErrorLog,
}

impl AppState {
    pub fn new(top_n: usize, error_log_capacity: usize) -> Self {
        Self {
            last_height: 0,
            ingested_height: None,
            syncing: false,
            aggregator: Aggregator::new(top_n),
            errors: ErrorLog::new(error_log_capacity),
        }
    }

    pub fn status(&self) -> SyncStatus {
        if self.syncing {
            SyncStatus::Syncing
        } else if self.last_height == 0 {
            SyncStatus::NotStarted
        } else {
            SyncStatus::Idle
        }
    }

    pub fn ranking(&self) -> &[RankingEntry] {
        self.aggregator.ranking()
    }

    pub fn relays(&self) -> &[RelaySession] {
        self.aggregator.relays()
    }

    /// Build the view shown to users.
    pub fn view(&self, window_capacity: usize) -> LeaderboardView {
        LeaderboardView {
            status: self.status(),
            height: self.last_height,
            window_capacity,
            rows: self.ranking().to_vec(),
        }
    }
}
