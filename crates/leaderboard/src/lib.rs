//! Relay aggregation and ranking for the Lava relay leaderboard.

pub mod aggregator;
pub mod relay;
pub mod view;

pub use aggregator::{Aggregator, RankingEntry, DEFAULT_TOP_N};
pub use relay::RelaySession;
pub use view::{LeaderboardView, SyncStatus};
