//! Observability for the Lava relay leaderboard.

pub mod logging;
pub mod metrics;
pub mod snapshot;

pub use logging::init_logging;
pub use metrics::Metrics;
