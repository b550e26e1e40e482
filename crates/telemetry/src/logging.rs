//! Structured logging setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging with environment-based filtering.
///
/// Logs go to stderr as JSON; stdout is left for the leaderboard table.
///
/// # Arguments
/// * `log_level` - Optional filter override (e.g., "info", "lava_leaderboard_ingestion=debug")
pub fn init_logging(log_level: Option<&str>) -> anyhow::Result<()> {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
