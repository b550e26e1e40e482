//! JSON-lines log of leaderboard snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

#[derive(Serialize)]
struct SnapshotRecord<'a, T: Serialize> {
    recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    payload: &'a T,
}

/// Append a timestamped snapshot as one JSON line.
///
/// Does nothing when `path` is `None`.
///
/// # Arguments
/// * `path` - Path to the snapshot file
/// * `payload` - Serializable payload to write
pub fn write_snapshot<P: AsRef<Path>, T: Serialize>(
    path: Option<P>,
    payload: &T,
) -> anyhow::Result<()> {
    if let Some(snapshot_path) = path {
        let record = SnapshotRecord {
            recorded_at: Utc::now(),
            payload,
        };
        let line = serde_json::to_string(&record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&snapshot_path)?;
        writeln!(file, "{}", line)?;
        debug!("Wrote snapshot to {:?}", snapshot_path.as_ref());
    }
    Ok(())
}
