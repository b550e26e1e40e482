//! Relay session records.

use serde::{Deserialize, Serialize};

/// A record of relays served for one chain, taken from a relay payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySession {
    /// Service identifier, e.g. `ETH1` or `COS3`.
    pub spec_id: String,
    /// Number of relays in the session.
    pub relay_num: u64,
    /// Epoch the session was paid in.
    pub epoch: u64,
    /// Provider address that served the relays.
    pub provider: String,
    /// Compute units consumed.
    pub cu_sum: u64,
}

impl RelaySession {
    /// Create a session with only the fields the leaderboard ranks on.
    pub fn new(spec_id: impl Into<String>, relay_num: u64, epoch: u64) -> Self {
        Self {
            spec_id: spec_id.into(),
            relay_num,
            epoch,
            provider: String::new(),
            cu_sum: 0,
        }
    }
}
