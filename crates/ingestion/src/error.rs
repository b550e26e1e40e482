//! Error taxonomy for a sync cycle.

use lava_leaderboard_chain::{ChainError, Height};

/// Configuration problems detected before any network access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no RPC endpoint configured (set LAVA_RPC_URL)")]
    MissingEndpoint,
    #[error("unsupported RPC endpoint {0:?}: expected http(s):// or ws(s)://")]
    InvalidEndpoint(String),
}

/// A transaction that could not be decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed transaction envelope at index {index}: {source}")]
    Envelope {
        index: usize,
        #[source]
        source: prost::DecodeError,
    },
    #[error("malformed MsgRelayPayment in transaction {index}: {source}")]
    Payload {
        index: usize,
        #[source]
        source: prost::DecodeError,
    },
}

/// Everything that can go wrong during a sync cycle.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("network error: {0}")]
    Network(#[from] ChainError),
    #[error("decode error in block {height}: {source}")]
    Decode {
        height: Height,
        #[source]
        source: DecodeError,
    },
}

impl SyncError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Config(_) => "config",
            SyncError::Network(_) => "network",
            SyncError::Decode { .. } => "decode",
        }
    }
}
