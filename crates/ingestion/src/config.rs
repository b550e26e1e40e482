//! Ingestion settings.

use crate::error::ConfigError;
use crate::rpc_client::normalize_endpoint;
use lava_leaderboard_core::DEFAULT_TOP_N;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Blocks kept by a single fetch.
pub const DEFAULT_WINDOW_CAPACITY: usize = 50;
/// Blocks fetched behind the tip on the first poll.
pub const DEFAULT_INITIAL_LOOKBACK: u64 = 20;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_ERROR_LOG_CAPACITY: usize = 100;

/// How much of a block is given up when a transaction fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeFailureScope {
    /// Stop decoding the rest of the block. Relays already read from
    /// earlier transactions in the block are kept.
    #[default]
    Block,
    /// Skip only the transaction that failed.
    Transaction,
}

impl FromStr for DecodeFailureScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "transaction" | "tx" => Ok(Self::Transaction),
            other => Err(format!("unknown decode failure scope: {other}")),
        }
    }
}

impl fmt::Display for DecodeFailureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => f.write_str("block"),
            Self::Transaction => f.write_str("transaction"),
        }
    }
}

/// Settings for the sync loop and its collaborators.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Node RPC endpoint. Operations that need it fail with
    /// `ConfigError::MissingEndpoint` when absent.
    pub endpoint: Option<String>,
    pub poll_interval: Duration,
    pub window_capacity: usize,
    pub initial_lookback: u64,
    pub top_n: usize,
    pub decode_failure_scope: DecodeFailureScope,
    pub error_log_capacity: usize,
}

impl IngestConfig {
    /// Create a config with defaults for everything but the endpoint.
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }

    /// The configured endpoint, if any.
    pub fn endpoint(&self) -> Result<&str, ConfigError> {
        match self.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => Ok(endpoint),
            _ => Err(ConfigError::MissingEndpoint),
        }
    }

    /// Check the endpoint is present and uses a supported scheme.
    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_endpoint(self.endpoint()?)?;
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            initial_lookback: DEFAULT_INITIAL_LOOKBACK,
            top_n: DEFAULT_TOP_N,
            decode_failure_scope: DecodeFailureScope::default(),
            error_log_capacity: DEFAULT_ERROR_LOG_CAPACITY,
        }
    }
}
