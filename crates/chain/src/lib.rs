//! Chain client interface for the Lava relay leaderboard.
//!
//! This crate provides the trait-based seam between the sync loop and
//! whatever talks to a Lava node. The ingestion crate ships a CometBFT
//! JSON-RPC implementation; tests plug in in-memory chains.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Represents a block height in the chain.
pub type Height = u64;

/// Error type for chain client operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("RPC request failed with status: {0}")]
    Status(u16),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Block not found: {0}")]
    BlockNotFound(Height),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for chain client operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// A block as seen by the leaderboard: its height and the raw bytes of
/// every transaction it carries, in block order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The block height.
    pub height: Height,
    /// Block time as reported by the node (RFC 3339), when available.
    pub time: Option<String>,
    /// Raw transaction bytes.
    pub txs: Vec<Vec<u8>>,
}

impl Block {
    /// Create a block with no timestamp.
    pub fn new(height: Height, txs: Vec<Vec<u8>>) -> Self {
        Self {
            height,
            time: None,
            txs,
        }
    }
}

/// Trait for a connected chain client.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Get the latest block height known to the node.
    async fn get_height(&self) -> ChainResult<Height>;

    /// Get the block at the given height.
    ///
    /// # Arguments
    /// * `height` - The block height
    ///
    /// # Returns
    /// The block, or `BlockNotFound` if the node does not have it.
    async fn get_block(&self, height: Height) -> ChainResult<Block>;
}

/// Trait for opening a client against an endpoint.
///
/// The sync loop connects once per operation rather than holding a
/// long-lived connection, so implementations should be cheap to call.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    /// Connect to the node at `endpoint`.
    async fn connect(&self, endpoint: &str) -> ChainResult<Box<dyn ChainClient>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedChain;

    #[async_trait]
    impl ChainClient for FixedChain {
        async fn get_height(&self) -> ChainResult<Height> {
            Ok(7)
        }

        async fn get_block(&self, height: Height) -> ChainResult<Block> {
            if height > 7 {
                return Err(ChainError::BlockNotFound(height));
            }
            Ok(Block::new(height, vec![vec![height as u8]]))
        }
    }

    #[tokio::test]
    async fn test_client_is_object_safe() {
        let client: Box<dyn ChainClient> = Box::new(FixedChain);
        assert_eq!(client.get_height().await.unwrap(), 7);
        assert_eq!(client.get_block(3).await.unwrap().txs, vec![vec![3u8]]);
        assert!(matches!(
            client.get_block(8).await,
            Err(ChainError::BlockNotFound(8))
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = ChainError::Rpc {
            code: -32603,
            message: "height 9 is not available".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error -32603: height 9 is not available");
        assert_eq!(ChainError::Status(502).to_string(), "RPC request failed with status: 502");
    }
}
