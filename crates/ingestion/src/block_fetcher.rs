//! Fetching contiguous block ranges into a bounded window.

use crate::error::{ConfigError, SyncError};
use lava_leaderboard_chain::{Block, ChainConnector, Height};
use lava_leaderboard_telemetry::Metrics;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

/// Fixed-capacity list of blocks. Pushing past capacity drops the oldest.
#[derive(Debug, Clone)]
pub struct BlockWindow {
    blocks: VecDeque<Block>,
    capacity: usize,
}

impl BlockWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            blocks: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append a block, returning the evicted one when the window was full.
    pub fn push(&mut self, block: Block) -> Option<Block> {
        if self.capacity == 0 {
            return Some(block);
        }
        self.blocks.push_back(block);
        if self.blocks.len() > self.capacity {
            self.blocks.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Blocks from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks.into()
    }
}

/// Retrieves block ranges from the configured node.
pub struct BlockFetcher {
    connector: Arc<dyn ChainConnector>,
    endpoint: Option<String>,
    capacity: usize,
    metrics: Metrics,
}

impl BlockFetcher {
    /// Create a new block fetcher.
    ///
    /// # Arguments
    /// * `connector` - Opens a client for each fetch
    /// * `endpoint` - Node endpoint; `None` makes every fetch fail
    /// * `capacity` - Window size
    /// * `metrics` - Metrics collector
    pub fn new(
        connector: Arc<dyn ChainConnector>,
        endpoint: Option<String>,
        capacity: usize,
        metrics: Metrics,
    ) -> Self {
        Self {
            connector,
            endpoint,
            capacity,
            metrics,
        }
    }

    /// Fetch every block in `[start, end]`, oldest first.
    ///
    /// Any failed block fetch discards the whole range. Only the newest
    /// `capacity` blocks are returned.
    pub async fn fetch_range(&self, start: Height, end: Height) -> Result<BlockWindow, SyncError> {
        let endpoint = match self.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => endpoint,
            _ => return Err(ConfigError::MissingEndpoint.into()),
        };

        let mut window = BlockWindow::new(self.capacity);
        if start > end {
            debug!("Empty block range {}..={}", start, end);
            return Ok(window);
        }

        let client = self.connector.connect(endpoint).await?;
        info!("Fetching blocks from {} to {}", start, end);

        for height in start..=end {
            let block = client.get_block(height).await?;
            self.metrics.inc_blocks_fetched(1);
            if let Some(evicted) = window.push(block) {
                debug!("Window full, evicted block {}", evicted.height);
            }
        }

        Ok(window)
    }
}
