//! Block sync and relay payment decoding for the Lava relay leaderboard.

pub mod block_fetcher;
pub mod codec;
pub mod config;
pub mod error;
pub mod rpc_client;
pub mod state;
pub mod sync_loop;
pub mod tx_decoder;

pub use block_fetcher::{BlockFetcher, BlockWindow};
pub use config::{DecodeFailureScope, IngestConfig};
pub use error::{ConfigError, DecodeError, SyncError};
pub use rpc_client::{CometConnector, CometRpcClient};
pub use state::AppState;
pub use sync_loop::{CycleOutcome, CycleSummary, NoopObserver, SyncController, SyncObserver};
pub use tx_decoder::{DecodedBatch, TxDecoder};
