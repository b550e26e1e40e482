//! CometBFT JSON-RPC client for Lava nodes.

use crate::error::ConfigError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lava_leaderboard_chain::{
    Block, ChainClient, ChainConnector, ChainError, ChainResult, Height,
};
use lava_leaderboard_telemetry::Metrics;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Turn a configured endpoint into the HTTP URL the client posts to.
///
/// CometBFT serves JSON-RPC over HTTP and websocket on the same port, so
/// `ws(s)://` endpoints are mapped to `http(s)://` and a trailing
/// `/websocket` path is dropped.
pub fn normalize_endpoint(endpoint: &str) -> Result<String, ConfigError> {
    let endpoint = endpoint.trim();
    let url = if let Some(rest) = endpoint.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = endpoint.strip_prefix("ws://") {
        format!("http://{rest}")
    } else if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
        endpoint.to_string()
    } else {
        return Err(ConfigError::InvalidEndpoint(endpoint.to_string()));
    };

    let url = url.trim_end_matches('/');
    Ok(url.strip_suffix("/websocket").unwrap_or(url).to_string())
}

/// CometBFT RPC client wrapper.
pub struct CometRpcClient {
    client: Client,
    rpc_url: String,
    metrics: Metrics,
}

impl CometRpcClient {
    /// Create a new RPC client.
    ///
    /// # Arguments
    /// * `endpoint` - Node RPC endpoint (http, https, ws or wss)
    /// * `timeout` - Per-request timeout
    /// * `metrics` - Metrics collector
    pub fn new(endpoint: &str, timeout: Duration, metrics: Metrics) -> ChainResult<Self> {
        let rpc_url =
            normalize_endpoint(endpoint).map_err(|e| ChainError::Transport(e.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        debug!("Initialized RPC client for {}", rpc_url);

        Ok(Self {
            client,
            rpc_url,
            metrics,
        })
    }

    async fn call_rpc(&self, method: &str, params: Value) -> ChainResult<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChainError::Status(response.status().as_u16()));
        }

        let mut result: Value = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(e.to_string()))?;

        if let Some(error) = result.get("error").filter(|e| !e.is_null()) {
            let code = error["code"].as_i64().unwrap_or_default();
            let message = match error["data"].as_str() {
                Some(data) if !data.is_empty() => data.to_string(),
                _ => error["message"].as_str().unwrap_or("unknown error").to_string(),
            };
            return Err(ChainError::Rpc { code, message });
        }

        Ok(result.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }
}

fn parse_height(value: &Value, field: &str) -> ChainResult<Height> {
    let raw = value
        .as_str()
        .ok_or_else(|| ChainError::InvalidResponse(format!("missing {field}")))?;
    raw.parse::<Height>()
        .map_err(|e| ChainError::InvalidResponse(format!("invalid {field} {raw:?}: {e}")))
}

/// Parse the `result` of a CometBFT `block` call.
fn parse_block(result: &Value, requested: Height) -> ChainResult<Block> {
    let block = &result["block"];
    if block.is_null() {
        return Err(ChainError::BlockNotFound(requested));
    }

    let height = parse_height(&block["header"]["height"], "block.header.height")?;
    let time = block["header"]["time"].as_str().map(str::to_string);

    let txs = match &block["data"]["txs"] {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let encoded = item.as_str().ok_or_else(|| {
                    ChainError::InvalidResponse(format!("tx {index} in block {height} is not a string"))
                })?;
                STANDARD.decode(encoded).map_err(|e| {
                    ChainError::InvalidResponse(format!("tx {index} in block {height}: {e}"))
                })
            })
            .collect::<ChainResult<Vec<_>>>()?,
        _ => {
            return Err(ChainError::InvalidResponse(
                "block.data.txs is not an array".to_string(),
            ))
        }
    };

    Ok(Block { height, time, txs })
}

#[async_trait]
impl ChainClient for CometRpcClient {
    async fn get_height(&self) -> ChainResult<Height> {
        let start = Instant::now();
        let result = self.call_rpc("status", json!({})).await;
        self.metrics
            .observe_rpc_latency("get_height", start.elapsed().as_secs_f64());

        let height = parse_height(
            &result?["sync_info"]["latest_block_height"],
            "sync_info.latest_block_height",
        )?;
        debug!("Latest block height: {}", height);
        Ok(height)
    }

    async fn get_block(&self, height: Height) -> ChainResult<Block> {
        let start = Instant::now();
        let result = self
            .call_rpc("block", json!({ "height": height.to_string() }))
            .await;
        self.metrics
            .observe_rpc_latency("get_block", start.elapsed().as_secs_f64());

        let block = parse_block(&result?, height)?;
        debug!("Fetched block {} with {} txs", block.height, block.txs.len());
        Ok(block)
    }
}

/// Opens `CometRpcClient`s.
#[derive(Clone)]
pub struct CometConnector {
    timeout: Duration,
    metrics: Metrics,
}

impl CometConnector {
    pub fn new(timeout: Duration, metrics: Metrics) -> Self {
        info!("RPC request timeout set to {:?}", timeout);
        Self { timeout, metrics }
    }
}

#[async_trait]
impl ChainConnector for CometConnector {
    async fn connect(&self, endpoint: &str) -> ChainResult<Box<dyn ChainClient>> {
        let client = CometRpcClient::new(endpoint, self.timeout, self.metrics.clone())?;
        Ok(Box::new(client))
    }
}
