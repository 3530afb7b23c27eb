use bounties_merkle_tree::Address;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{error::SnapshotError, retry::with_backoff};

/// Minimal JSON-RPC client: just the calls the pipeline needs. Each
/// sub-chain gets its own instance.
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

fn parse_hex_u64(value: &Value) -> Result<u64, SnapshotError> {
    let s = value
        .as_str()
        .ok_or_else(|| SnapshotError::Rpc(format!("expected hex string, got {value}")))?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|_| SnapshotError::Rpc(format!("bad hex: {s}")))
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, SnapshotError> {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        let response: RpcResponse = with_backoff(|| async {
            Ok(self
                .client
                .post(&self.url)
                .json(&body)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?)
        })
        .await?;

        if let Some(error) = response.error {
            return Err(SnapshotError::Rpc(format!(
                "{method} failed ({}): {}",
                error.code, error.message
            )));
        }
        response
            .result
            .ok_or_else(|| SnapshotError::Rpc(format!("{method} returned no result")))
    }

    pub async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, SnapshotError> {
        let params = json!([
            { "to": to.to_string(), "data": format!("0x{}", hex::encode(data)) },
            "latest"
        ]);
        let result = self.call("eth_call", params).await?;
        let s = result
            .as_str()
            .ok_or_else(|| SnapshotError::Rpc("eth_call returned non-string".to_string()))?;
        let digits = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(digits).map_err(|_| SnapshotError::Rpc(format!("bad call data: {s}")))
    }

    pub async fn block_number(&self) -> Result<u64, SnapshotError> {
        let result = self.call("eth_blockNumber", json!([])).await?;
        parse_hex_u64(&result)
    }

    pub async fn block_timestamp(&self, number: u64) -> Result<i64, SnapshotError> {
        let params = json!([format!("0x{number:x}"), false]);
        let result = self.call("eth_getBlockByNumber", params).await?;
        let timestamp = result
            .get("timestamp")
            .ok_or_else(|| SnapshotError::Rpc(format!("block {number} has no timestamp")))?;
        Ok(parse_hex_u64(timestamp)? as i64)
    }

    /// Latest block at or before `timestamp`, by binary search over block
    /// numbers. Used to derive a sub-chain's block comparable to chain 1's
    /// snapshot block.
    pub async fn timestamp_to_block(&self, timestamp: i64) -> Result<u64, SnapshotError> {
        let mut low = 1u64;
        let mut high = self.block_number().await?;
        while low < high {
            let mid = (low + high + 1) / 2;
            let mid_ts = self.block_timestamp(mid).await?;
            debug!("timestamp_to_block probe: block {mid} at {mid_ts}");
            if mid_ts <= timestamp {
                low = mid;
            } else {
                high = mid - 1;
            }
        }
        Ok(low)
    }
}
