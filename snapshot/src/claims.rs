use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use bounties_merkle_tree::Address;
use bounties_merkle_verify::hash;
use serde::Deserialize;
use tracing::info;

use crate::{error::SnapshotError, retry::with_backoff, rpc::RpcClient};

/// Answers "has this user claimed since the last freeze". Mainnet-style
/// chains go through an indexed-log query service; the alternate chain reads
/// `isClaimed(token, index)` straight from the claim contract.
pub enum ClaimedOracle {
    IndexedLogs {
        index: LogIndexClient,
        merkle_contract: Address,
    },
    OnChain {
        rpc: RpcClient,
        merkle_contract: Address,
    },
}

/// SQL-over-HTTP client for an indexed-log service: one query returns the
/// claimant addresses of every Claimed event in a time window.
pub struct LogIndexClient {
    client: reqwest::Client,
    url: String,
    token: String,
}

#[derive(Deserialize)]
struct LogRows {
    rows: Vec<Vec<serde_json::Value>>,
}

impl LogIndexClient {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            token: token.into(),
        }
    }

    /// Claimants of `token` rewards on `contract` between the two freeze
    /// timestamps.
    async fn claimants_between(
        &self,
        contract: Address,
        token: Address,
        from_ts: i64,
        to_ts: i64,
    ) -> Result<HashSet<Address>, SnapshotError> {
        let query = format!(
            "SELECT input_0_value_address FROM evm_events_ethereum_mainnet \
             WHERE address = '{contract}' \
             AND signature = 'Claimed(address,uint256,uint256,address)' \
             AND input_1_value_address = '{token}' \
             AND timestamp BETWEEN {from_ts} AND {to_ts}",
        );
        let response: LogRows = with_backoff(|| async {
            Ok(self
                .client
                .post(&self.url)
                .header("Authorization", &self.token)
                .body(query.clone())
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?)
        })
        .await?;

        let mut claimants = HashSet::new();
        for row in &response.rows {
            if let Some(value) = row.first().and_then(|v| v.as_str()) {
                claimants.insert(Address::from_str(value)?);
            }
        }
        Ok(claimants)
    }
}

/// abi-encoded `isClaimed(address token, uint256 index)` call data.
fn is_claimed_call(token: Address, index: u64) -> Vec<u8> {
    let selector = &hash(b"isClaimed(address,uint256)")[..4];
    let mut data = Vec::with_capacity(4 + 64);
    data.extend_from_slice(selector);
    let mut token_word = [0u8; 32];
    token_word[12..].copy_from_slice(token.as_bytes());
    data.extend_from_slice(&token_word);
    let mut index_word = [0u8; 32];
    index_word[24..].copy_from_slice(&index.to_be_bytes());
    data.extend_from_slice(&index_word);
    data
}

impl ClaimedOracle {
    /// Claimed flag per previous-round leaf. `window` bounds the previous
    /// freeze/claim period and only matters for the log-index path; leaf
    /// indices only matter for the on-chain path.
    pub async fn claimed_status(
        &self,
        token: Address,
        leaves: &[(Address, u64)],
        window: (i64, i64),
    ) -> Result<HashMap<Address, bool>, SnapshotError> {
        if leaves.is_empty() {
            return Ok(HashMap::new());
        }
        let status: HashMap<Address, bool> = match self {
            ClaimedOracle::IndexedLogs {
                index,
                merkle_contract,
            } => {
                let claimed = index
                    .claimants_between(*merkle_contract, token, window.0, window.1)
                    .await?;
                leaves
                    .iter()
                    .map(|(user, _)| (*user, claimed.contains(user)))
                    .collect()
            }
            ClaimedOracle::OnChain {
                rpc,
                merkle_contract,
            } => {
                let mut status = HashMap::with_capacity(leaves.len());
                for (user, index) in leaves {
                    let data = is_claimed_call(token, *index);
                    let result = rpc.eth_call(*merkle_contract, &data).await?;
                    let claimed = result.last().copied().unwrap_or(0) != 0;
                    status.insert(*user, claimed);
                }
                status
            }
        };
        info!(
            "claimed status: {}/{} users claimed",
            status.values().filter(|c| **c).count(),
            status.len()
        );
        Ok(status)
    }
}
