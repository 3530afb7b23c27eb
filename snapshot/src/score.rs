use std::collections::HashMap;
use std::str::FromStr;

use bounties_merkle_tree::Address;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::{error::SnapshotError, retry::with_backoff};

pub const DEFAULT_SCORE_URL: &str = "https://score.snapshot.org/api/scores";

/// The scoring API caps request size; stay under it.
const ADDRESS_CHUNK: usize = 150;

/// Client for the voting-power scoring API: given a space's strategies and a
/// snapshot block, score a list of addresses.
pub struct ScoreApi {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct ScoreResponse {
    result: ScoreResult,
}

#[derive(Deserialize)]
struct ScoreResult {
    /// One map per strategy; an address may appear in several of them.
    scores: Vec<HashMap<String, f64>>,
}

impl ScoreApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Voting power per address at `snapshot`. Sub-score maps are summed per
    /// address: a strategy that scores an address twice contributes both
    /// parts.
    pub async fn get_voting_power(
        &self,
        network: &str,
        snapshot: u64,
        strategies: &Value,
        space: &str,
        addresses: &[Address],
    ) -> Result<HashMap<Address, f64>, SnapshotError> {
        let mut scores: HashMap<Address, f64> = HashMap::with_capacity(addresses.len());
        for chunk in addresses.chunks(ADDRESS_CHUNK) {
            let body = json!({
                "params": {
                    "network": network,
                    "snapshot": snapshot,
                    "strategies": strategies,
                    "space": space,
                    "addresses": chunk,
                }
            });
            let response: ScoreResponse = with_backoff(|| async {
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

            for sub_scores in &response.result.scores {
                for (address, vp) in sub_scores {
                    let address = Address::from_str(address)?;
                    *scores.entry(address).or_insert(0.0) += vp;
                }
            }
        }
        info!("scored {} addresses", scores.len());
        Ok(scores)
    }
}
