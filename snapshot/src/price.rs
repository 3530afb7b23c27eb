use std::collections::HashMap;

use bounties_merkle_tree::Address;
use serde::Deserialize;

use crate::{error::SnapshotError, retry::with_backoff};

pub const DEFAULT_PRICE_URL: &str = "https://coins.llama.fi/prices/current";

/// Price lookup for the APR side metric. Nothing in the allocation math
/// depends on it.
pub struct PriceApi {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct PriceResponse {
    coins: HashMap<String, Coin>,
}

#[derive(Deserialize)]
struct Coin {
    price: f64,
}

impl PriceApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// USD price for `chain:token`.
    pub async fn get_price(&self, chain: &str, token: Address) -> Result<f64, SnapshotError> {
        let key = format!("{chain}:{token}");
        let url = format!("{}/{key}", self.url);
        let response: PriceResponse = with_backoff(|| async {
            Ok(self
                .client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?)
        })
        .await?;

        response
            .coins
            .get(&key)
            .map(|coin| coin.price)
            .ok_or_else(|| SnapshotError::Service(format!("no price for {key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_response_shape() {
        let json = r#"{
            "coins": {
                "ethereum:0xd533a949740bb3306d119cc777fa900ba034cd52": {
                    "decimals": 18,
                    "symbol": "CRV",
                    "price": 0.42,
                    "timestamp": 1700000000
                }
            }
        }"#;
        let response: PriceResponse = serde_json::from_str(json).unwrap();
        let coin = &response.coins["ethereum:0xd533a949740bb3306d119cc777fa900ba034cd52"];
        assert_eq!(coin.price, 0.42);
    }
}
