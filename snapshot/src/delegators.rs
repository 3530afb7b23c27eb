use std::{fs::File, io::BufReader, path::PathBuf};

use bounties_merkle_tree::Address;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{error::SnapshotError, retry::with_backoff};

pub const DEFAULT_SUBGRAPH_URL: &str = "https://subgrapher.snapshot.org/delegation/1";

const PAGE_SIZE: usize = 1000;

/// Where the delegation pool's member list comes from. The subgraph is the
/// canonical source; a pre-exported file (the cache path) is functionally
/// equivalent and selectable by configuration.
pub enum DelegatorSource {
    Subgraph(SubgraphDelegators),
    File(PathBuf),
}

pub struct SubgraphDelegators {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct DelegationsData {
    delegations: Vec<Delegation>,
}

#[derive(Deserialize)]
struct Delegation {
    id: String,
    delegator: Address,
}

impl SubgraphDelegators {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Page through `delegations(space, delegate, timestamp_lte)` by id
    /// cursor until a short page comes back.
    async fn get_all_delegators(
        &self,
        space: &str,
        delegate: Address,
        timestamp: i64,
    ) -> Result<Vec<Address>, SnapshotError> {
        const QUERY: &str = r#"
            query ($space: String!, $delegate: String!, $timestamp: Int!, $cursor: String!) {
                delegations(
                    first: 1000
                    where: { space: $space, delegate: $delegate, timestamp_lte: $timestamp, id_gt: $cursor }
                    orderBy: id
                    orderDirection: asc
                ) { id delegator }
            }"#;

        let mut delegators = Vec::new();
        let mut cursor = String::new();
        loop {
            let body = json!({
                "query": QUERY,
                "variables": {
                    "space": space,
                    "delegate": delegate.to_string(),
                    "timestamp": timestamp,
                    "cursor": cursor,
                }
            });
            let response: serde_json::Value = with_backoff(|| async {
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

            let data = response
                .get("data")
                .cloned()
                .ok_or_else(|| SnapshotError::Service("subgraph returned no data".to_string()))?;
            let page: DelegationsData = serde_json::from_value(data)?;

            let page_len = page.delegations.len();
            if let Some(last) = page.delegations.last() {
                cursor = last.id.clone();
            }
            delegators.extend(page.delegations.into_iter().map(|d| d.delegator));
            if page_len < PAGE_SIZE {
                break;
            }
        }
        Ok(delegators)
    }
}

impl DelegatorSource {
    pub async fn get_all_delegators(
        &self,
        space: &str,
        delegate: Address,
        timestamp: i64,
    ) -> Result<Vec<Address>, SnapshotError> {
        let delegators = match self {
            DelegatorSource::Subgraph(subgraph) => {
                subgraph.get_all_delegators(space, delegate, timestamp).await?
            }
            DelegatorSource::File(path) => {
                let reader = BufReader::new(File::open(path)?);
                serde_json::from_reader::<_, Vec<Address>>(reader)?
            }
        };
        info!("{} delegators for {space} delegate {delegate}", delegators.len());
        Ok(delegators)
    }
}
