use bounties_allocation::{Proposal, Vote};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::info;

use crate::{error::SnapshotError, retry::with_backoff};

pub const DEFAULT_HUB_URL: &str = "https://hub.snapshot.org/graphql";

const VOTES_PAGE_SIZE: usize = 1000;

/// GraphQL client for the Snapshot hub: proposals and their votes.
pub struct SnapshotHub {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct ProposalData {
    proposal: Option<RawProposal>,
}

/// The hub nests the space as an object; flatten it into `Proposal`.
#[derive(Deserialize)]
struct RawProposal {
    id: String,
    created: i64,
    start: i64,
    end: i64,
    snapshot: String,
    choices: Vec<String>,
    space: SpaceRef,
}

#[derive(Deserialize)]
struct SpaceRef {
    id: String,
}

#[derive(Deserialize)]
struct VotesData {
    votes: Vec<Vote>,
}

impl SnapshotHub {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, SnapshotError> {
        let body = json!({ "query": query, "variables": variables });
        let response: GraphQlResponse<T> = with_backoff(|| async {
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

        if let Some(errors) = response.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(SnapshotError::Service(format!(
                "hub returned errors: {}",
                messages.join("; ")
            )));
        }
        response
            .data
            .ok_or_else(|| SnapshotError::Service("hub returned no data".to_string()))
    }

    pub async fn get_proposal(&self, id: &str) -> Result<Proposal, SnapshotError> {
        const QUERY: &str = r#"
            query ($id: String!) {
                proposal(id: $id) {
                    id created start end snapshot choices space { id }
                }
            }"#;
        let data: ProposalData = self.query(QUERY, json!({ "id": id })).await?;
        let raw = data
            .proposal
            .ok_or_else(|| SnapshotError::Service(format!("proposal {id} not found")))?;
        let snapshot = raw
            .snapshot
            .parse::<u64>()
            .map_err(|_| SnapshotError::Service(format!("bad snapshot block: {}", raw.snapshot)))?;
        Ok(Proposal {
            id: raw.id,
            created: raw.created,
            start: raw.start,
            end: raw.end,
            snapshot,
            choices: raw.choices,
            space: raw.space.id,
        })
    }

    /// The space's live scoring strategies, passed through verbatim to the
    /// scoring API.
    pub async fn get_strategies(&self, space: &str) -> Result<Value, SnapshotError> {
        const QUERY: &str = r#"
            query ($id: String!) {
                space(id: $id) { strategies { name network params } }
            }"#;
        let data: Value = self.query(QUERY, json!({ "id": space })).await?;
        data.pointer("/space/strategies")
            .cloned()
            .ok_or_else(|| SnapshotError::Service(format!("space {space} has no strategies")))
    }

    /// All votes on a proposal, paginated by `created` descending until a
    /// short page comes back.
    pub async fn get_votes(&self, proposal: &str, space: &str) -> Result<Vec<Vote>, SnapshotError> {
        const QUERY: &str = r#"
            query ($proposal: String!, $space: String!, $created: Int!) {
                votes(
                    first: 1000
                    where: { proposal: $proposal, space: $space, created_lt: $created }
                    orderBy: "created"
                    orderDirection: desc
                ) { voter choice vp created }
            }"#;

        let mut votes: Vec<Vote> = Vec::new();
        let mut cursor = i64::MAX;
        loop {
            let variables = json!({ "proposal": proposal, "space": space, "created": cursor });
            let data: VotesData = self.query(QUERY, variables).await?;
            let page_len = data.votes.len();
            if let Some(last) = data.votes.last() {
                cursor = last.created;
            }
            votes.extend(data.votes);
            if page_len < VOTES_PAGE_SIZE {
                break;
            }
        }
        info!("fetched {} votes for proposal {proposal}", votes.len());
        Ok(votes)
    }
}
