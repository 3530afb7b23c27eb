use std::collections::BTreeMap;

use bounties_merkle_tree::Address;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::AllocationError, vote::Vote};

/// One account's standing gauge weights as read from the auto-voter
/// contract: the account delegated its vote casting, so no vote of its own
/// appears on the hub and a synthetic one is appended instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoVoterRecord {
    pub user: Address,
    pub gauges: Vec<Address>,
    pub weights: Vec<f64>,
}

impl AutoVoterRecord {
    /// Translate the on-chain record into a synthetic hub-shaped vote
    /// against the current proposal. Gauges absent from the proposal carry
    /// no weight this round; `None` when nothing the user weighted is up
    /// for vote.
    ///
    /// Mismatched array lengths mean the multicall read is corrupted, not a
    /// user with odd preferences, so that is fatal.
    pub fn synthetic_vote(
        &self,
        vp: f64,
        gauge_choices: &IndexMap<String, usize>,
        created: i64,
    ) -> Result<Option<Vote>, AllocationError> {
        if self.gauges.len() != self.weights.len() {
            return Err(AllocationError::DelegationInconsistency(format!(
                "user {} has {} gauges but {} weights",
                self.user,
                self.gauges.len(),
                self.weights.len()
            )));
        }

        let mut choice: BTreeMap<u32, f64> = BTreeMap::new();
        for (gauge, weight) in self.gauges.iter().zip(&self.weights) {
            if *weight == 0.0 {
                continue;
            }
            let gauge = gauge.to_string();
            let matched = gauge_choices
                .iter()
                .find(|(truncated, _)| gauge.contains(truncated.as_str()));
            if let Some((_, index)) = matched {
                *choice.entry(*index as u32).or_insert(0.0) += weight;
            } else {
                debug!("auto-voted gauge {gauge} is not in the proposal, skipping");
            }
        }

        if choice.is_empty() {
            return Ok(None);
        }
        Ok(Some(Vote {
            voter: self.user,
            choice,
            vp,
            created,
        }))
    }
}
