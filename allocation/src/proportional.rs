use bounties_merkle_tree::Address;
use indexmap::IndexMap;
use tracing::warn;

use crate::{
    bribes::ResolvedBribe,
    effective_vp::{effective_vp, total_effective_vp},
    vote::Vote,
};

/// Running per-voter state across the gauges of one proposal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoterRewards {
    /// Raw voting power the voter cast in the proposal
    pub vp: f64,
    /// Rewards accumulated across all bribed gauges, in human token units
    pub total_rewards: f64,
}

/// Distribute every bribed gauge's reward across its voters, pro-rata to
/// effective voting power. Float accumulation throughout; quantization to
/// fixed point happens once, at the leaf boundary.
///
/// A gauge nobody voted for is a no-op distribution: without the guard the
/// share division would produce non-finite values.
pub fn allocate(
    votes: &[Vote],
    bribes: &IndexMap<String, ResolvedBribe>,
) -> IndexMap<Address, VoterRewards> {
    let mut rewards: IndexMap<Address, VoterRewards> = votes
        .iter()
        .map(|vote| {
            (
                vote.voter,
                VoterRewards {
                    vp: vote.vp,
                    total_rewards: 0.0,
                },
            )
        })
        .collect();

    for (gauge, bribe) in bribes {
        let total_vp = total_effective_vp(votes, bribe.choice);
        if total_vp == 0.0 {
            warn!("no votes for bribed gauge {gauge}, skipping its reward");
            continue;
        }
        for vote in votes {
            let vp = effective_vp(vote, bribe.choice);
            if vp > 0.0 {
                rewards[&vote.voter].total_rewards += bribe.amount * vp / total_vp;
            }
        }
    }
    rewards
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn addr(seed: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = seed;
        Address(bytes)
    }

    fn vote(voter: Address, vp: f64, choices: &[(u32, f64)]) -> Vote {
        Vote {
            voter,
            choice: choices.iter().copied().collect::<BTreeMap<_, _>>(),
            vp,
            created: 0,
        }
    }

    fn bribes(entries: &[(&str, u32, f64)]) -> IndexMap<String, ResolvedBribe> {
        entries
            .iter()
            .map(|(gauge, choice, amount)| {
                (
                    gauge.to_string(),
                    ResolvedBribe {
                        choice: *choice,
                        amount: *amount,
                    },
                )
            })
            .collect()
    }

    // The worked two-gauge scenario: voter3 is the delegation voter and its
    // share is re-split downstream.
    #[test]
    fn test_two_gauge_allocation() {
        let votes = vec![
            vote(addr(1), 100.0, &[(1, 100.0)]),
            vote(addr(2), 50.0, &[(1, 50.0), (2, 50.0)]),
            vote(addr(3), 30.0, &[(2, 100.0)]),
        ];
        let bribes = bribes(&[("0xaaaa", 1, 100.0), ("0xbbbb", 2, 50.0)]);

        let rewards = allocate(&votes, &bribes);

        assert!((rewards[&addr(1)].total_rewards - 80.0).abs() < 1e-9);
        assert!((rewards[&addr(2)].total_rewards - (20.0 + 50.0 * 25.0 / 55.0)).abs() < 1e-9);
        assert!((rewards[&addr(3)].total_rewards - 50.0 * 30.0 / 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_conservation_per_gauge() {
        let votes = vec![
            vote(addr(1), 123.4, &[(1, 70.0), (2, 30.0)]),
            vote(addr(2), 7.7, &[(1, 1.0)]),
            vote(addr(3), 900.1, &[(1, 10.0), (2, 90.0)]),
        ];
        let bribes = bribes(&[("0xaaaa", 1, 1000.0), ("0xbbbb", 2, 777.7)]);

        let rewards = allocate(&votes, &bribes);
        let distributed: f64 = rewards.values().map(|r| r.total_rewards).sum();

        let expected = 1000.0 + 777.7;
        assert!((distributed - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn test_unvoted_gauge_is_skipped() {
        let votes = vec![vote(addr(1), 100.0, &[(1, 100.0)])];
        let bribes = bribes(&[("0xaaaa", 1, 100.0), ("0xbbbb", 2, 50.0)]);

        let rewards = allocate(&votes, &bribes);

        // The choice-2 bribe has no voters; only the choice-1 reward flows.
        assert_eq!(rewards[&addr(1)].total_rewards, 100.0);
        assert!(rewards[&addr(1)].total_rewards.is_finite());
    }
}
