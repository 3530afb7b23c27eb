use bounties_merkle_tree::Address;
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::vote::Vote;

/// One voter's final allocation: either the voter keeps its own rewards, or
/// (for the designated delegation voter) the rewards fan out to delegators.
/// An explicit variant, so downstream code never inspects an optional
/// sub-map to tell the cases apart.
#[derive(Debug, Clone, PartialEq)]
pub enum Allocation {
    Direct {
        voter: Address,
        amount: f64,
    },
    Delegated {
        voter: Address,
        shares: IndexMap<Address, f64>,
    },
}

/// Reduce each delegator's snapshot voting power by the vp of any direct
/// vote it cast in the same proposal, floored at zero. A delegator who
/// overrode the delegation by voting directly earns via its own vote only.
pub fn deduct_direct_votes(
    delegator_vp: &mut IndexMap<Address, f64>,
    votes: &[Vote],
) {
    for vote in votes {
        if let Some(vp) = delegator_vp.get_mut(&vote.voter) {
            *vp = (*vp - vote.vp).max(0.0);
        }
    }
}

/// Split the delegation voter's accumulated rewards across its delegators,
/// pro-rata to their remaining voting power. An empty or fully-deducted
/// delegator set yields an empty split (the delegation earned nothing to
/// pass on that can be attributed).
pub fn split_delegation(
    total_rewards: f64,
    delegator_vp: &IndexMap<Address, f64>,
) -> IndexMap<Address, f64> {
    let sum_vp: f64 = delegator_vp.values().sum();
    if sum_vp == 0.0 {
        warn!("delegator voting power sums to zero, nothing to split");
        return IndexMap::new();
    }

    let mut shares = IndexMap::with_capacity(delegator_vp.len());
    for (delegator, vp) in delegator_vp {
        if *vp > 0.0 {
            shares.insert(*delegator, total_rewards * vp / sum_vp);
        }
    }
    info!(
        "split {total_rewards} across {} delegators",
        shares.len()
    );
    shares
}

/// Yearly rate the delegation pool earned this period, as a percentage of
/// the delegation voter's voting power. The usd price cancels out of the
/// original formula, leaving rewards-per-vp annualized. Side metric only,
/// never a Merkle leaf.
pub fn delegation_apr(total_rewards: f64, periods_per_year: f64, delegation_vp: f64) -> f64 {
    if delegation_vp == 0.0 {
        return 0.0;
    }
    total_rewards * periods_per_year / delegation_vp * 100.0
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

    fn vote(voter: Address, vp: f64) -> Vote {
        Vote {
            voter,
            choice: BTreeMap::from([(1, 100.0)]),
            vp,
            created: 0,
        }
    }

    #[test]
    fn test_split_is_proportional_and_conserving() {
        let delegators: IndexMap<Address, f64> =
            [(addr(1), 300.0), (addr(2), 100.0), (addr(3), 600.0)]
                .into_iter()
                .collect();

        let shares = split_delegation(50.0, &delegators);

        assert!((shares[&addr(1)] - 15.0).abs() < 1e-9);
        assert!((shares[&addr(2)] - 5.0).abs() < 1e-9);
        assert!((shares[&addr(3)] - 30.0).abs() < 1e-9);
        let total: f64 = shares.values().sum();
        assert!((total - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_direct_voter_is_deducted_and_floored() {
        let mut delegators: IndexMap<Address, f64> =
            [(addr(1), 300.0), (addr(2), 100.0)].into_iter().collect();
        let votes = vec![vote(addr(1), 120.0), vote(addr(2), 500.0)];

        deduct_direct_votes(&mut delegators, &votes);

        assert_eq!(delegators[&addr(1)], 180.0);
        // Deduction floors at zero even when the direct vote was larger.
        assert_eq!(delegators[&addr(2)], 0.0);
    }

    #[test]
    fn test_deducted_delegator_earns_nothing_from_split() {
        let mut delegators: IndexMap<Address, f64> =
            [(addr(1), 100.0), (addr(2), 100.0)].into_iter().collect();
        deduct_direct_votes(&mut delegators, &[vote(addr(2), 100.0)]);

        let shares = split_delegation(40.0, &delegators);

        assert_eq!(shares.len(), 1);
        assert!((shares[&addr(1)] - 40.0).abs() < 1e-9);
        assert!(!shares.contains_key(&addr(2)));
    }

    #[test]
    fn test_zero_vp_split_is_empty() {
        let delegators: IndexMap<Address, f64> = [(addr(1), 0.0)].into_iter().collect();
        assert!(split_delegation(50.0, &delegators).is_empty());
    }

    #[test]
    fn test_apr() {
        // 10 tokens per period on 1000 vp, 26 periods a year: 26% APR.
        assert!((delegation_apr(10.0, 26.0, 1000.0) - 26.0).abs() < 1e-9);
        assert_eq!(delegation_apr(10.0, 26.0, 0.0), 0.0);
    }
}
