pub mod autovoter;
pub mod bribes;
pub mod carry_over;
pub mod delegation;
pub mod effective_vp;
pub mod error;
pub mod gauge_choices;
pub mod proportional;
pub mod spaces;
pub mod user_rewards;
pub mod vote;

pub use delegation::Allocation;
pub use error::AllocationError;
pub use spaces::{space_config, SpaceConfig};
pub use vote::{Proposal, Vote};

// The worked two-gauge round, end to end: choice parsing, bribe resolution,
// allocation, delegation fan-out, carry-over and the final tree.
#[cfg(test)]
mod pipeline_tests {
    use std::collections::{BTreeMap, HashMap};

    use bounties_merkle_tree::{Address, Amount, DistributionMerkleTree};
    use indexmap::IndexMap;

    use crate::{
        bribes::resolve_bribes,
        carry_over::{merge_carry_over, PreviousLeaf},
        delegation::{deduct_direct_votes, split_delegation},
        gauge_choices::{gauge_choice_map, ChoiceRule, UnmatchedChoicePolicy},
        proportional::allocate,
        user_rewards::{flatten, quantize},
        Allocation, Vote,
    };

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

    #[test]
    fn test_full_round() {
        let delegation = addr(3);
        let choices = vec![
            "Gauge - 0xaAaAaAaaAaAaAaaAaAAAAAAAAaaaAaAaAaaAaaAa…1111".to_string(),
            "Gauge - 0xBBBBbbbbBBbbbBbbBbbbbBBbBBbBBbbBBbBbBbbb…2222".to_string(),
        ];
        let votes = vec![
            vote(addr(1), 100.0, &[(1, 100.0)]),
            vote(addr(2), 50.0, &[(1, 50.0), (2, 50.0)]),
            vote(delegation, 30.0, &[(2, 100.0)]),
        ];

        let gauge_choices =
            gauge_choice_map(&choices, ChoiceRule::Truncated, UnmatchedChoicePolicy::Skip)
                .unwrap();
        let rewards = vec![
            ("0xaAaAaAaaAaAaAaaAaAAAAAAAAaaaAaAaAaaAaaAa".to_string(), 100.0),
            ("0xBBBBbbbbBBbbbBbbBbbbbBBbBBbBBbbBBbBbBbbb".to_string(), 50.0),
        ];
        let resolved = resolve_bribes(&gauge_choices, &rewards).unwrap();
        let voter_rewards = allocate(&votes, &resolved);

        // gauge1 vp: 100 + 25 = 125; gauge2 vp: 25 + 30 = 55
        assert!((voter_rewards[&addr(1)].total_rewards - 80.0).abs() < 1e-9);
        let delegation_total = voter_rewards[&delegation].total_rewards;
        assert!((delegation_total - 50.0 * 30.0 / 55.0).abs() < 1e-9);

        // Delegators 10 and 11; delegator 11 also voted directly in another
        // round's proposal with nothing here, so no deduction applies.
        let mut delegator_vp: IndexMap<Address, f64> =
            [(addr(10), 600.0), (addr(11), 200.0)].into_iter().collect();
        deduct_direct_votes(&mut delegator_vp, &votes);
        let shares = split_delegation(delegation_total, &delegator_vp);
        let fanned: f64 = shares.values().sum();
        assert!((fanned - delegation_total).abs() < 1e-9);

        let allocations: Vec<Allocation> = voter_rewards
            .iter()
            .map(|(voter, state)| {
                if *voter == delegation {
                    Allocation::Delegated {
                        voter: *voter,
                        shares: shares.clone(),
                    }
                } else {
                    Allocation::Direct {
                        voter: *voter,
                        amount: state.total_rewards,
                    }
                }
            })
            .collect();
        let mut rewards_map = flatten(&allocations);

        // Previous round: addr(1) claimed, addr(20) did not.
        let previous: BTreeMap<Address, PreviousLeaf> = [
            (
                addr(1),
                PreviousLeaf {
                    index: 0,
                    amount: Amount::from_tokens(5.0),
                    proof: vec![],
                },
            ),
            (
                addr(20),
                PreviousLeaf {
                    index: 1,
                    amount: Amount::from_tokens(3.0),
                    proof: vec![],
                },
            ),
        ]
        .into_iter()
        .collect();
        let claimed: HashMap<Address, bool> = [(addr(1), true)].into_iter().collect();
        merge_carry_over(&mut rewards_map, &previous, &claimed);

        let total: f64 = rewards_map.values().sum();
        assert!((total - (150.0 + 3.0)).abs() < 1e-6);

        let tree = DistributionMerkleTree::from_user_rewards(&quantize(&rewards_map)).unwrap();
        assert!(tree.verify_proof().is_ok());
        // addr(1): 80 earned, claimed carry-over contributes nothing
        let node = tree.get_node(&addr(1)).unwrap();
        assert_eq!(node.amount, Amount::from_tokens(80.0));
        // addr(20): pure carry-over entry
        let node = tree.get_node(&addr(20)).unwrap();
        assert_eq!(node.amount, Amount::from_tokens(3.0));
        // the delegation voter itself holds no leaf
        assert!(tree.get_node(&delegation).is_none());
    }
}
