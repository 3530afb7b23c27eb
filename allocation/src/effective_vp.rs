use crate::vote::Vote;

/// Voting power a single vote contributes to choice `choice`: the voter's
/// raw vp scaled by the fraction of their weight points placed on that
/// choice. Zero when the voter did not weight the choice at all.
pub fn effective_vp(vote: &Vote, choice: u32) -> f64 {
    let weight = match vote.choice.get(&choice) {
        Some(weight) => *weight,
        None => return 0.0,
    };
    let weight_sum = vote.choice_weight_sum();
    if weight == 0.0 || weight_sum == 0.0 {
        return 0.0;
    }
    vote.vp * weight / weight_sum
}

/// Total effective voting power cast for `choice` across all votes.
pub fn total_effective_vp(votes: &[Vote], choice: u32) -> f64 {
    votes.iter().map(|vote| effective_vp(vote, choice)).sum()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bounties_merkle_tree::Address;

    use super::*;

    fn vote(vp: f64, choices: &[(u32, f64)]) -> Vote {
        Vote {
            voter: Address::ZERO,
            choice: choices.iter().copied().collect::<BTreeMap<_, _>>(),
            vp,
            created: 0,
        }
    }

    #[test]
    fn test_full_weight_on_one_choice() {
        let vote = vote(100.0, &[(1, 100.0)]);
        assert_eq!(effective_vp(&vote, 1), 100.0);
        assert_eq!(effective_vp(&vote, 2), 0.0);
    }

    #[test]
    fn test_split_weight() {
        // Weight points need not sum to 100; only the ratio matters.
        let even = vote(50.0, &[(1, 50.0), (2, 50.0)]);
        assert_eq!(effective_vp(&even, 1), 25.0);
        assert_eq!(effective_vp(&even, 2), 25.0);

        let uneven = vote(50.0, &[(1, 1.0), (2, 3.0)]);
        assert_eq!(effective_vp(&uneven, 1), 12.5);
        assert_eq!(effective_vp(&uneven, 2), 37.5);
    }

    #[test]
    fn test_zero_weight_sum_contributes_nothing() {
        let vote = vote(100.0, &[(1, 0.0)]);
        assert_eq!(effective_vp(&vote, 1), 0.0);
    }

    #[test]
    fn test_total_over_votes() {
        let votes = vec![
            vote(100.0, &[(1, 100.0)]),
            vote(50.0, &[(1, 50.0), (2, 50.0)]),
            vote(30.0, &[(2, 100.0)]),
        ];
        assert_eq!(total_effective_vp(&votes, 1), 125.0);
        assert_eq!(total_effective_vp(&votes, 2), 55.0);
    }
}
