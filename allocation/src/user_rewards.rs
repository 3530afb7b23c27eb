use std::collections::BTreeMap;

use bounties_merkle_tree::{Address, Amount};

use crate::delegation::Allocation;

/// Fold allocations into the flat per-user reward map the Merkle tree is
/// built from. Delegated shares fan out per delegator; direct amounts key by
/// the voter itself. A user reached through several allocations (a delegator
/// who is also a voter in another space's proposal, say) sums.
pub fn flatten(allocations: &[Allocation]) -> BTreeMap<Address, f64> {
    let mut rewards: BTreeMap<Address, f64> = BTreeMap::new();
    for allocation in allocations {
        match allocation {
            Allocation::Direct { voter, amount } => {
                *rewards.entry(*voter).or_insert(0.0) += amount;
            }
            Allocation::Delegated { shares, .. } => {
                for (delegator, amount) in shares {
                    *rewards.entry(*delegator).or_insert(0.0) += amount;
                }
            }
        }
    }
    rewards
}

/// Single quantization step from the float accumulation to fixed-point leaf
/// amounts. `Amount::from_tokens` applies the dust floor, and entries that
/// floor to zero are dropped so they never become leaves.
pub fn quantize(rewards: &BTreeMap<Address, f64>) -> BTreeMap<Address, Amount> {
    rewards
        .iter()
        .map(|(user, amount)| (*user, Amount::from_tokens(*amount)))
        .filter(|(_, amount)| !amount.is_zero())
        .collect()
}
