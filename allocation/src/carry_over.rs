use std::collections::{BTreeMap, HashMap};

use bounties_merkle_tree::{utils::serde_proof, Address, Amount};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One user's leaf from the previous round's persisted tree. Amounts arrive
/// in whatever shape the old serializer wrote (see `Amount`'s deserializer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousLeaf {
    pub index: u64,
    pub amount: Amount,
    #[serde(default, with = "serde_proof")]
    pub proof: Vec<[u8; 32]>,
}

/// Fold unclaimed balances from the previous round into the current reward
/// map. A user the oracle reports as claimed is settled and contributes
/// nothing; everyone else carries their full previous amount forward. This
/// is what makes the distribution rolling rather than a flat snapshot.
pub fn merge_carry_over(
    rewards: &mut BTreeMap<Address, f64>,
    previous: &BTreeMap<Address, PreviousLeaf>,
    claimed: &HashMap<Address, bool>,
) {
    let mut carried = 0usize;
    for (user, leaf) in previous {
        if claimed.get(user).copied().unwrap_or(false) {
            continue;
        }
        *rewards.entry(*user).or_insert(0.0) += leaf.amount.to_tokens();
        carried += 1;
    }
    info!(
        "carried over {carried} unclaimed balances of {} previous leaves",
        previous.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = seed;
        Address(bytes)
    }

    fn leaf(index: u64, tokens: f64) -> PreviousLeaf {
        PreviousLeaf {
            index,
            amount: Amount::from_tokens(tokens),
            proof: vec![],
        }
    }

    #[test]
    fn test_unclaimed_carries_exact_amount() {
        let mut rewards: BTreeMap<Address, f64> = [(addr(1), 10.0)].into_iter().collect();
        let previous: BTreeMap<Address, PreviousLeaf> =
            [(addr(1), leaf(0, 2.5)), (addr(2), leaf(1, 7.0))]
                .into_iter()
                .collect();

        merge_carry_over(&mut rewards, &previous, &HashMap::new());

        assert!((rewards[&addr(1)] - 12.5).abs() < 1e-9);
        // A user absent from the current round gets an entry created.
        assert!((rewards[&addr(2)] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_claimed_user_contributes_nothing() {
        let mut rewards: BTreeMap<Address, f64> = BTreeMap::new();
        let previous: BTreeMap<Address, PreviousLeaf> =
            [(addr(1), leaf(0, 2.5)), (addr(2), leaf(1, 7.0))]
                .into_iter()
                .collect();
        let claimed: HashMap<Address, bool> =
            [(addr(1), true), (addr(2), false)].into_iter().collect();

        merge_carry_over(&mut rewards, &previous, &claimed);

        assert!(!rewards.contains_key(&addr(1)));
        assert!((rewards[&addr(2)] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_previous_leaf_deserializes_bignumber_shape() {
        let json = r#"{
            "index": 3,
            "amount": { "type": "BigNumber", "hex": "0xde0b6b3a7640000" },
            "proof": ["0x0000000000000000000000000000000000000000000000000000000000000001"]
        }"#;
        let leaf: PreviousLeaf = serde_json::from_str(json).unwrap();
        assert_eq!(leaf.index, 3);
        assert_eq!(leaf.amount, Amount(1_000_000_000_000_000_000));
        assert_eq!(leaf.proof.len(), 1);
    }
}
