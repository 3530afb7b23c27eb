use bounties_merkle_verify::hashv;
use serde::{Deserialize, Serialize};

use crate::{address::Address, amount::Amount, utils::serde_opt_proof};

/// Represents the claim information for one account in a single-token
/// distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Address entitled to the claim
    pub claimant: Address,
    /// 0-based leaf position, assigned when the tree is built; the claim
    /// contract marks this index as spent
    pub index: u64,
    /// Fixed-point (18-decimal) amount the claimant can claim
    pub amount: Amount,
    /// Claimant's proof of inclusion in the Merkle Tree
    #[serde(default, with = "serde_opt_proof")]
    pub proof: Option<Vec<[u8; 32]>>,
}

impl TreeNode {
    /// keccak256 of the packed `(uint256 index, address claimant, uint256
    /// amount)` preimage, byte-for-byte what the claim contract hashes.
    pub fn hash(&self) -> [u8; 32] {
        let mut index_word = [0u8; 32];
        index_word[24..].copy_from_slice(&self.index.to_be_bytes());
        hashv(&[
            &index_word,
            self.claimant.as_bytes(),
            &self.amount.to_be_bytes32(),
        ])
    }

    /// Return amount for this claimant
    pub fn amount(&self) -> Amount {
        self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_tree_node() {
        let tree_node = TreeNode {
            claimant: Address::ZERO,
            index: 0,
            amount: Amount::ZERO,
            proof: None,
        };
        let serialized = serde_json::to_string(&tree_node).unwrap();
        let deserialized: TreeNode = serde_json::from_str(&serialized).unwrap();
        assert_eq!(tree_node, deserialized);
    }

    #[test]
    fn test_hash_covers_every_field() {
        let node = TreeNode {
            claimant: "0xd533a949740bb3306d119cc777fa900ba034cd52"
                .parse()
                .unwrap(),
            index: 1,
            amount: Amount(1_000_000_000_000_000_000),
            proof: None,
        };
        let base = node.hash();

        let mut other = node.clone();
        other.index = 2;
        assert_ne!(base, other.hash());

        let mut other = node.clone();
        other.amount = Amount(2);
        assert_ne!(base, other.hash());

        let mut other = node;
        other.claimant = Address::ZERO;
        assert_ne!(base, other.hash());
    }
}
