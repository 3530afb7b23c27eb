use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Write},
    path::Path,
    str::FromStr,
};

use bounties_merkle_verify::{hash, hashv};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    address::Address,
    amount::Amount,
    error::{MerkleTreeError, MerkleTreeError::MerkleValidationError},
    merkle_tree::MerkleTree,
    utils::{get_proof, serde_hash, serde_proof},
};

use crate::distribution_tree::Result;

/// One (user, token, amount) claim, the unit the multi-token tree is built
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimEntry {
    pub user: Address,
    pub token: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaim {
    pub amount: Amount,
    #[serde(with = "serde_proof")]
    pub proof: Vec<[u8; 32]>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserClaims {
    pub tokens: BTreeMap<String, TokenClaim>,
}

/// Multi-token distribution tree: one leaf per (user, token) pair, persisted
/// as `{ merkleRoot, claims: { user: { tokens: { token: { amount, proof } } } } }`
/// with EIP-55 checksummed addresses as map keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UniversalMerkleTree {
    #[serde(with = "serde_hash")]
    pub merkle_root: [u8; 32],
    pub claims: BTreeMap<String, UserClaims>,
}

impl Default for UniversalMerkleTree {
    fn default() -> Self {
        Self {
            merkle_root: [0u8; 32],
            claims: BTreeMap::new(),
        }
    }
}

/// Double-hashed leaf over the abi.encoded `(address user, address token,
/// uint256 amount)` words; the outer hash is what the on-chain verifier
/// receives, the double hashing rules out second-preimage games between
/// leaves and interior nodes.
pub fn claim_leaf(user: &Address, token: &Address, amount: Amount) -> [u8; 32] {
    let mut words = [0u8; 96];
    words[12..32].copy_from_slice(user.as_bytes());
    words[44..64].copy_from_slice(token.as_bytes());
    words[64..96].copy_from_slice(&amount.to_be_bytes32());
    hash(&hashv(&[&words]))
}

impl UniversalMerkleTree {
    /// Build a tree from raw claim entries. Entries that collide on
    /// (user, token) after checksum normalization are merged by summing
    /// amounts; leaf order is the sorted (user, token) order.
    pub fn new(entries: Vec<ClaimEntry>) -> Result<Self> {
        let mut combined: BTreeMap<(Address, Address), Amount> = BTreeMap::new();
        for entry in entries {
            if entry.amount.is_zero() {
                continue;
            }
            let slot = combined
                .entry((entry.user, entry.token))
                .or_insert(Amount::ZERO);
            *slot = slot
                .checked_add(entry.amount)
                .ok_or(MerkleTreeError::AmountOverflow)?;
        }

        if combined.is_empty() {
            return Ok(Self::default());
        }

        let hashed_leaves: Vec<[u8; 32]> = combined
            .iter()
            .map(|((user, token), amount)| claim_leaf(user, token, *amount))
            .collect();
        let tree = MerkleTree::new(&hashed_leaves);
        let merkle_root = tree.get_root().ok_or(MerkleTreeError::MerkleRootError)?;

        let mut claims: BTreeMap<String, UserClaims> = BTreeMap::new();
        for (i, ((user, token), amount)) in combined.iter().enumerate() {
            let proof = get_proof(&tree, i)?;
            claims
                .entry(user.checksum())
                .or_default()
                .tokens
                .insert(token.checksum(), TokenClaim { amount: *amount, proof });
        }

        info!(
            "created universal merkle tree with {} leaves across {} users",
            hashed_leaves.len(),
            claims.len()
        );
        Ok(Self { merkle_root, claims })
    }

    /// Merge two trees: union the (user, token) pairs, sum overlapping
    /// amounts, then rebuild leaves, order and proofs from scratch. Proofs
    /// from either input are invalid against the merged tree.
    pub fn merge(a: &Self, b: &Self) -> Result<Self> {
        let mut entries = a.entries()?;
        entries.extend(b.entries()?);
        Self::new(entries)
    }

    /// Flatten back to raw entries, parsing the checksummed keys.
    pub fn entries(&self) -> Result<Vec<ClaimEntry>> {
        let mut out = Vec::new();
        for (user, user_claims) in &self.claims {
            let user = Address::from_str(user).map_err(MerkleTreeError::AddressError)?;
            for (token, claim) in &user_claims.tokens {
                let token = Address::from_str(token).map_err(MerkleTreeError::AddressError)?;
                out.push(ClaimEntry {
                    user,
                    token,
                    amount: claim.amount,
                });
            }
        }
        Ok(out)
    }

    /// Re-verify every stored proof against the stored root. Walks the
    /// stored maps directly: persisted files from older tooling carry
    /// lowercase keys, which parse fine but would miss a checksummed lookup.
    pub fn verify_proof(&self) -> Result<()> {
        for (user_key, user_claims) in &self.claims {
            let user = Address::from_str(user_key).map_err(MerkleTreeError::AddressError)?;
            for (token_key, claim) in &user_claims.tokens {
                let token = Address::from_str(token_key).map_err(MerkleTreeError::AddressError)?;
                let leaf = claim_leaf(&user, &token, claim.amount);
                if !bounties_merkle_verify::verify(claim.proof.clone(), self.merkle_root, leaf) {
                    return Err(MerkleValidationError(format!(
                        "invalid merkle proof for user {user} token {token}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn new_from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let tree: UniversalMerkleTree = serde_json::from_reader(reader)?;
        Ok(tree)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self)?;
        let mut file = File::create(path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0] = seed;
        bytes[19] = seed;
        Address(bytes)
    }

    fn entry(user: u8, token: u8, amount: u128) -> ClaimEntry {
        ClaimEntry {
            user: addr(user),
            token: addr(token),
            amount: Amount(amount),
        }
    }

    #[test]
    fn test_new_tree_verifies() {
        let tree = UniversalMerkleTree::new(vec![
            entry(1, 100, 10),
            entry(2, 100, 20),
            entry(2, 101, 5),
        ])
        .unwrap();
        assert_eq!(tree.claims.len(), 2);
        assert!(tree.verify_proof().is_ok());
    }

    #[test]
    fn test_colliding_entries_are_summed() {
        let tree =
            UniversalMerkleTree::new(vec![entry(1, 100, 10), entry(1, 100, 15)]).unwrap();
        let user_claims = &tree.claims[&addr(1).checksum()];
        assert_eq!(user_claims.tokens[&addr(100).checksum()].amount, Amount(25));
    }

    #[test]
    fn test_merge_with_empty_is_idempotent() {
        let tree = UniversalMerkleTree::new(vec![entry(1, 100, 10), entry(2, 100, 20)]).unwrap();
        let merged = UniversalMerkleTree::merge(&tree, &UniversalMerkleTree::default()).unwrap();

        assert_eq!(merged.merkle_root, tree.merkle_root);
        assert_eq!(merged.claims, tree.claims);
    }

    #[test]
    fn test_merge_disjoint_and_overlapping() {
        let a = UniversalMerkleTree::new(vec![entry(1, 100, 10), entry(2, 100, 20)]).unwrap();
        let b = UniversalMerkleTree::new(vec![entry(2, 100, 5), entry(3, 101, 7)]).unwrap();

        let merged = UniversalMerkleTree::merge(&a, &b).unwrap();

        // disjoint addresses keep their single-tree values
        assert_eq!(
            merged.claims[&addr(1).checksum()].tokens[&addr(100).checksum()].amount,
            Amount(10)
        );
        assert_eq!(
            merged.claims[&addr(3).checksum()].tokens[&addr(101).checksum()].amount,
            Amount(7)
        );
        // overlapping (user, token) amounts sum exactly
        assert_eq!(
            merged.claims[&addr(2).checksum()].tokens[&addr(100).checksum()].amount,
            Amount(25)
        );
        assert!(merged.verify_proof().is_ok());
    }

    #[test]
    fn test_merge_invalidates_input_proofs() {
        let a = UniversalMerkleTree::new(vec![entry(1, 100, 10)]).unwrap();
        let b = UniversalMerkleTree::new(vec![entry(2, 100, 20)]).unwrap();
        let merged = UniversalMerkleTree::merge(&a, &b).unwrap();

        assert_ne!(merged.merkle_root, a.merkle_root);
        let old_proof = a.claims[&addr(1).checksum()].tokens[&addr(100).checksum()]
            .proof
            .clone();
        let leaf = claim_leaf(&addr(1), &addr(100), Amount(10));
        assert!(!bounties_merkle_verify::verify(
            old_proof,
            merged.merkle_root,
            leaf
        ));
    }

    #[test]
    fn test_verify_proof_accepts_lowercase_keys() {
        // Older tooling persisted lowercase map keys; proofs are over parsed
        // addresses, so verification must not depend on key casing.
        let tree = UniversalMerkleTree::new(vec![
            entry(0xab, 100, 10),
            entry(0xcd, 100, 20),
        ])
        .unwrap();

        let claims: BTreeMap<String, UserClaims> = tree
            .claims
            .iter()
            .map(|(user, user_claims)| {
                let tokens = user_claims
                    .tokens
                    .iter()
                    .map(|(token, claim)| (token.to_lowercase(), claim.clone()))
                    .collect();
                (user.to_lowercase(), UserClaims { tokens })
            })
            .collect();
        let lowered = UniversalMerkleTree {
            merkle_root: tree.merkle_root,
            claims,
        };

        assert!(lowered.verify_proof().is_ok());

        let bad = UniversalMerkleTree {
            merkle_root: [0u8; 32],
            claims: lowered.claims,
        };
        assert!(bad.verify_proof().is_err());
    }

    #[test]
    fn test_json_roundtrip_uses_checksummed_keys() {
        let tree = UniversalMerkleTree::new(vec![entry(0xab, 100, 10)]).unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains("merkleRoot"));
        assert!(json.contains(&addr(0xab).checksum()));
        let back: UniversalMerkleTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
