use crate::{amount::Amount, error::MerkleTreeError, merkle_tree::MerkleTree, tree_node::TreeNode};

/// Sibling-hash path for leaf `index`.
pub fn get_proof(merkle_tree: &MerkleTree, index: usize) -> Result<Vec<[u8; 32]>, MerkleTreeError> {
    merkle_tree
        .find_path(index)
        .ok_or(MerkleTreeError::ProofNotFound(index))
}

/// Given a set of tree nodes, get the max total claim amount.
pub fn get_max_total_claim(nodes: &[TreeNode]) -> Result<Amount, MerkleTreeError> {
    nodes
        .iter()
        .try_fold(Amount::ZERO, |acc, n| acc.checked_add(n.amount))
        .ok_or(MerkleTreeError::AmountOverflow)
}

/// Serde helpers for 32-byte hashes, serialized as 0x-prefixed hex strings
/// so persisted files match what the claim contracts and front ends expect.
pub mod serde_hash {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(hash)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        decode(&s).map_err(de::Error::custom)
    }

    pub(crate) fn decode(s: &str) -> Result<[u8; 32], String> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| format!("invalid hash hex {s}: {e}"))?;
        if bytes.len() != 32 {
            return Err(format!("hash must be 32 bytes: {s}"));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(out)
    }
}

pub mod serde_proof {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        proof: &[[u8; 32]],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(proof.iter().map(|h| format!("0x{}", hex::encode(h))))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<[u8; 32]>, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .iter()
            .map(|s| super::serde_hash::decode(s).map_err(de::Error::custom))
            .collect()
    }
}

pub mod serde_opt_proof {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        proof: &Option<Vec<[u8; 32]>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match proof {
            Some(proof) => super::serde_proof::serialize(proof, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<[u8; 32]>>, D::Error> {
        let strings = Option::<Vec<String>>::deserialize(deserializer)?;
        match strings {
            None => Ok(None),
            Some(strings) => strings
                .iter()
                .map(|s| super::serde_hash::decode(s).map_err(de::Error::custom))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
        }
    }
}
