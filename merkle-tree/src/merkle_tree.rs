use bounties_merkle_verify::hashv;

/// Binary Merkle tree over 32-byte leaf hashes with sorted-pair combination
/// at every internal node. An odd trailing node is promoted unchanged to the
/// next level. No leaf/interior domain-separation prefixes are added: the
/// on-chain verifier hashes raw sorted pairs and the roots must match
/// bit-for-bit.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    layers: Vec<Vec<[u8; 32]>>,
}

/// keccak256 of the pair in canonical (sorted) order.
pub fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    if a <= b {
        hashv(&[a, b])
    } else {
        hashv(&[b, a])
    }
}

impl MerkleTree {
    pub fn new(leaves: &[[u8; 32]]) -> Self {
        let mut layers: Vec<Vec<[u8; 32]>> = Vec::new();
        if leaves.is_empty() {
            return Self { layers };
        }
        layers.push(leaves.to_vec());
        while layers.last().map(Vec::len).unwrap_or(0) > 1 {
            let prev = &layers[layers.len() - 1];
            let mut next = Vec::with_capacity((prev.len() + 1) / 2);
            for pair in prev.chunks(2) {
                match pair {
                    [a, b] => next.push(hash_pair(a, b)),
                    [a] => next.push(*a),
                    _ => unreachable!("chunks(2) yields 1 or 2 elements"),
                }
            }
            layers.push(next);
        }
        Self { layers }
    }

    /// The single top hash; `None` for an empty tree.
    pub fn get_root(&self) -> Option<[u8; 32]> {
        self.layers.last().and_then(|layer| layer.first()).copied()
    }

    pub fn num_leaves(&self) -> usize {
        self.layers.first().map(Vec::len).unwrap_or(0)
    }

    /// Sibling hashes on the path from leaf `index` to the root. No
    /// left/right flags: verification re-derives order by sorting.
    pub fn find_path(&self, index: usize) -> Option<Vec<[u8; 32]>> {
        if index >= self.num_leaves() {
            return None;
        }
        let mut proof = Vec::new();
        let mut idx = index;
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = idx ^ 1;
            if sibling < layer.len() {
                proof.push(layer[sibling]);
            }
            idx /= 2;
        }
        Some(proof)
    }
}

#[cfg(test)]
mod tests {
    use bounties_merkle_verify::{hash, verify};

    use super::*;

    fn leaves(n: usize) -> Vec<[u8; 32]> {
        (0..n).map(|i| hash(&(i as u64).to_be_bytes())).collect()
    }

    #[test]
    fn test_empty_tree_has_no_root() {
        let tree = MerkleTree::new(&[]);
        assert!(tree.get_root().is_none());
        assert!(tree.find_path(0).is_none());
    }

    #[test]
    fn test_single_leaf_is_its_own_root() {
        let leaf = hash(b"only");
        let tree = MerkleTree::new(&[leaf]);
        assert_eq!(tree.get_root(), Some(leaf));
        assert_eq!(tree.find_path(0), Some(vec![]));
    }

    #[test]
    fn test_all_proofs_verify() {
        for n in 1..=17 {
            let leaves = leaves(n);
            let tree = MerkleTree::new(&leaves);
            let root = tree.get_root().unwrap();
            for (i, leaf) in leaves.iter().enumerate() {
                let proof = tree.find_path(i).unwrap();
                assert!(verify(proof, root, *leaf), "leaf {i} of {n} failed");
            }
        }
    }

    #[test]
    fn test_tampered_leaf_fails() {
        let leaves = leaves(5);
        let tree = MerkleTree::new(&leaves);
        let root = tree.get_root().unwrap();
        let proof = tree.find_path(2).unwrap();
        assert!(!verify(proof, root, hash(b"tampered")));
    }

    #[test]
    fn test_odd_node_promotion() {
        // Three leaves: the third is promoted one level and paired with the
        // hash of the first two.
        let leaves = leaves(3);
        let tree = MerkleTree::new(&leaves);
        let left = hash_pair(&leaves[0], &leaves[1]);
        let expected = hash_pair(&left, &leaves[2]);
        assert_eq!(tree.get_root(), Some(expected));
        assert_eq!(tree.find_path(2), Some(vec![left]));
    }
}
