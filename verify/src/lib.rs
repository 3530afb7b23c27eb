use sha3::{Digest, Keccak256};

/// keccak256 over the concatenation of the given byte slices.
pub fn hashv(vals: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for val in vals {
        hasher.update(val);
    }
    hasher.finalize().into()
}

/// keccak256 of a single byte slice.
pub fn hash(val: &[u8]) -> [u8; 32] {
    hashv(&[val])
}

/// Direct port of https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v3.4.0/contracts/cryptography/MerkleProof.sol
/// Returns true if a `leaf` can be proved to be a part of a Merkle tree
/// defined by `root`. For this, a `proof` must be provided, containing
/// sibling hashes on the branch from the leaf to the root of the tree. Each
/// pair of leaves and each pair of pre-images are assumed to be sorted,
/// which makes verification independent of left/right position. The claim
/// contracts verify with exactly this routine, so the combination rule is
/// not free to change.
pub fn verify(proof: Vec<[u8; 32]>, root: [u8; 32], leaf: [u8; 32]) -> bool {
    let mut computed_hash = leaf;
    for proof_element in proof.into_iter() {
        if computed_hash <= proof_element {
            // Hash(current computed hash + current element of the proof)
            computed_hash = hashv(&[&computed_hash, &proof_element]);
        } else {
            // Hash(current element of the proof + current computed hash)
            computed_hash = hashv(&[&proof_element, &computed_hash]);
        }
    }
    // Check if the computed hash (root) is equal to the provided root
    computed_hash == root
}
