//! ABI-encoded payloads for the claim contracts' batched admin functions.
//! Logged for the operator to submit, never sent from here.

use bounties_merkle_tree::Address;
use bounties_merkle_verify::hash;

fn selector(signature: &str) -> [u8; 4] {
    let digest = hash(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

fn address_word(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn u256_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Tail of a dynamic array: length word then one word per element.
fn array_tail(words: impl Iterator<Item = [u8; 32]>, len: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(32 * (1 + len as usize));
    out.extend_from_slice(&u256_word(len));
    for word in words {
        out.extend_from_slice(&word);
    }
    out
}

/// `multiFreeze(address[] tokens)`
pub fn multi_freeze(tokens: &[Address]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&selector("multiFreeze(address[])"));
    data.extend_from_slice(&u256_word(32));
    data.extend_from_slice(&array_tail(
        tokens.iter().map(|t| address_word(*t)),
        tokens.len() as u64,
    ));
    data
}

fn two_array_call(signature: &str, tokens: &[Address], roots: &[[u8; 32]]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&selector(signature));
    // Head: two offsets, relative to the start of the argument block.
    let tokens_offset = 64u64;
    let roots_offset = tokens_offset + 32 * (1 + tokens.len() as u64);
    data.extend_from_slice(&u256_word(tokens_offset));
    data.extend_from_slice(&u256_word(roots_offset));
    data.extend_from_slice(&array_tail(
        tokens.iter().map(|t| address_word(*t)),
        tokens.len() as u64,
    ));
    data.extend_from_slice(&array_tail(roots.iter().copied(), roots.len() as u64));
    data
}

/// `multiSet(address[] tokens, bytes32[] roots)` for the stash contracts.
pub fn multi_set(tokens: &[Address], roots: &[[u8; 32]]) -> Vec<u8> {
    two_array_call("multiSet(address[],bytes32[])", tokens, roots)
}

/// `multiUpdateMerkleRoot(address[] tokens, bytes32[] roots)` for the
/// alternate-chain claim contract.
pub fn multi_update_merkle_root(tokens: &[Address], roots: &[[u8; 32]]) -> Vec<u8> {
    two_array_call("multiUpdateMerkleRoot(address[],bytes32[])", tokens, roots)
}
