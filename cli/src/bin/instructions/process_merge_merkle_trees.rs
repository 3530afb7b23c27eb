use anyhow::Result;
use bounties_merkle_tree::UniversalMerkleTree;
use tracing::info;

use crate::MergeMerkleTreesArgs;

/// Merge two multi-token trees. The result is rebuilt from scratch, so both
/// inputs' proofs are stale afterwards; only the freshly written file is
/// valid against the new root.
pub fn process_merge_merkle_trees(args: &MergeMerkleTreesArgs) -> Result<()> {
    let a = UniversalMerkleTree::new_from_file(&args.tree_a_path)?;
    let b = UniversalMerkleTree::new_from_file(&args.tree_b_path)?;

    let merged = UniversalMerkleTree::merge(&a, &b)?;
    merged.verify_proof()?;
    merged.write_to_file(&args.out_path)?;

    info!(
        "merged {} + {} claimants into {}, root 0x{}",
        a.claims.len(),
        b.claims.len(),
        merged.claims.len(),
        hex::encode(merged.merkle_root)
    );
    Ok(())
}
