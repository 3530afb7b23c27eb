use anyhow::Result;
use bounties_merkle_tree::{DistributionMerkleTree, UniversalMerkleTree};
use tracing::info;

use crate::VerifyArgs;

/// Re-verify every stored proof in a persisted tree against its root.
pub fn process_verify(args: &VerifyArgs) -> Result<()> {
    if args.universal {
        let tree = UniversalMerkleTree::new_from_file(&args.merkle_tree_path)?;
        tree.verify_proof()?;
        info!(
            "verified {} claimants against root 0x{}",
            tree.claims.len(),
            hex::encode(tree.merkle_root)
        );
    } else {
        let tree = DistributionMerkleTree::new_from_file(&args.merkle_tree_path)?;
        tree.verify_proof()?;
        info!(
            "verified {} nodes against root 0x{}",
            tree.max_num_nodes,
            hex::encode(tree.merkle_root)
        );
    }
    Ok(())
}
