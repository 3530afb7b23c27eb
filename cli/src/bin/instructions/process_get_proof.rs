use anyhow::{anyhow, Result};
use bounties_merkle_tree::DistributionMerkleTree;

use crate::GetProofArgs;

/// Print one claimant's node (index, amount, proof) as JSON.
pub fn process_get_proof(args: &GetProofArgs) -> Result<()> {
    let tree = DistributionMerkleTree::new_from_file(&args.merkle_tree_path)?;
    let node = tree
        .get_node(&args.claimant)
        .ok_or_else(|| anyhow!("claimant {} is not in the tree", args.claimant))?;

    println!("{}", serde_json::to_string_pretty(node)?);
    Ok(())
}
