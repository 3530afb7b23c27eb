use std::{collections::BTreeMap, fs::File, io::BufReader};

use anyhow::Result;
use bounties_merkle_tree::{Address, Amount, DistributionMerkleTree};
use tracing::info;

use crate::CreateMerkleTreeArgs;

/// Build a single-token tree straight from a rewards JSON (address to wei
/// amount), bypassing the vote pipeline. Used for ad-hoc or corrective
/// distributions.
pub fn process_create_merkle_tree(args: &CreateMerkleTreeArgs) -> Result<()> {
    let reader = BufReader::new(File::open(&args.rewards_path)?);
    let rewards: BTreeMap<Address, Amount> = serde_json::from_reader(reader)?;

    let tree = DistributionMerkleTree::from_user_rewards(&rewards)?;
    tree.write_to_file(&args.merkle_tree_path)?;

    info!(
        "wrote tree with {} nodes, root 0x{}, to {}",
        tree.max_num_nodes,
        hex::encode(tree.merkle_root),
        args.merkle_tree_path.display()
    );
    Ok(())
}
