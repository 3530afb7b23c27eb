use std::{
    collections::{BTreeMap, HashSet},
    fs::File,
    io::{BufReader, Write},
    path::Path,
    result,
};

use bounties_merkle_verify::verify;
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    address::Address,
    amount::Amount,
    error::{MerkleTreeError, MerkleTreeError::MerkleValidationError},
    merkle_tree::MerkleTree,
    tree_node::TreeNode,
    utils::{get_max_total_claim, get_proof, serde_hash},
};

pub type Result<T> = result::Result<T, MerkleTreeError>;

/// Single-token distribution tree: one leaf per claimant over
/// `(index, claimant, amount)`. Contains everything necessary to verify
/// claims against the root that goes on-chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionMerkleTree {
    /// The merkle root, which is uploaded on-chain
    #[serde(with = "serde_hash")]
    pub merkle_root: [u8; 32],
    pub max_num_nodes: u64,
    pub max_total_claim: Amount,
    pub tree_nodes: Vec<TreeNode>,
}

impl DistributionMerkleTree {
    pub fn new(tree_nodes: Vec<TreeNode>) -> Result<Self> {
        // Combine tree nodes with the same claimant, while retaining original order
        let mut tree_nodes_map: IndexMap<Address, TreeNode> = IndexMap::new();
        for tree_node in tree_nodes {
            match tree_nodes_map.entry(tree_node.claimant) {
                Entry::Occupied(mut entry) => {
                    info!("duplicate claimant {} found, combining", tree_node.claimant);
                    let node = entry.get_mut();
                    node.amount = node
                        .amount
                        .checked_add(tree_node.amount)
                        .ok_or(MerkleTreeError::AmountOverflow)?;
                }
                Entry::Vacant(entry) => {
                    entry.insert(tree_node);
                }
            }
        }

        // Leaf indices are the 0-based positions in the combined ordering
        let mut tree_nodes: Vec<TreeNode> = tree_nodes_map.into_values().collect();
        for (i, tree_node) in tree_nodes.iter_mut().enumerate() {
            tree_node.index = i as u64;
        }

        let hashed_nodes = tree_nodes
            .iter()
            .map(|claim_info| claim_info.hash())
            .collect::<Vec<_>>();

        let tree = MerkleTree::new(&hashed_nodes);

        for (i, tree_node) in tree_nodes.iter_mut().enumerate() {
            tree_node.proof = Some(get_proof(&tree, i)?);
        }

        let max_total_claim = get_max_total_claim(&tree_nodes)?;
        let distribution = DistributionMerkleTree {
            merkle_root: tree.get_root().ok_or(MerkleTreeError::MerkleRootError)?,
            max_num_nodes: tree_nodes.len() as u64,
            max_total_claim,
            tree_nodes,
        };

        info!(
            "created merkle tree with {} nodes and max total claim of {}",
            distribution.max_num_nodes, distribution.max_total_claim
        );
        distribution.validate()?;
        Ok(distribution)
    }

    /// Build from a flattened per-user reward map. Ordering is the map's
    /// address order (BTreeMap, so deterministic); zero amounts never become
    /// leaves.
    pub fn from_user_rewards(rewards: &BTreeMap<Address, Amount>) -> Result<Self> {
        let tree_nodes: Vec<TreeNode> = rewards
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(claimant, amount)| TreeNode {
                claimant: *claimant,
                index: 0,
                amount: *amount,
                proof: None,
            })
            .collect();
        Self::new(tree_nodes)
    }

    /// Load a serialized merkle tree from file path
    pub fn new_from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let tree: DistributionMerkleTree = serde_json::from_reader(reader)?;

        Ok(tree)
    }

    /// Write a merkle tree to a filepath. Construction is all-or-nothing in
    /// memory before this single write.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self)?;
        let mut file = File::create(path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }

    pub fn get_node(&self, claimant: &Address) -> Option<&TreeNode> {
        self.tree_nodes.iter().find(|n| n.claimant == *claimant)
    }

    fn validate(&self) -> Result<()> {
        // The Merkle tree can be at most height 32, implying a max node count of 2^32 - 1
        if self.max_num_nodes > 2u64.pow(32) - 1 {
            return Err(MerkleValidationError(format!(
                "Max num nodes {} is greater than 2^32 - 1",
                self.max_num_nodes
            )));
        }

        // validate that the length is equal to the max_num_nodes
        if self.tree_nodes.len() != self.max_num_nodes as usize {
            return Err(MerkleValidationError(format!(
                "Tree nodes length {} does not match max_num_nodes {}",
                self.tree_nodes.len(),
                self.max_num_nodes
            )));
        }

        // validate that there are no duplicate claimants
        let unique_nodes: HashSet<_> = self.tree_nodes.iter().map(|n| n.claimant).collect();

        if unique_nodes.len() != self.tree_nodes.len() {
            return Err(MerkleValidationError(
                "Duplicate claimants found".to_string(),
            ));
        }

        // validate that sum is equal to max_total_claim
        let sum = get_max_total_claim(&self.tree_nodes)?;

        if sum != self.max_total_claim {
            return Err(MerkleValidationError(format!(
                "Tree nodes sum {} does not match max_total_claim {}",
                sum, self.max_total_claim
            )));
        }

        self.verify_proof()?;

        Ok(())
    }

    /// verify that the leaves of the merkle tree match the nodes
    pub fn verify_proof(&self) -> Result<()> {
        let root = self.merkle_root;

        // Recreate root given nodes
        let hashed_nodes: Vec<[u8; 32]> = self.tree_nodes.iter().map(|n| n.hash()).collect();
        let mk = MerkleTree::new(&hashed_nodes);

        if mk.get_root() != Some(root) {
            return Err(MerkleValidationError(
                "Merkle root is invalid given nodes".to_string(),
            ));
        }

        // Verify each node against the root
        for (i, node) in hashed_nodes.iter().enumerate() {
            let proof = self.tree_nodes[i]
                .proof
                .clone()
                .ok_or(MerkleTreeError::ProofNotFound(i))?;

            if !verify(proof, root, *node) {
                return Err(MerkleValidationError("invalid merkle proof".to_string()));
            }
        }

        Ok(())
    }
}
