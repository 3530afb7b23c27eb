use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use bounties_allocation::carry_over::PreviousLeaf;
use bounties_merkle_tree::{utils::serde_hash, Address, Amount, DistributionMerkleTree};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One distributed token's entry in merkle.json. Tokens not processed this
/// round carry their entries over untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDistribution {
    pub symbol: String,
    /// Reward token address
    pub address: Address,
    pub image: String,
    /// Per-user leaves, the shape the next round reads back as
    /// `PreviousLeaf`s
    pub merkle: BTreeMap<Address, PreviousLeaf>,
    #[serde(with = "serde_hash")]
    pub root: [u8; 32],
    pub total: Amount,
    pub chain_id: u64,
    pub merkle_contract: Address,
}

impl TokenDistribution {
    pub fn from_tree(
        tree: &DistributionMerkleTree,
        symbol: &str,
        token: Address,
        image: &str,
        chain_id: u64,
        merkle_contract: Address,
    ) -> Self {
        let merkle = tree
            .tree_nodes
            .iter()
            .map(|node| {
                (
                    node.claimant,
                    PreviousLeaf {
                        index: node.index,
                        amount: node.amount,
                        proof: node.proof.clone().unwrap_or_default(),
                    },
                )
            })
            .collect();
        Self {
            symbol: symbol.to_string(),
            address: token,
            image: image.to_string(),
            merkle,
            root: tree.merkle_root,
            total: tree.max_total_claim,
            chain_id,
            merkle_contract,
        }
    }
}

/// Load merkle.json; a missing file is an empty previous round.
pub fn load_merkle_json(path: &Path) -> Result<Vec<TokenDistribution>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Replace (or append) one token's entry, leaving the others untouched, and
/// write the whole file back in one shot.
pub fn update_merkle_json(
    path: &Path,
    distribution: TokenDistribution,
) -> Result<()> {
    let mut entries = load_merkle_json(path)?;
    match entries.iter_mut().find(|e| e.address == distribution.address) {
        Some(entry) => *entry = distribution,
        None => entries.push(distribution),
    }
    let serialized = serde_json::to_string_pretty(&entries)?;
    File::create(path)?.write_all(serialized.as_bytes())?;
    info!("wrote {} token entries to {}", entries.len(), path.display());
    Ok(())
}

/// delegationsAPRs.json: space -> APR percentage.
pub fn update_delegation_aprs(path: &Path, space: &str, apr: f64) -> Result<()> {
    let mut aprs: BTreeMap<String, f64> = if path.exists() {
        serde_json::from_reader(BufReader::new(File::open(path)?))?
    } else {
        BTreeMap::new()
    };
    aprs.insert(space.to_string(), apr);
    let serialized = serde_json::to_string_pretty(&aprs)?;
    File::create(path)?.write_all(serialized.as_bytes())?;
    Ok(())
}

/// Diagnostic summary of one run, written to log.json. Threaded explicitly
/// through the pipeline; there is no global accumulation.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    pub space: String,
    pub proposal_id: String,
    pub csv_path: Option<PathBuf>,
    pub merkle_path: Option<PathBuf>,
    pub root: Option<String>,
    pub total: Option<String>,
    pub delegation_apr: Option<f64>,
    pub freeze_call_data: Option<String>,
    pub set_call_data: Option<String>,
}

impl RunContext {
    pub fn new(space: &str, proposal_id: &str) -> Self {
        Self {
            space: space.to_string(),
            proposal_id: proposal_id.to_string(),
            ..Default::default()
        }
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self)?;
        File::create(path)?.write_all(serialized.as_bytes())?;
        Ok(())
    }
}
