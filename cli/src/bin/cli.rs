mod call_data;
mod instructions;
mod outputs;

use std::path::PathBuf;

use anyhow::Result;
use bounties_merkle_tree::Address;
use bounties_snapshot::{
    delegators::DEFAULT_SUBGRAPH_URL, hub::DEFAULT_HUB_URL, price::DEFAULT_PRICE_URL,
    score::DEFAULT_SCORE_URL,
};
use clap::{Parser, Subcommand};
use instructions::*;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Snapshot hub GraphQL endpoint
    #[clap(long, env, default_value = DEFAULT_HUB_URL)]
    pub hub_url: String,

    /// Voting-power scoring API endpoint
    #[clap(long, env, default_value = DEFAULT_SCORE_URL)]
    pub score_url: String,

    /// Delegation subgraph endpoint
    #[clap(long, env, default_value = DEFAULT_SUBGRAPH_URL)]
    pub subgraph_url: String,

    /// RPC url for on-chain reads
    #[clap(long, env, default_value = "https://rpc.ankr.com/eth")]
    pub rpc_url: String,

    /// Indexed-log query service endpoint; on-chain isClaimed reads are
    /// used when unset
    #[clap(long, env)]
    pub log_index_url: Option<String>,

    /// Auth token for the indexed-log service
    #[clap(long, env, default_value = "")]
    pub log_index_token: String,

    /// Price API endpoint (APR side metric)
    #[clap(long, env, default_value = DEFAULT_PRICE_URL)]
    pub price_url: String,

    /// Directory the merkle.json / delegationsAPRs.json / log.json live in
    #[clap(long, env, default_value = ".")]
    pub data_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full distribution round for one space
    Distribute(DistributeArgs),
    /// Build a single-token Merkle tree from a rewards JSON
    CreateMerkleTree(CreateMerkleTreeArgs),
    /// Merge two multi-token trees into a freshly built one
    MergeMerkleTrees(MergeMerkleTreesArgs),
    /// Re-verify every proof in a persisted tree
    Verify(VerifyArgs),
    /// Encode the multiFreeze / multiSet payloads for a merkle.json
    GenerateCallData(GenerateCallDataArgs),
    /// Print one claimant's node from a tree
    GetProof(GetProofArgs),
}

#[derive(Parser, Debug)]
pub struct DistributeArgs {
    /// Snapshot space being distributed (e.g. sdcrv.eth)
    #[clap(long, env)]
    pub space: String,

    /// Proposal id for this round
    #[clap(long, env)]
    pub proposal_id: String,

    /// Directory holding the dated bribe report CSVs
    #[clap(long, env)]
    pub reports_dir: PathBuf,

    /// Pre-exported delegator list; the subgraph is queried when unset
    #[clap(long, env)]
    pub delegators_file: Option<PathBuf>,

    /// RPC url for the space's own chain when it is not mainnet; used to
    /// derive the comparable snapshot block
    #[clap(long, env)]
    pub chain_rpc_url: Option<String>,

    /// JSON list of auto-voter records to append as synthetic votes
    #[clap(long, env)]
    pub auto_voters_file: Option<PathBuf>,

    /// Start of the previous claim window (defaults to two weeks before
    /// the proposal start)
    #[clap(long, env)]
    pub claim_window_start: Option<i64>,

    /// End of the previous claim window (defaults to the proposal end)
    #[clap(long, env)]
    pub claim_window_end: Option<i64>,
}

#[derive(Parser, Debug)]
pub struct CreateMerkleTreeArgs {
    /// JSON map of address to amount, in wei units
    #[clap(long, env)]
    pub rewards_path: PathBuf,

    /// Merkle tree out path
    #[clap(long, env)]
    pub merkle_tree_path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct MergeMerkleTreesArgs {
    #[clap(long, env)]
    pub tree_a_path: PathBuf,

    #[clap(long, env)]
    pub tree_b_path: PathBuf,

    /// Merged tree out path
    #[clap(long, env)]
    pub out_path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Merkle tree path
    #[clap(long, env)]
    pub merkle_tree_path: PathBuf,

    /// Treat the file as a multi-token tree
    #[clap(long)]
    pub universal: bool,
}

#[derive(Parser, Debug)]
pub struct GenerateCallDataArgs {
    /// merkle.json path; defaults to data_dir/merkle.json
    #[clap(long, env)]
    pub merkle_json_path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct GetProofArgs {
    /// Merkle tree path
    #[clap(long, env)]
    pub merkle_tree_path: PathBuf,

    /// Claimant to look up
    #[clap(long, env)]
    pub claimant: Address,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt().init();

    match &args.command {
        Commands::Distribute(distribute_args) => {
            process_distribute(&args, distribute_args).await?;
        }
        Commands::CreateMerkleTree(create_args) => {
            process_create_merkle_tree(create_args)?;
        }
        Commands::MergeMerkleTrees(merge_args) => {
            process_merge_merkle_trees(merge_args)?;
        }
        Commands::Verify(verify_args) => {
            process_verify(verify_args)?;
        }
        Commands::GenerateCallData(call_data_args) => {
            process_generate_call_data(&args, call_data_args)?;
        }
        Commands::GetProof(get_proof_args) => {
            process_get_proof(get_proof_args)?;
        }
    }
    Ok(())
}
