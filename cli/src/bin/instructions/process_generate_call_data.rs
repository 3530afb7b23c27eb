use anyhow::Result;
use bounties_merkle_tree::Address;
use tracing::info;

use crate::{call_data, outputs::load_merkle_json, Args, GenerateCallDataArgs};

/// Re-encode the freeze / root-update payloads for every token in a
/// merkle.json, grouped per chain. Payloads are printed for the operator;
/// nothing is submitted from here.
pub fn process_generate_call_data(args: &Args, generate: &GenerateCallDataArgs) -> Result<()> {
    let path = generate
        .merkle_json_path
        .clone()
        .unwrap_or_else(|| args.data_dir.join("merkle.json"));
    let entries = load_merkle_json(&path)?;

    let mut chain_ids: Vec<u64> = entries.iter().map(|e| e.chain_id).collect();
    chain_ids.sort_unstable();
    chain_ids.dedup();

    for chain_id in chain_ids {
        let tokens: Vec<Address> = entries
            .iter()
            .filter(|e| e.chain_id == chain_id)
            .map(|e| e.address)
            .collect();
        let roots: Vec<[u8; 32]> = entries
            .iter()
            .filter(|e| e.chain_id == chain_id)
            .map(|e| e.root)
            .collect();

        let freeze = call_data::multi_freeze(&tokens);
        let set = if chain_id == 1 {
            call_data::multi_set(&tokens, &roots)
        } else {
            call_data::multi_update_merkle_root(&tokens, &roots)
        };

        info!("chain {chain_id}: {} tokens", tokens.len());
        println!("chain {chain_id} multiFreeze: 0x{}", hex::encode(&freeze));
        println!("chain {chain_id} root update: 0x{}", hex::encode(&set));
    }
    Ok(())
}
