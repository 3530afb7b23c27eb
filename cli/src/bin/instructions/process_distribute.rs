use std::{collections::BTreeMap, fs::File, io::BufReader};

use anyhow::{ensure, Result};
use bounties_allocation::{
    autovoter::AutoVoterRecord,
    bribes::resolve_bribes,
    carry_over::merge_carry_over,
    delegation::{deduct_direct_votes, delegation_apr, split_delegation},
    gauge_choices::gauge_choice_map,
    proportional::allocate,
    space_config,
    user_rewards::{flatten, quantize},
    Allocation, SpaceConfig,
};
use bounties_merkle_tree::{
    csv_entry::{latest_report, BribeCsvEntry},
    Address, DistributionMerkleTree,
};
use bounties_snapshot::{
    ClaimedOracle, DelegatorSource, LogIndexClient, PriceApi, RpcClient, ScoreApi, SnapshotHub,
    SubgraphDelegators,
};
use indexmap::IndexMap;
use tracing::info;

use crate::{
    call_data,
    outputs::{load_merkle_json, update_delegation_aprs, update_merkle_json, RunContext,
        TokenDistribution},
    Args, DistributeArgs,
};

/// One full distribution round for one space: fetch, allocate, fan out the
/// delegation, carry over unclaimed balances, build the tree, write the
/// outputs. Fails fast; nothing is written until the tree is built and
/// validated in memory.
pub async fn process_distribute(args: &Args, distribute: &DistributeArgs) -> Result<()> {
    let config = space_config(&distribute.space)?;
    let mut context = RunContext::new(&distribute.space, &distribute.proposal_id);

    let hub = SnapshotHub::new(&args.hub_url);
    let proposal = hub.get_proposal(&distribute.proposal_id).await?;
    ensure!(
        proposal.space == config.space,
        "proposal {} belongs to space {}, not {}",
        proposal.id,
        proposal.space,
        config.space
    );
    let mut votes = hub.get_votes(&proposal.id, config.space).await?;

    let gauge_choices = gauge_choice_map(&proposal.choices, config.rule, config.policy)?;

    // Voting power snapshots reference mainnet blocks; a space on another
    // chain scores against the block its own chain had at the same moment.
    let snapshot_block = if config.chain_id == 1 {
        proposal.snapshot
    } else {
        let mainnet = RpcClient::new(&args.rpc_url);
        let snapshot_ts = mainnet.block_timestamp(proposal.snapshot).await?;
        let chain_rpc = RpcClient::new(
            distribute
                .chain_rpc_url
                .as_deref()
                .unwrap_or(&args.rpc_url),
        );
        chain_rpc.timestamp_to_block(snapshot_ts).await?
    };

    let score_api = ScoreApi::new(&args.score_url);
    let strategies = hub.get_strategies(config.space).await?;

    // Accounts that auto-delegated their vote casting have no hub vote;
    // append synthetic ones from their standing gauge weights.
    if let Some(path) = &distribute.auto_voters_file {
        let records: Vec<AutoVoterRecord> =
            serde_json::from_reader(BufReader::new(File::open(path)?))?;
        let users: Vec<Address> = records.iter().map(|r| r.user).collect();
        let scores = score_api
            .get_voting_power(
                &config.chain_id.to_string(),
                snapshot_block,
                &strategies,
                config.space,
                &users,
            )
            .await?;
        for record in &records {
            if votes.iter().any(|v| v.voter == record.user) {
                continue;
            }
            let vp = scores.get(&record.user).copied().unwrap_or(0.0);
            if let Some(vote) =
                record.synthetic_vote(vp, &gauge_choices, proposal.created)?
            {
                votes.push(vote);
            }
        }
    }

    let csv_path = latest_report(&distribute.reports_dir, config.protocol)?;
    info!("bribe report: {}", csv_path.display());
    let rewards: Vec<(String, f64)> = BribeCsvEntry::new_from_file(&csv_path)?
        .into_iter()
        .filter(|entry| entry.protocol.to_lowercase() == config.protocol)
        .map(|entry| (entry.gauge_address, entry.reward_sd_value))
        .collect();
    context.csv_path = Some(csv_path);

    let resolved = resolve_bribes(&gauge_choices, &rewards)?;
    let voter_rewards = allocate(&votes, &resolved);

    // Fan the delegation voter's share out to its delegators. A delegation
    // that cast no vote (or earned nothing) splits nothing.
    let delegation = config.delegation();
    let shares = match voter_rewards.get(&delegation).copied() {
        Some(state) if state.total_rewards > 0.0 => {
            let source = match &distribute.delegators_file {
                Some(path) => DelegatorSource::File(path.clone()),
                None => DelegatorSource::Subgraph(SubgraphDelegators::new(&args.subgraph_url)),
            };
            let delegators = source
                .get_all_delegators(config.space, delegation, proposal.created)
                .await?;

            // The delegation address rides along in the scoring query so
            // its vp comes from the same snapshot as the delegators'.
            let mut addresses = delegators.clone();
            addresses.push(delegation);
            let scores = score_api
                .get_voting_power(
                    &config.chain_id.to_string(),
                    snapshot_block,
                    &strategies,
                    config.space,
                    &addresses,
                )
                .await?;

            let mut delegator_vp: IndexMap<Address, f64> = delegators
                .iter()
                .map(|d| (*d, scores.get(d).copied().unwrap_or(0.0)))
                .collect();
            deduct_direct_votes(&mut delegator_vp, &votes);
            let shares = split_delegation(state.total_rewards, &delegator_vp);

            let apr = delegation_apr(state.total_rewards, config.periods_per_year, state.vp);
            update_delegation_aprs(
                &args.data_dir.join("delegationsAPRs.json"),
                config.space,
                apr,
            )?;
            context.delegation_apr = Some(apr);

            if let Ok(price) = PriceApi::new(&args.price_url)
                .get_price(chain_slug(config), config.token_address())
                .await
            {
                info!(
                    "delegation pool earned {:.4} {} (~{:.2} USD), APR {apr:.2}%",
                    state.total_rewards,
                    config.symbol,
                    state.total_rewards * price
                );
            }
            shares
        }
        _ => IndexMap::new(),
    };

    let allocations: Vec<Allocation> = voter_rewards
        .iter()
        .map(|(voter, state)| {
            if *voter == delegation {
                Allocation::Delegated {
                    voter: *voter,
                    shares: shares.clone(),
                }
            } else {
                Allocation::Direct {
                    voter: *voter,
                    amount: state.total_rewards,
                }
            }
        })
        .collect();
    let mut rewards_map = flatten(&allocations);

    // Carry over unclaimed balances from the previous round's leaves.
    let merkle_path = args.data_dir.join("merkle.json");
    let previous_entries = load_merkle_json(&merkle_path)?;
    if let Some(previous) = previous_entries
        .iter()
        .find(|e| e.address == config.token_address())
    {
        let leaves: Vec<(Address, u64)> = previous
            .merkle
            .iter()
            .map(|(user, leaf)| (*user, leaf.index))
            .collect();
        let oracle = match &args.log_index_url {
            Some(url) => ClaimedOracle::IndexedLogs {
                index: LogIndexClient::new(url, &args.log_index_token),
                merkle_contract: config.merkle(),
            },
            None => ClaimedOracle::OnChain {
                rpc: RpcClient::new(&args.rpc_url),
                merkle_contract: config.merkle(),
            },
        };
        let window = (
            distribute
                .claim_window_start
                .unwrap_or(proposal.start - 14 * 24 * 3600),
            distribute.claim_window_end.unwrap_or(proposal.end),
        );
        let claimed = oracle
            .claimed_status(config.token_address(), &leaves, window)
            .await?;
        let previous_leaves: BTreeMap<_, _> = previous
            .merkle
            .iter()
            .map(|(user, leaf)| (*user, leaf.clone()))
            .collect();
        merge_carry_over(&mut rewards_map, &previous_leaves, &claimed);
    }

    // All-or-nothing: the tree is built and validated before any write.
    let tree = DistributionMerkleTree::from_user_rewards(&quantize(&rewards_map))?;

    let token = config.token_address();
    let distribution = TokenDistribution::from_tree(
        &tree,
        config.symbol,
        token,
        config.image,
        config.chain_id,
        config.merkle(),
    );
    update_merkle_json(&merkle_path, distribution)?;

    let freeze = call_data::multi_freeze(&[token]);
    let set = if config.chain_id == 1 {
        call_data::multi_set(&[token], &[tree.merkle_root])
    } else {
        call_data::multi_update_merkle_root(&[token], &[tree.merkle_root])
    };
    info!("multiFreeze call data: 0x{}", hex::encode(&freeze));
    info!("root update call data: 0x{}", hex::encode(&set));

    context.merkle_path = Some(merkle_path);
    context.root = Some(format!("0x{}", hex::encode(tree.merkle_root)));
    context.total = Some(tree.max_total_claim.to_string());
    context.freeze_call_data = Some(format!("0x{}", hex::encode(&freeze)));
    context.set_call_data = Some(format!("0x{}", hex::encode(&set)));
    context.write_to_file(&args.data_dir.join("log.json"))?;

    info!(
        "distributed {} to {} claimants for {}",
        tree.max_total_claim, tree.max_num_nodes, config.space
    );
    Ok(())
}

fn chain_slug(config: &SpaceConfig) -> &'static str {
    match config.chain_id {
        56 => "bsc",
        _ => "ethereum",
    }
}
