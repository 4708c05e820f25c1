//! The block-production loop: the ambient task that actually drives §4.4's
//! `new_block` / `add_tx` / `finalize_block` / `validate_block` pipeline
//! against the live mempool, on an interval, the way a real miner's main
//! loop does. Proof-of-stake seal selection itself is outside this
//! crate's concern ("consensus rules beyond block-validity
//! predicates" are a non-goal); the nonce here is a placeholder a real
//! sealing algorithm would replace.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use corechain_pipeline::{add_tx, finalize_block, new_block, validate_block, AccountState};
use corechain_storage::{Mempool, ReceivedBlockStash, Store};
use corechain_types::block::ZERO_HASH;

/// Runs forever: every `interval_secs` seconds, assembles every
/// currently-open transaction into a new candidate block on top of the
/// current chain tip, finalizes it, and validates (applies) it. A block
/// with zero admissible transactions is still produced — matching the
/// original's steady heartbeat of empty blocks when idle — and recorded in
/// `stash` so the overlay does not re-relay it to itself.
pub async fn run_mining_loop(
    interval_secs: u64,
    beneficiary: [u8; 32],
    step_budget: u64,
    accounts: Arc<AccountState>,
    mempool: Arc<Mempool>,
    store: Arc<Store>,
    stash: Arc<ReceivedBlockStash>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    loop {
        ticker.tick().await;
        if let Err(e) = produce_one_block(beneficiary, step_budget, &accounts, &mempool, &store, &stash) {
            warn!(error = %e, "block production failed");
        }
    }
}

fn produce_one_block(
    beneficiary: [u8; 32],
    step_budget: u64,
    accounts: &AccountState,
    mempool: &Mempool,
    store: &Store,
    stash: &ReceivedBlockStash,
) -> Result<(), corechain_pipeline::BlockError> {
    let parent = store.read_last_closed_block()?;
    let (parent_hash, height) = match &parent {
        Some(p) => (p.hash()?, p.header.height + 1),
        None => (ZERO_HASH, 1),
    };

    let timestamp = crate::now_unix();
    let mut block = new_block(parent_hash, beneficiary, timestamp as u64, height);
    for tx in mempool.open_snapshot() {
        if let Err(e) = add_tx(&mut block, tx.clone(), accounts) {
            warn!(error = %e, "dropping transaction at admission");
            mempool.write_invalid_open_tx(tx)?;
        }
    }

    finalize_block(&mut block, height)?;
    store.write_open_block(&block)?;
    validate_block(&block, parent.as_ref(), accounts, store, mempool, step_budget)?;

    let hash = block.hash()?;
    stash.insert(hash);
    info!(height = block.header.height, txs = block.transactions.len(), "produced block");
    Ok(())
}
