#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo
    )
)]

//! The `corechain-miner` binary: loads configuration, opens the persistent
//! store, rehydrates account state, and spawns the P2P overlay's five
//! long-lived services (§4.5) alongside a periodic block-production loop
//! that drains the mempool through the pipeline (§4.4).
//!
//! Mirrors the shape of a typical node binary:
//! install tracing first, parse CLI opts, resolve configuration, then wire
//! the long-lived subsystems together and run until shutdown.

use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};

use corechain_network::services::{
    check_health_service, client_broadcast_service, miner_broadcast_service, peer_service,
};
use corechain_network::services::time::{shared_system_time, time_service};
use corechain_network::{NetworkConfig, PeerTable, SendingMap};
use corechain_node::{now_unix, run_mining_loop, MinerOpts, OfflineConnector};
use corechain_pipeline::AccountState;
use corechain_storage::{Mempool, ReceivedBlockStash, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    corechain_node::logging::init_tracing();

    let opts = MinerOpts::parse();
    let config = opts.resolve()?;
    info!(listen_addr = %config.listen_addr, storage_path = %config.storage_path.display(), "starting corechain-miner");

    let store = Arc::new(Store::open(&config.storage_path)?);
    let accounts = Arc::new(AccountState::from_accounts(store.get_all_accounts()?));
    let mempool = Arc::new(Mempool::new());
    let stash = Arc::new(ReceivedBlockStash::new());

    let peer_table = Arc::new(PeerTable::new());
    let sending_map = Arc::new(SendingMap::new());
    let network_config: NetworkConfig = config.network_config();
    let connector = Arc::new(OfflineConnector::new(config.listen_addr.clone()));

    let (peer_cmd_tx, peer_cmd_rx) = mpsc::channel(64);
    let (miner_bcast_tx, miner_bcast_rx) = mpsc::channel(1024);
    let (_client_bcast_tx, client_bcast_rx) = mpsc::channel(1024);
    let (_iplist_tx, iplist_rx) = mpsc::channel::<String>(64);

    let shared_time = shared_system_time(now_unix());

    let services = tokio::spawn(peer_service(peer_table.clone(), sending_map.clone(), peer_cmd_rx));
    let miner_bcast = tokio::spawn(miner_broadcast_service(peer_table.clone(), sending_map.clone(), miner_bcast_rx));
    let client_bcast = tokio::spawn(client_broadcast_service(peer_table.clone(), client_bcast_rx));
    let health = tokio::spawn(check_health_service(
        network_config.clone(),
        peer_table.clone(),
        connector,
        peer_cmd_tx.clone(),
        iplist_rx,
        miner_bcast_tx.clone(),
    ));
    let time = tokio::spawn(time_service(
        shared_time,
        network_config.update_sys_time_secs,
        network_config.time_broadcast_interval_secs,
        miner_bcast_tx.clone(),
        now_unix,
    ));
    let mining = tokio::spawn(run_mining_loop(
        10,
        beneficiary_from_listen_addr(&config.listen_addr),
        config.vm_step_budget,
        accounts.clone(),
        mempool.clone(),
        store.clone(),
        stash.clone(),
    ));

    info!(stashed = stash.len(), accounts = accounts.snapshot().len(), "node wired up");

    tokio::select! {
        r = services => warn!(?r, "peer service exited"),
        r = miner_bcast => warn!(?r, "miner broadcast service exited"),
        r = client_bcast => warn!(?r, "client broadcast service exited"),
        r = health => warn!(?r, "health service exited"),
        r = time => warn!(?r, "time service exited"),
        r = mining => warn!(?r, "mining loop exited"),
        _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
    }

    Ok(())
}

/// Derives a 32-byte beneficiary address from the node's listen address so
/// a standalone node has somewhere to credit fees without a separate
/// wallet/account-key step (out of scope, §1).
fn beneficiary_from_listen_addr(listen_addr: &str) -> [u8; 32] {
    corechain_crypto::sha256(listen_addr.as_bytes()).unwrap_or([0u8; 32])
}
