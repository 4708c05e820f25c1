//! `CheckHealthService` (§4.5): keeps the bootstrap connection and the
//! miner-peer floor alive.
//!
//! The interval between cycles is dynamic — `5 * min(max(miners, 1), 6)`
//! seconds (§4.5, §6) — so a thinly connected node searches for neighbors
//! more often than a well-connected one. `run_health_cycle` is the single
//! cycle's logic, factored out of the sleeping loop so it can be driven
//! directly (and deterministically) in tests; `check_health_service` is
//! the long-lived task a real node spawns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{instrument, warn};

use crate::config::{health_interval_secs, NetworkConfig};
use crate::connector::PeerConnector;
use crate::error::NetworkError;
use crate::message::NetworkMessage;
use crate::peer::PeerType;
use crate::peer_table::PeerTable;
use crate::services::peer_service::PeerCommand;

/// Runs one health cycle: reconnects to the bootstrap node if it has
/// dropped off, then tries to bring the miner-peer count up to
/// `config.min_miners` by dialing candidates off `iplist`, falling back to
/// a neighbor-request broadcast if the candidate list is dry (§4.5).
#[instrument(skip(config, table, connector, peer_commands, iplist, miner_broadcast))]
pub async fn run_health_cycle(
    config: &NetworkConfig,
    table: &PeerTable,
    connector: &dyn PeerConnector,
    peer_commands: &mpsc::Sender<PeerCommand>,
    iplist: &mut mpsc::Receiver<String>,
    miner_broadcast: &mpsc::Sender<Vec<u8>>,
) {
    if !config.bootstrap_ip_port.is_empty() && !table.contains(&config.bootstrap_ip_port, PeerType::Miner) {
        match connector.connect(&config.bootstrap_ip_port).await {
            Ok(handle) => {
                let _ = peer_commands.send(PeerCommand::Register(handle)).await;
            }
            Err(NetworkError::SelfConnect) => {
                // The bootstrap address is this node itself; nothing to do.
                // A typed variant, not a string-prefix match (§9 redesign flag).
            }
            Err(e) => warn!(error = %e, "bootstrap reconnect failed"),
        }
    }

    if table.len(PeerType::Miner) >= config.min_miners {
        return;
    }

    // "goto RETRY": keep trying the next candidate on failure, without
    // sleeping again (§9 design note) — modeled as a loop that continues on
    // failure and returns on success.
    loop {
        let Ok(candidate) = iplist.try_recv() else {
            if let Ok(bytes) = NetworkMessage::NeighborRequest.encode() {
                let _ = miner_broadcast.send(bytes).await;
            }
            return;
        };
        match connector.connect(&candidate).await {
            Ok(handle) => {
                let _ = peer_commands.send(PeerCommand::Register(handle)).await;
                return;
            }
            Err(NetworkError::SelfConnect) => continue,
            Err(e) => {
                warn!(candidate = %candidate, error = %e, "candidate connect failed, trying next");
                continue;
            }
        }
    }
}

/// The long-lived health service: sleeps `health_interval_secs(miner
/// count)` seconds between cycles, forever.
#[instrument(skip(config, table, connector, peer_commands, iplist, miner_broadcast))]
pub async fn check_health_service(
    config: NetworkConfig,
    table: Arc<PeerTable>,
    connector: Arc<dyn PeerConnector>,
    peer_commands: mpsc::Sender<PeerCommand>,
    mut iplist: mpsc::Receiver<String>,
    miner_broadcast: mpsc::Sender<Vec<u8>>,
) {
    loop {
        let interval = health_interval_secs(table.len(PeerType::Miner));
        tokio::time::sleep(Duration::from_secs(interval)).await;
        run_health_cycle(&config, &table, connector.as_ref(), &peer_commands, &mut iplist, &miner_broadcast).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::PeerHandle;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeConnector {
        fail_first: AtomicUsize,
    }

    #[async_trait]
    impl PeerConnector for FakeConnector {
        async fn connect(&self, addr: &str) -> Result<PeerHandle, NetworkError> {
            if addr == "self:0" {
                return Err(NetworkError::SelfConnect);
            }
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return Err(NetworkError::ConnectFailed {
                    addr: addr.to_string(),
                    reason: "refused".to_string(),
                });
            }
            Ok(PeerHandle::new(addr, PeerType::Miner).0)
        }
    }

    fn config() -> NetworkConfig {
        NetworkConfig {
            self_ip_port: "me:0".to_string(),
            bootstrap_ip_port: String::new(),
            min_miners: 1,
            update_sys_time_secs: 60,
            time_broadcast_interval_secs: 30,
        }
    }

    #[tokio::test]
    async fn dry_candidate_list_broadcasts_neighbor_request() {
        let table = PeerTable::new();
        let connector = FakeConnector { fail_first: AtomicUsize::new(0) };
        let (cmd_tx, _cmd_rx) = mpsc::channel(8);
        let (_ip_tx, mut ip_rx) = mpsc::channel::<String>(8);
        let (bcast_tx, mut bcast_rx) = mpsc::channel(8);

        run_health_cycle(&config(), &table, &connector, &cmd_tx, &mut ip_rx, &bcast_tx).await;

        let msg = bcast_rx.try_recv().unwrap();
        assert_eq!(NetworkMessage::decode(&msg).unwrap(), NetworkMessage::NeighborRequest);
    }

    #[tokio::test]
    async fn failing_candidates_are_skipped_without_sleeping_again() {
        let table = PeerTable::new();
        let connector = FakeConnector { fail_first: AtomicUsize::new(2) };
        let (cmd_tx, mut cmd_rx) = mpsc::channel(8);
        let (ip_tx, mut ip_rx) = mpsc::channel::<String>(8);
        let (bcast_tx, _bcast_rx) = mpsc::channel(8);

        ip_tx.send("10.0.0.1:1".to_string()).await.unwrap();
        ip_tx.send("10.0.0.2:1".to_string()).await.unwrap();
        ip_tx.send("10.0.0.3:1".to_string()).await.unwrap();

        run_health_cycle(&config(), &table, &connector, &cmd_tx, &mut ip_rx, &bcast_tx).await;

        match cmd_rx.try_recv().unwrap() {
            PeerCommand::Register(handle) => assert_eq!(handle.ip_port(), "10.0.0.3:1"),
            _ => panic!("expected a register command"),
        }
    }

    #[tokio::test]
    async fn already_sufficient_miners_skips_candidate_search() {
        let table = PeerTable::new();
        let (peer, _rx) = PeerHandle::new("1.1.1.1:1", PeerType::Miner);
        table.add(peer);
        let connector = FakeConnector { fail_first: AtomicUsize::new(0) };
        let (cmd_tx, mut cmd_rx) = mpsc::channel(8);
        let (_ip_tx, mut ip_rx) = mpsc::channel::<String>(8);
        let (bcast_tx, mut bcast_rx) = mpsc::channel(8);

        run_health_cycle(&config(), &table, &connector, &cmd_tx, &mut ip_rx, &bcast_tx).await;

        assert!(cmd_rx.try_recv().is_err());
        assert!(bcast_rx.try_recv().is_err());
    }
}
