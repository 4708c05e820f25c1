//! `PeerService` (§4.5): the sole task permitted to mutate the
//! [`crate::PeerTable`]. Every other service reads the table directly (it
//! is safe for concurrent readers) but routes additions and removals
//! through this task's command channel, so peer-set mutations are totally
//! ordered (§5).

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, instrument};

use crate::peer::{PeerHandle, PeerType};
use crate::peer_table::PeerTable;
use crate::sending_map::SendingMap;

/// A request to mutate the peer table, sent by any other service.
pub enum PeerCommand {
    /// A new peer finished its handshake and should be tracked.
    Register(PeerHandle),
    /// A peer disconnected (or was dropped) and should be removed.
    Disconnect { ip_port: String, peer_type: PeerType },
}

/// Runs until `commands` is closed, applying each [`PeerCommand`] to
/// `table` in arrival order. Registration also refreshes `sending_map`'s
/// per-peer delayed-queue entry (§4.5: "preserving the existing delayed
/// message queue" on reconnect).
#[instrument(skip(table, sending_map, commands))]
pub async fn peer_service(
    table: Arc<PeerTable>,
    sending_map: Arc<SendingMap>,
    mut commands: mpsc::Receiver<PeerCommand>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            PeerCommand::Register(handle) => {
                info!(ip_port = handle.ip_port(), peer_type = ?handle.peer_type(), "peer registered");
                if handle.peer_type() == PeerType::Miner {
                    sending_map.refresh(handle.clone()).await;
                }
                table.add(handle);
            }
            PeerCommand::Disconnect { ip_port, peer_type } => {
                info!(ip_port = %ip_port, peer_type = ?peer_type, "peer disconnected");
                table.remove(&ip_port, peer_type).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_then_disconnect_is_applied_in_order() {
        let table = Arc::new(PeerTable::new());
        let sending_map = Arc::new(SendingMap::new());
        let (tx, rx) = mpsc::channel(8);
        let handle_task = tokio::spawn(peer_service(table.clone(), sending_map, rx));

        let (peer, _recv) = PeerHandle::new("127.0.0.1:9000", PeerType::Miner);
        tx.send(PeerCommand::Register(peer)).await.unwrap();
        tx.send(PeerCommand::Disconnect {
            ip_port: "127.0.0.1:9000".to_string(),
            peer_type: PeerType::Miner,
        })
        .await
        .unwrap();
        drop(tx);
        handle_task.await.unwrap();

        assert!(!table.contains("127.0.0.1:9000", PeerType::Miner));
    }
}
