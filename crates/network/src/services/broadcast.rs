//! `MinerBroadcastService`, `ClientBroadcastService`, and
//! `SendAndSearchMessages` (§4.5).
//!
//! Miner gossip (blocks, transactions, time sync) goes through the
//! sending map so a disconnected miner's messages queue up for replay on
//! reconnect (§8 scenario 5); client gossip has no such replay and is
//! simply dropped for a peer that is not currently connected (§4.5:
//! "checking membership at send time").

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{instrument, trace, warn};

use crate::peer::PeerType;
use crate::peer_table::PeerTable;
use crate::sending_map::SendingMap;

/// For every address the sending map currently tracks: if it is presently
/// a connected miner peer, flush its delayed queue and deliver `msg` live;
/// otherwise append `msg` to its delayed queue (§4.5). Held under the
/// table's close-channel mutex so a concurrent disconnect can't observe a
/// half-sent peer.
#[instrument(skip(table, sending_map, msg))]
pub async fn send_and_search_messages(table: &PeerTable, sending_map: &SendingMap, msg: &[u8]) {
    let _guard = table.lock_for_send().await;
    for ip_port in sending_map.known_addresses().await {
        if table.contains(&ip_port, PeerType::Miner) {
            sending_map.send_live_and_flush(&ip_port, msg.to_vec()).await;
        } else {
            sending_map.queue_delayed(&ip_port, msg.to_vec()).await;
        }
    }
}

/// Consumes messages meant for every miner peer (block/tx gossip, time
/// sync) and hands each to [`send_and_search_messages`] — the "sender
/// coroutine" the original spawns per broadcast (§4.5).
#[instrument(skip(table, sending_map, inbound))]
pub async fn miner_broadcast_service(
    table: Arc<PeerTable>,
    sending_map: Arc<SendingMap>,
    mut inbound: mpsc::Receiver<Vec<u8>>,
) {
    while let Some(msg) = inbound.recv().await {
        trace!(len = msg.len(), "miner broadcast");
        send_and_search_messages(&table, &sending_map, &msg).await;
    }
}

/// Consumes messages meant for every connected client peer, forwarding
/// each directly to every client's outbound channel (no delayed queue —
/// client peers do not get replay on reconnect). Membership is checked at
/// send time, guarded by the table's close-channel mutex so a peer can't
/// disconnect mid-send (§4.5).
#[instrument(skip(table, inbound))]
pub async fn client_broadcast_service(table: Arc<PeerTable>, mut inbound: mpsc::Receiver<Vec<u8>>) {
    while let Some(msg) = inbound.recv().await {
        let _guard = table.lock_for_send().await;
        for peer in table.all(PeerType::Client) {
            if !peer.try_send(msg.clone()) {
                warn!(ip_port = peer.ip_port(), "client outbound channel full, dropping broadcast");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::PeerHandle;

    #[tokio::test]
    async fn connected_miner_gets_live_delivery() {
        let table = PeerTable::new();
        let sending_map = SendingMap::new();
        let (peer, mut rx) = PeerHandle::new("10.0.0.1:9000", PeerType::Miner);
        sending_map.refresh(peer.clone()).await;
        table.add(peer);

        send_and_search_messages(&table, &sending_map, b"hello").await;

        assert_eq!(rx.try_recv().unwrap(), b"hello".to_vec());
    }

    #[tokio::test]
    async fn disconnected_miner_is_queued_not_dropped() {
        let table = PeerTable::new();
        let sending_map = SendingMap::new();
        let (peer, _rx) = PeerHandle::new("10.0.0.1:9000", PeerType::Miner);
        sending_map.refresh(peer).await;

        send_and_search_messages(&table, &sending_map, b"hello").await;

        assert_eq!(sending_map.delayed_snapshot("10.0.0.1:9000").await, vec![b"hello".to_vec()]);
    }

    #[tokio::test]
    async fn client_broadcast_forwards_to_every_connected_client() {
        let table = Arc::new(PeerTable::new());
        let (client_a, mut rx_a) = PeerHandle::new("10.0.0.1:1", PeerType::Client);
        let (client_b, mut rx_b) = PeerHandle::new("10.0.0.1:2", PeerType::Client);
        table.add(client_a);
        table.add(client_b);

        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(client_broadcast_service(table.clone(), rx));
        tx.send(b"packet".to_vec()).await.unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(rx_a.try_recv().unwrap(), b"packet".to_vec());
        assert_eq!(rx_b.try_recv().unwrap(), b"packet".to_vec());
    }
}
