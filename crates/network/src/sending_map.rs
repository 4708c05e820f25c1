//! Per-peer delayed-message queues (§4.5, §8 scenario 5).
//!
//! Mirrors the original's package-level `sendingMap`: one entry per miner
//! peer ever seen, carrying the messages that couldn't be delivered while
//! the peer was disconnected. A reconnect creates a fresh `PeerHandle` at
//! the same address; `refresh` swaps it in while leaving the delayed queue
//! untouched, matching `isConnectionAlreadyInSendingMap`'s "peer behind the
//! IP+Port changed" update path.

use std::collections::{HashMap, VecDeque};

use tokio::sync::Mutex;

use crate::peer::PeerHandle;

/// The delayed-queue depth cap (§5, §9: "preserve both thresholds
/// literally").
pub const DELAYED_QUEUE_CAPACITY: usize = 40;

struct Entry {
    peer: PeerHandle,
    delayed: VecDeque<Vec<u8>>,
}

/// The live set of per-peer delayed-message queues.
#[derive(Default)]
pub struct SendingMap {
    entries: Mutex<HashMap<String, Entry>>,
}

impl SendingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures an entry exists for `peer`'s address, refreshing the stored
    /// handle if a previous connection at the same address used a different
    /// channel. The delayed queue survives the refresh untouched.
    pub async fn refresh(&self, peer: PeerHandle) {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(peer.ip_port()) {
            Some(entry) if entry.peer.same_channel(&peer) => {}
            Some(entry) => entry.peer = peer,
            None => {
                entries.insert(
                    peer.ip_port().to_string(),
                    Entry {
                        peer,
                        delayed: VecDeque::new(),
                    },
                );
            }
        }
    }

    /// Every address this map currently tracks a delayed queue for.
    pub async fn known_addresses(&self) -> Vec<String> {
        self.entries.lock().await.keys().cloned().collect()
    }

    /// Appends `msg` to `ip_port`'s delayed queue, evicting the oldest entry
    /// first if already at capacity.
    pub async fn queue_delayed(&self, ip_port: &str, msg: Vec<u8>) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(ip_port) {
            if entry.delayed.len() >= DELAYED_QUEUE_CAPACITY {
                entry.delayed.pop_front();
            }
            entry.delayed.push_back(msg);
        }
    }

    /// Drains as much of the delayed queue as the outbound channel has room
    /// for, in FIFO order, then pushes `msg` — so a reconnect replays
    /// history before the newly broadcast message (§8 scenario 5). Stops
    /// draining at the first message that doesn't fit rather than skipping
    /// past it, so ordering is never disturbed by a momentarily full
    /// channel.
    pub async fn send_live_and_flush(&self, ip_port: &str, msg: Vec<u8>) {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(ip_port) else {
            return;
        };
        while let Some(front) = entry.delayed.front() {
            if entry.peer.try_send(front.clone()) {
                entry.delayed.pop_front();
            } else {
                break;
            }
        }
        entry.peer.try_send(msg);
    }

    /// The delayed queue currently held for `ip_port`, for inspection in
    /// tests.
    #[cfg(test)]
    pub async fn delayed_snapshot(&self, ip_port: &str) -> Vec<Vec<u8>> {
        self.entries
            .lock()
            .await
            .get(ip_port)
            .map(|e| e.delayed.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::PeerType;

    #[tokio::test]
    async fn delayed_queue_is_bounded_with_fifo_eviction() {
        let map = SendingMap::new();
        let (peer, _rx) = PeerHandle::new("10.0.0.1:8080", PeerType::Miner);
        map.refresh(peer).await;

        for i in 0..45u8 {
            map.queue_delayed("10.0.0.1:8080", vec![i]).await;
        }

        let snapshot = map.delayed_snapshot("10.0.0.1:8080").await;
        assert_eq!(snapshot.len(), DELAYED_QUEUE_CAPACITY);
        assert_eq!(snapshot.first(), Some(&vec![5u8]));
        assert_eq!(snapshot.last(), Some(&vec![44u8]));
    }

    #[tokio::test]
    async fn reconnect_preserves_delayed_order_then_delivers_the_new_message() {
        let map = SendingMap::new();
        let (first, _rx1) = PeerHandle::new("10.0.0.1:8080", PeerType::Miner);
        map.refresh(first).await;

        map.queue_delayed("10.0.0.1:8080", vec![1]).await;
        map.queue_delayed("10.0.0.1:8080", vec![2]).await;
        map.queue_delayed("10.0.0.1:8080", vec![3]).await;

        let (second, mut rx2) = PeerHandle::new("10.0.0.1:8080", PeerType::Miner);
        map.refresh(second).await;

        map.send_live_and_flush("10.0.0.1:8080", vec![4]).await;

        let mut received = Vec::new();
        while let Ok(msg) = rx2.try_recv() {
            received.push(msg);
        }
        assert_eq!(received, vec![vec![1u8], vec![2], vec![3], vec![4]]);
        assert!(map.delayed_snapshot("10.0.0.1:8080").await.is_empty());
    }
}
