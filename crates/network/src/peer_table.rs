//! The process-wide peer registry (§4.5, C5).
//!
//! Mirrors the original's `peers` struct: two partitions (miner / client)
//! keyed by `"ip:port"`, plus a dedicated mutex serializing deletion against
//! any send that first needs to resolve "is this peer still registered" —
//! the mutex guarantees no concurrent writer observes a peer mid-removal.
//! `PeerService` is this table's sole mutator (§5, §9: "single-ownership
//! pattern ... must be preserved").

use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};

use crate::peer::{PeerHandle, PeerType};

/// The live set of registered peers, partitioned by role.
#[derive(Default)]
pub struct PeerTable {
    miners: DashMap<String, PeerHandle>,
    clients: DashMap<String, PeerHandle>,
    /// Held across a disconnect's delete-then-close and across the broadcast
    /// path's refresh-then-send, so the two never interleave on the same
    /// peer (§4.5: "the mutex guarantees no concurrent writer can send on a
    /// channel that is about to close").
    close_channel_mutex: Mutex<()>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, peer_type: PeerType) -> &DashMap<String, PeerHandle> {
        match peer_type {
            PeerType::Miner => &self.miners,
            PeerType::Client => &self.clients,
        }
    }

    /// Registers a peer. Called only from `PeerService`'s `register` arm.
    pub fn add(&self, handle: PeerHandle) {
        self.partition(handle.peer_type())
            .insert(handle.ip_port().to_string(), handle);
    }

    /// Removes a peer under the close-channel mutex, dropping this table's
    /// clone of its outbound sender. Called only from `PeerService`'s
    /// `disconnect` arm.
    pub async fn remove(&self, ip_port: &str, peer_type: PeerType) {
        let _guard = self.close_channel_mutex.lock().await;
        self.partition(peer_type).remove(ip_port);
    }

    /// Acquires the close-channel mutex for the duration of a broadcast
    /// send, so it never races a concurrent `remove`.
    pub async fn lock_for_send(&self) -> MutexGuard<'_, ()> {
        self.close_channel_mutex.lock().await
    }

    pub fn contains(&self, ip_port: &str, peer_type: PeerType) -> bool {
        self.partition(peer_type).contains_key(ip_port)
    }

    pub fn get(&self, ip_port: &str, peer_type: PeerType) -> Option<PeerHandle> {
        self.partition(peer_type).get(ip_port).map(|e| e.value().clone())
    }

    pub fn all(&self, peer_type: PeerType) -> Vec<PeerHandle> {
        self.partition(peer_type).iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self, peer_type: PeerType) -> usize {
        self.partition(peer_type).len()
    }

    pub fn is_empty(&self, peer_type: PeerType) -> bool {
        self.len(peer_type) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_then_contains_by_partition() {
        let table = PeerTable::new();
        let (handle, _rx) = PeerHandle::new("10.0.0.1:8080", PeerType::Miner);
        table.add(handle);

        assert!(table.contains("10.0.0.1:8080", PeerType::Miner));
        assert!(!table.contains("10.0.0.1:8080", PeerType::Client));
        assert_eq!(table.len(PeerType::Miner), 1);
    }

    #[tokio::test]
    async fn remove_drops_from_its_partition_only() {
        let table = PeerTable::new();
        let (miner, _rx1) = PeerHandle::new("10.0.0.1:8080", PeerType::Miner);
        let (client, _rx2) = PeerHandle::new("10.0.0.1:8080", PeerType::Client);
        table.add(miner);
        table.add(client);

        table.remove("10.0.0.1:8080", PeerType::Miner).await;

        assert!(!table.contains("10.0.0.1:8080", PeerType::Miner));
        assert!(table.contains("10.0.0.1:8080", PeerType::Client));
    }

    #[tokio::test]
    async fn reconnect_replaces_handle_under_the_same_address() {
        let table = PeerTable::new();
        let (first, _rx1) = PeerHandle::new("10.0.0.1:8080", PeerType::Miner);
        table.add(first.clone());

        let (second, _rx2) = PeerHandle::new("10.0.0.1:8080", PeerType::Miner);
        table.add(second.clone());

        let stored = table.get("10.0.0.1:8080", PeerType::Miner).unwrap();
        assert!(stored.same_channel(&second));
        assert!(!stored.same_channel(&first));
    }
}
