//! The received-block stash (§3, §4.1): a bounded, deduplicating FIFO of
//! recently-seen block hashes, used so the P2P overlay does not re-relay a
//! block it has already processed.
//!
//! Grounded directly in `original_source/storage/write.go`'s
//! `WriteToReceivedStash` / `blockAlreadyInStash`: insertion is a no-op on a
//! hash already present, and the oldest entry is evicted once the stash
//! exceeds 50 entries.

use std::collections::VecDeque;
use std::sync::Mutex;

/// The stash's fixed capacity (§3, §6).
pub const STASH_CAPACITY: usize = 50;

/// A bounded, deduplicating FIFO of block hashes.
#[derive(Default)]
pub struct ReceivedBlockStash {
    hashes: Mutex<VecDeque<[u8; 32]>>,
}

impl ReceivedBlockStash {
    /// Creates an empty stash.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `hash`, evicting the oldest entry if the stash is at
    /// capacity. A no-op if `hash` is already present (§4.1: "Insertion is
    /// idempotent on a hash that is already present").
    pub fn insert(&self, hash: [u8; 32]) {
        let mut hashes = self.hashes.lock().unwrap_or_else(|e| e.into_inner());
        if hashes.contains(&hash) {
            return;
        }
        if hashes.len() >= STASH_CAPACITY {
            hashes.pop_front();
        }
        hashes.push_back(hash);
    }

    /// Reports whether `hash` is currently present in the stash.
    pub fn contains(&self, hash: &[u8; 32]) -> bool {
        self.hashes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(hash)
    }

    /// The current number of entries (always `<= STASH_CAPACITY`).
    pub fn len(&self) -> usize {
        self.hashes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the stash currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(n: u8) -> [u8; 32] {
        let mut h = [0u8; 32];
        h[0] = n;
        h
    }

    #[test]
    fn bounded_at_fifty_with_fifo_eviction() {
        let stash = ReceivedBlockStash::new();
        for n in 0..60u16 {
            let mut h = [0u8; 32];
            h[0] = (n & 0xff) as u8;
            h[1] = (n >> 8) as u8;
            stash.insert(h);
        }
        assert_eq!(stash.len(), STASH_CAPACITY);
        // The first 10 inserted hashes should have been evicted.
        let mut evicted = [0u8; 32];
        evicted[0] = 0;
        evicted[1] = 0;
        assert!(!stash.contains(&evicted));
        let mut kept = [0u8; 32];
        kept[0] = 59;
        assert!(stash.contains(&kept));
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let stash = ReceivedBlockStash::new();
        stash.insert(hash(1));
        stash.insert(hash(2));
        let len_before = stash.len();
        stash.insert(hash(1));
        assert_eq!(stash.len(), len_before);
    }
}
