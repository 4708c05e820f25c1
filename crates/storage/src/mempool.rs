//! The open and invalid transaction pools (`WriteOpenTx` /
//! `WriteINVALIDOpenTx` in `original_source/storage/write.go`): a
//! lock-free, concurrent map of not-yet-mined transactions keyed by hash,
//! and a second map holding transactions admission has rejected (kept for
//! diagnostics, not retried).

use dashmap::DashMap;
use tracing::debug;

use corechain_types::{Transaction, TxHash};

/// The mempool (§3, C1): a concurrent map of open transactions, plus a
/// side pool of transactions that failed admission.
#[derive(Default)]
pub struct Mempool {
    open: DashMap<TxHash, Transaction>,
    invalid: DashMap<TxHash, Transaction>,
}

impl Mempool {
    /// Creates an empty mempool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `tx` to the open pool (`WriteOpenTx`).
    pub fn write_open_tx(&self, tx: Transaction) -> Result<(), corechain_types::CodecError> {
        let hash = tx.hash()?;
        self.open.insert(hash, tx);
        debug!(open_pool_size = self.open.len(), "mempool size");
        Ok(())
    }

    /// Moves a transaction that failed admission into the invalid pool
    /// (`WriteINVALIDOpenTx`).
    pub fn write_invalid_open_tx(&self, tx: Transaction) -> Result<(), corechain_types::CodecError> {
        let hash = tx.hash()?;
        self.open.remove(&hash);
        self.invalid.insert(hash, tx);
        Ok(())
    }

    /// Removes and returns the open transaction with `hash`, if present.
    /// Used by `finalize_block` (§4.4) to pull transactions out of the
    /// pool as it fills a candidate block.
    pub fn take_open(&self, hash: &TxHash) -> Option<Transaction> {
        self.open.remove(hash).map(|(_, tx)| tx)
    }

    /// Returns a snapshot of every transaction currently in the open pool,
    /// in no particular order.
    pub fn open_snapshot(&self) -> Vec<Transaction> {
        self.open.iter().map(|e| e.value().clone()).collect()
    }

    /// The number of transactions currently in the open pool.
    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// The number of transactions currently in the invalid pool.
    pub fn invalid_len(&self) -> usize {
        self.invalid.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corechain_types::FundsTx;

    fn sample_tx(amount: u64) -> Transaction {
        Transaction::Funds(FundsTx {
            fee: 1,
            amount,
            tx_count: 0,
            sender_hash: [1u8; 32],
            receiver_hash: [2u8; 32],
            signature: vec![],
            multi_sig: None,
            call_data: None,
        })
    }

    #[test]
    fn open_tx_round_trips_through_take() {
        let pool = Mempool::new();
        let tx = sample_tx(10);
        let hash = tx.hash().unwrap();
        pool.write_open_tx(tx.clone()).unwrap();
        assert_eq!(pool.open_len(), 1);
        assert_eq!(pool.take_open(&hash), Some(tx));
        assert_eq!(pool.open_len(), 0);
    }

    #[test]
    fn invalid_tx_is_removed_from_open_pool() {
        let pool = Mempool::new();
        let tx = sample_tx(20);
        let hash = tx.hash().unwrap();
        pool.write_open_tx(tx.clone()).unwrap();
        pool.write_invalid_open_tx(tx).unwrap();
        assert_eq!(pool.open_len(), 0);
        assert_eq!(pool.invalid_len(), 1);
        assert_eq!(pool.take_open(&hash), None);
    }

    #[test]
    fn open_snapshot_reflects_current_contents() {
        let pool = Mempool::new();
        pool.write_open_tx(sample_tx(1)).unwrap();
        pool.write_open_tx(sample_tx(2)).unwrap();
        assert_eq!(pool.open_snapshot().len(), 2);
    }
}
