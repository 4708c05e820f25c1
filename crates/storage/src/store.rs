//! The persistent store: seven content-addressed buckets backed by `redb`
//! (§3, §4.1, §6), plus the account table the pipeline reads and writes as
//! it applies closed blocks.
//!
//! Bucket routing follows a write-path split by transaction kind (open
//! block, closed block, last-closed-block pointer, and closed funds/accs
//! /configs/stakes), using the `redb::{Database, TableDefinition}` usage
//! pattern common to other embedded-KV stores — simplified here to
//! synchronous, per-call transactions since this store has no
//! epoch/pruning concept to amortize against a background thread.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};
use tracing::instrument;

use corechain_types::{Account, Block, CodecError, Transaction, TxKind};

use crate::error::StorageError;

const OPEN_BLOCKS: TableDefinition<&[u8; 32], &[u8]> = TableDefinition::new("openblocks");
const CLOSED_BLOCKS: TableDefinition<&[u8; 32], &[u8]> = TableDefinition::new("closedblocks");
const LAST_CLOSED_BLOCK: TableDefinition<&str, &[u8]> = TableDefinition::new("lastclosedblock");
const CLOSED_FUNDS: TableDefinition<&[u8; 32], &[u8]> = TableDefinition::new("closedfunds");
const CLOSED_ACCS: TableDefinition<&[u8; 32], &[u8]> = TableDefinition::new("closedaccs");
const CLOSED_CONFIGS: TableDefinition<&[u8; 32], &[u8]> = TableDefinition::new("closedconfigs");
const CLOSED_STAKES: TableDefinition<&[u8; 32], &[u8]> = TableDefinition::new("closedstakes");
const ACCOUNTS: TableDefinition<&[u8; 32], &[u8]> = TableDefinition::new("accounts");

/// The single key under which [`Store::write_last_closed_block`] stores its
/// value; the bucket only ever holds one entry (§4.1).
const LAST_CLOSED_BLOCK_KEY: &str = "last";

fn backend<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Backend(e.to_string())
}

fn decode<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Decode(e.to_string())
}

/// The persistent store (§3, C1). Wraps a `redb::Database` and exposes the
/// bucket operations described in §4.1 and §6.
pub struct Store {
    db: Database,
}

impl Store {
    /// Opens (creating if absent) the database at `path` and ensures every
    /// bucket exists.
    #[instrument(skip(path))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = Database::create(path).map_err(backend)?;
        {
            let w = db.begin_write().map_err(backend)?;
            w.open_table(OPEN_BLOCKS).map_err(backend)?;
            w.open_table(CLOSED_BLOCKS).map_err(backend)?;
            w.open_table(LAST_CLOSED_BLOCK).map_err(backend)?;
            w.open_table(CLOSED_FUNDS).map_err(backend)?;
            w.open_table(CLOSED_ACCS).map_err(backend)?;
            w.open_table(CLOSED_CONFIGS).map_err(backend)?;
            w.open_table(CLOSED_STAKES).map_err(backend)?;
            w.open_table(ACCOUNTS).map_err(backend)?;
            w.commit().map_err(backend)?;
        }
        Ok(Self { db })
    }

    /// Writes a not-yet-finalized candidate block (`WriteOpenBlock`, §4.1).
    #[instrument(skip(self, block))]
    pub fn write_open_block(&self, block: &Block) -> Result<(), StorageError> {
        let hash = block.hash().map_err(|e| decode(fmt_codec(e)))?;
        let bytes = block.encode().map_err(|e| decode(fmt_codec(e)))?;
        let w = self.db.begin_write().map_err(backend)?;
        {
            let mut t = w.open_table(OPEN_BLOCKS).map_err(backend)?;
            t.insert(&hash, bytes.as_slice()).map_err(backend)?;
        }
        w.commit().map_err(backend)
    }

    /// Reads an open (not yet closed) block by hash.
    #[instrument(skip(self))]
    pub fn read_open_block(&self, hash: &[u8; 32]) -> Result<Option<Block>, StorageError> {
        self.read_block_from(OPEN_BLOCKS, hash)
    }

    /// Moves a block from open to closed (`WriteClosedBlock`, §4.1): the
    /// block is now part of the canonical chain.
    #[instrument(skip(self, block))]
    pub fn write_closed_block(&self, block: &Block) -> Result<(), StorageError> {
        let hash = block.hash().map_err(|e| decode(fmt_codec(e)))?;
        let bytes = block.encode().map_err(|e| decode(fmt_codec(e)))?;
        let w = self.db.begin_write().map_err(backend)?;
        {
            let mut closed = w.open_table(CLOSED_BLOCKS).map_err(backend)?;
            closed.insert(&hash, bytes.as_slice()).map_err(backend)?;
            let mut open = w.open_table(OPEN_BLOCKS).map_err(backend)?;
            open.remove(&hash).map_err(backend)?;
        }
        w.commit().map_err(backend)
    }

    /// Reads a closed block by hash.
    #[instrument(skip(self))]
    pub fn read_closed_block(&self, hash: &[u8; 32]) -> Result<Option<Block>, StorageError> {
        self.read_block_from(CLOSED_BLOCKS, hash)
    }

    /// Records `block` as the chain tip (`WriteLastClosedBlock`, §4.1).
    #[instrument(skip(self, block))]
    pub fn write_last_closed_block(&self, block: &Block) -> Result<(), StorageError> {
        let bytes = block.encode().map_err(|e| decode(fmt_codec(e)))?;
        let w = self.db.begin_write().map_err(backend)?;
        {
            let mut t = w.open_table(LAST_CLOSED_BLOCK).map_err(backend)?;
            t.insert(LAST_CLOSED_BLOCK_KEY, bytes.as_slice())
                .map_err(backend)?;
        }
        w.commit().map_err(backend)
    }

    /// Reads the current chain tip, if the store has ever closed a block.
    #[instrument(skip(self))]
    pub fn read_last_closed_block(&self) -> Result<Option<Block>, StorageError> {
        let r = self.db.begin_read().map_err(backend)?;
        let t = r.open_table(LAST_CLOSED_BLOCK).map_err(backend)?;
        match t.get(LAST_CLOSED_BLOCK_KEY).map_err(backend)? {
            None => Ok(None),
            Some(v) => Block::decode(v.value()).map(Some).map_err(|e| decode(fmt_codec(e))),
        }
    }

    /// Writes a closed (finalized, chain-included) transaction to the
    /// bucket named by its kind (`WriteClosedTx`'s bucket-routing switch,
    /// §4.1, §6).
    #[instrument(skip(self, tx))]
    pub fn write_closed_tx(&self, tx: &Transaction) -> Result<(), StorageError> {
        let hash = tx.hash().map_err(|e| decode(fmt_codec(e)))?;
        let bytes = tx.encode().map_err(|e| decode(fmt_codec(e)))?;
        let w = self.db.begin_write().map_err(backend)?;
        {
            match tx.kind() {
                TxKind::Funds => {
                    let mut t = w.open_table(CLOSED_FUNDS).map_err(backend)?;
                    t.insert(&hash, bytes.as_slice()).map_err(backend)?;
                }
                TxKind::Acc => {
                    let mut t = w.open_table(CLOSED_ACCS).map_err(backend)?;
                    t.insert(&hash, bytes.as_slice()).map_err(backend)?;
                }
                TxKind::Config => {
                    let mut t = w.open_table(CLOSED_CONFIGS).map_err(backend)?;
                    t.insert(&hash, bytes.as_slice()).map_err(backend)?;
                }
                TxKind::Stake => {
                    let mut t = w.open_table(CLOSED_STAKES).map_err(backend)?;
                    t.insert(&hash, bytes.as_slice()).map_err(backend)?;
                }
            }
        }
        w.commit().map_err(backend)
    }

    /// Reads a closed transaction of the given kind by hash.
    #[instrument(skip(self))]
    pub fn read_closed_tx(
        &self,
        kind: TxKind,
        hash: &[u8; 32],
    ) -> Result<Option<Transaction>, StorageError> {
        let r = self.db.begin_read().map_err(backend)?;
        let raw = match kind {
            TxKind::Funds => r.open_table(CLOSED_FUNDS).map_err(backend)?.get(hash),
            TxKind::Acc => r.open_table(CLOSED_ACCS).map_err(backend)?.get(hash),
            TxKind::Config => r.open_table(CLOSED_CONFIGS).map_err(backend)?.get(hash),
            TxKind::Stake => r.open_table(CLOSED_STAKES).map_err(backend)?.get(hash),
        }
        .map_err(backend)?
        .map(|v| v.value().to_vec());
        match raw {
            None => Ok(None),
            Some(bytes) => Transaction::decode(&bytes)
                .map(Some)
                .map_err(|e| decode(fmt_codec(e))),
        }
    }

    /// Reads or initializes an account by address: a fresh non-contract
    /// account with zero balance if the address has never been written.
    #[instrument(skip(self))]
    pub fn get_account(&self, address: &[u8; 32]) -> Result<Account, StorageError> {
        let r = self.db.begin_read().map_err(backend)?;
        let t = r.open_table(ACCOUNTS).map_err(backend)?;
        match t.get(address).map_err(backend)? {
            None => Ok(Account::new(*address)),
            Some(v) => corechain_types::codec::from_bytes_canonical(v.value())
                .map_err(|e| decode(fmt_codec(e))),
        }
    }

    /// Writes the full state of an account (balance, tx_count, contract
    /// slots) back to the store. Called by the pipeline after applying a
    /// block's transactions (§3, C6).
    #[instrument(skip(self, account))]
    pub fn put_account(&self, account: &Account) -> Result<(), StorageError> {
        let bytes =
            corechain_types::codec::to_bytes_canonical(account).map_err(|e| decode(fmt_codec(e)))?;
        let w = self.db.begin_write().map_err(backend)?;
        {
            let mut t = w.open_table(ACCOUNTS).map_err(backend)?;
            t.insert(&account.address, bytes.as_slice()).map_err(backend)?;
        }
        w.commit().map_err(backend)
    }

    /// Returns every account currently known to the store.
    #[instrument(skip(self))]
    pub fn get_all_accounts(&self) -> Result<Vec<Account>, StorageError> {
        let r = self.db.begin_read().map_err(backend)?;
        let t = r.open_table(ACCOUNTS).map_err(backend)?;
        let mut out = Vec::new();
        for entry in t.iter().map_err(backend)? {
            let (_, v) = entry.map_err(backend)?;
            let account: Account = corechain_types::codec::from_bytes_canonical(v.value())
                .map_err(|e| decode(fmt_codec(e)))?;
            out.push(account);
        }
        Ok(out)
    }

    fn read_block_from(
        &self,
        table: TableDefinition<&[u8; 32], &[u8]>,
        hash: &[u8; 32],
    ) -> Result<Option<Block>, StorageError> {
        let r = self.db.begin_read().map_err(backend)?;
        let t = r.open_table(table).map_err(backend)?;
        match t.get(hash).map_err(backend)? {
            None => Ok(None),
            Some(v) => Block::decode(v.value()).map(Some).map_err(|e| decode(fmt_codec(e))),
        }
    }
}

fn fmt_codec(e: CodecError) -> String {
    e.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use corechain_types::block::ZERO_HASH;

    fn temp_store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(dir.path().join("store.redb")).expect("open");
        (store, dir)
    }

    #[test]
    fn open_block_round_trips_then_moves_to_closed() {
        let (store, _dir) = temp_store();
        let block = Block::new_candidate(ZERO_HASH, [1u8; 32], 10, 1);
        let hash = block.hash().unwrap();
        store.write_open_block(&block).unwrap();
        assert_eq!(store.read_open_block(&hash).unwrap(), Some(block.clone()));

        store.write_closed_block(&block).unwrap();
        assert_eq!(store.read_open_block(&hash).unwrap(), None);
        assert_eq!(store.read_closed_block(&hash).unwrap(), Some(block));
    }

    #[test]
    fn last_closed_block_is_a_single_slot() {
        let (store, _dir) = temp_store();
        assert_eq!(store.read_last_closed_block().unwrap(), None);
        let first = Block::new_candidate(ZERO_HASH, [1u8; 32], 1, 1);
        let second = Block::new_candidate(ZERO_HASH, [2u8; 32], 2, 2);
        store.write_last_closed_block(&first).unwrap();
        store.write_last_closed_block(&second).unwrap();
        assert_eq!(store.read_last_closed_block().unwrap(), Some(second));
    }

    #[test]
    fn closed_tx_routes_by_kind() {
        use corechain_types::{FundsTx, StakeTx, Transaction};
        let (store, _dir) = temp_store();
        let funds = Transaction::Funds(FundsTx {
            fee: 1,
            amount: 1,
            tx_count: 0,
            sender_hash: [1u8; 32],
            receiver_hash: [2u8; 32],
            signature: vec![],
            multi_sig: None,
            call_data: None,
        });
        let stake = Transaction::Stake(StakeTx {
            fee: 1,
            sender_hash: [3u8; 32],
            payload: vec![1],
            signature: vec![],
        });
        store.write_closed_tx(&funds).unwrap();
        store.write_closed_tx(&stake).unwrap();

        let funds_hash = funds.hash().unwrap();
        let stake_hash = stake.hash().unwrap();
        assert_eq!(
            store.read_closed_tx(TxKind::Funds, &funds_hash).unwrap(),
            Some(funds)
        );
        assert_eq!(
            store.read_closed_tx(TxKind::Stake, &stake_hash).unwrap(),
            Some(stake)
        );
        assert_eq!(store.read_closed_tx(TxKind::Funds, &stake_hash).unwrap(), None);
    }

    #[test]
    fn unknown_account_reads_as_fresh_and_round_trips_after_put() {
        let (store, _dir) = temp_store();
        let addr = [7u8; 32];
        let fresh = store.get_account(&addr).unwrap();
        assert_eq!(fresh.balance, 0);

        let mut acc = fresh;
        acc.balance = 50;
        acc.tx_count = 1;
        store.put_account(&acc).unwrap();

        let reloaded = store.get_account(&addr).unwrap();
        assert_eq!(reloaded, acc);
        assert_eq!(store.get_all_accounts().unwrap(), vec![acc]);
    }
}
