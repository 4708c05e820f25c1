//! Blocks (§3). A header plus an ordered body of mixed-kind transactions.

use crate::codec::{hash_canonical, to_bytes_canonical};
use crate::error::CodecError;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// The parent hash used by the genesis block (§3: "genesis has parent-hash
/// = zero").
pub const ZERO_HASH: [u8; 32] = [0u8; 32];

/// A block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Hash of the parent block.
    pub parent_hash: [u8; 32],
    /// Merkle root over the ordered transaction list, set by
    /// `finalize_block` (§4.4).
    pub merkle_root: [u8; 32],
    /// Address credited with transaction fees.
    pub beneficiary: [u8; 32],
    /// UNIX timestamp at block creation.
    pub timestamp: u64,
    /// The proof-of-stake seal, set by `finalize_block`.
    pub nonce: u64,
    /// The block's height. `height(b) = height(parent(b)) + 1` (§3
    /// invariant); genesis is height 0 or 1 depending on the caller's
    /// convention — this crate does not special-case the value, only the
    /// successor relationship.
    pub height: u64,
}

/// A block: header plus the ordered transactions it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,
    /// The ordered list of transactions (§3: "ordered list of transactions
    /// of mixed kinds").
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Creates an empty candidate block (`new_block`, §4.4), not yet
    /// finalized: `merkle_root` and `nonce` are placeholders until
    /// [`Block::finalize`] is called.
    pub fn new_candidate(
        parent_hash: [u8; 32],
        beneficiary: [u8; 32],
        timestamp: u64,
        height: u64,
    ) -> Self {
        Self {
            header: BlockHeader {
                parent_hash,
                merkle_root: ZERO_HASH,
                beneficiary,
                timestamp,
                nonce: 0,
                height,
            },
            transactions: Vec::new(),
        }
    }

    /// The canonical genesis block: height 1, zero parent hash, no
    /// transactions (matching the original's `newBlock([32]byte{}, ...,
    /// 1)` convention in `original_source/miner/contract_test.go`).
    pub fn genesis(beneficiary: [u8; 32], timestamp: u64) -> Self {
        Self::new_candidate(ZERO_HASH, beneficiary, timestamp, 1)
    }

    /// Computes the Merkle root over the ordered transaction hashes.
    ///
    /// Uses a simple balanced binary hash tree (duplicate the last node on
    /// an odd level, matching the common Bitcoin-style convention); the
    /// exact tree shape is not constrained beyond
    /// "Merkle root over ordered transactions" (§4.4), so any scheme that
    /// is deterministic and order-sensitive satisfies it.
    pub fn merkle_root(&self) -> Result<[u8; 32], CodecError> {
        let mut level: Vec<[u8; 32]> = self
            .transactions
            .iter()
            .map(Transaction::hash)
            .collect::<Result<_, _>>()?;
        if level.is_empty() {
            return Ok(ZERO_HASH);
        }
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            for pair in level.chunks(2) {
                let (left, right) = (pair[0], *pair.get(1).unwrap_or(&pair[0]));
                let mut buf = Vec::with_capacity(64);
                buf.extend_from_slice(&left);
                buf.extend_from_slice(&right);
                next.push(corechain_crypto::sha256(&buf).map_err(|e| CodecError::Hash(e.to_string()))?);
            }
            level = next;
        }
        Ok(level[0])
    }

    /// Finalizes a candidate block: computes the Merkle root and seals it
    /// with `nonce` (`finalize_block`, §4.4). The nonce is supplied by the
    /// caller's proof-of-stake seal (the PoS sealing algorithm itself is
    /// outside this crate's data-model concern).
    pub fn finalize(&mut self, nonce: u64) -> Result<(), CodecError> {
        self.header.merkle_root = self.merkle_root()?;
        self.header.nonce = nonce;
        Ok(())
    }

    /// The content-addressed block hash: the hash of the header's
    /// canonical encoding (§3: "Identity is the 32-byte hash of the
    /// canonical encoding").
    pub fn hash(&self) -> Result<[u8; 32], CodecError> {
        hash_canonical(&self.header)
    }

    /// The block's canonical encoding.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        to_bytes_canonical(self)
    }

    /// Decodes a block previously produced by [`Block::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        crate::codec::from_bytes_canonical(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{FundsTx, Transaction};

    fn funds_tx(n: u8) -> Transaction {
        Transaction::Funds(FundsTx {
            fee: 1,
            amount: n as u64,
            tx_count: 0,
            sender_hash: [n; 32],
            receiver_hash: [n.wrapping_add(1); 32],
            signature: vec![n],
            multi_sig: None,
            call_data: None,
        })
    }

    #[test]
    fn genesis_has_zero_parent_and_height_one() {
        let b = Block::genesis([0u8; 32], 0);
        assert_eq!(b.header.parent_hash, ZERO_HASH);
        assert_eq!(b.header.height, 1);
    }

    #[test]
    fn empty_block_merkle_root_is_zero() {
        let b = Block::new_candidate(ZERO_HASH, [0u8; 32], 0, 1);
        assert_eq!(b.merkle_root().unwrap(), ZERO_HASH);
    }

    #[test]
    fn merkle_root_is_order_sensitive() {
        let mut a = Block::new_candidate(ZERO_HASH, [0u8; 32], 0, 1);
        a.transactions = vec![funds_tx(1), funds_tx(2)];
        let mut b = a.clone();
        b.transactions.reverse();
        assert_ne!(a.merkle_root().unwrap(), b.merkle_root().unwrap());
    }

    #[test]
    fn encode_decode_round_trips() {
        let mut b = Block::new_candidate(ZERO_HASH, [1u8; 32], 100, 1);
        b.transactions.push(funds_tx(3));
        b.finalize(7).unwrap();
        let bytes = b.encode().unwrap();
        let back = Block::decode(&bytes).unwrap();
        assert_eq!(b, back);
    }
}
