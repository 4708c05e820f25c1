//! The transaction sum type (§3) and its shared capability surface.
//!
//! The original Go source models transactions as an interface
//! (`{Hash, Encode, TxFee, Size, Sender, Receiver, String}`) satisfied by
//! four independent structs, with decoding handled out-of-band because Go
//! cannot express "decode to the concrete variant type" through the
//! interface itself (`examples/original_source/protocol/transaction.go`).
//! Rust has no such restriction, so this is a single tagged `enum` with one
//! inherent `decode` entry point that dispatches on the leading tag byte
//! (§9 design note).

use crate::codec::{from_bytes_canonical, hash_canonical, to_bytes_canonical};
use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The 32-byte content-addressed hash of a transaction.
pub type TxHash = [u8; 32];

/// The tag byte each variant's canonical encoding is prefixed with.
///
/// Bucket routing in `corechain-storage` (§4.1, §6) keys off this same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TxKind {
    /// A value-transfer / contract-call transaction.
    Funds = 0,
    /// An account/contract-deployment transaction.
    Acc = 1,
    /// A parameter-update transaction.
    Config = 2,
    /// A stake-registration transaction.
    Stake = 3,
}

impl TxKind {
    /// The persistence bucket this kind's closed transactions are written
    /// to (§4.1, §6).
    pub fn closed_bucket_name(self) -> &'static str {
        match self {
            TxKind::Funds => "closedfunds",
            TxKind::Acc => "closedaccs",
            TxKind::Config => "closedconfigs",
            TxKind::Stake => "closedstakes",
        }
    }
}

/// A value transfer, and the vehicle for invoking a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsTx {
    /// Fee paid to the block's beneficiary.
    pub fee: u64,
    /// Amount transferred from `sender` to `receiver`.
    pub amount: u64,
    /// The sender's expected next transaction count (replay protection).
    pub tx_count: u32,
    /// Hash of the sending account's address.
    pub sender_hash: [u8; 32],
    /// Hash of the receiving account's address.
    pub receiver_hash: [u8; 32],
    /// Signature over the transaction's signable preimage.
    pub signature: Vec<u8>,
    /// An optional second signature for multi-sig accounts.
    pub multi_sig: Option<Vec<u8>>,
    /// Payload consumed by the callee contract's CALLDATA opcode (§4.3), if
    /// `receiver` is a contract account.
    pub call_data: Option<Vec<u8>>,
}

impl FundsTx {
    /// Canonical bytes of every field except the signature(s) — the
    /// preimage the sender's signature (and, for a multi-sig account, the
    /// co-signer's) is verified against.
    pub fn signable_preimage(&self) -> Result<Vec<u8>, CodecError> {
        to_bytes_canonical(&(
            self.fee,
            self.amount,
            self.tx_count,
            self.sender_hash,
            self.receiver_hash,
            &self.call_data,
        ))
    }
}

/// An account-creation transaction; optionally deploys a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccTx {
    /// Fee paid to the block's beneficiary.
    pub fee: u64,
    /// Address of the newly created account.
    pub account_address: [u8; 32],
    /// Public key of the issuer authorizing this account's creation.
    pub issuer_public_key: Vec<u8>,
    /// Signature from the issuer's private key over the signable preimage.
    pub issuer_signature: Vec<u8>,
    /// Bytecode deployed to the new account, if it is a contract account.
    pub contract_code: Option<Vec<u8>>,
    /// Initial values for the contract's variable slots, if deployed.
    pub initial_contract_variables: Option<Vec<Vec<u8>>>,
}

/// A parameter-update transaction. Only its persistence identity is
/// specified; its payload is an opaque, encoded parameter change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigTx {
    /// Fee paid to the block's beneficiary.
    pub fee: u64,
    /// Monotonic id distinguishing config changes from the same sender.
    pub id: u64,
    /// Hash of the sending account's address.
    pub sender_hash: [u8; 32],
    /// Opaque, encoded parameter-change payload.
    pub payload: Vec<u8>,
    /// Signature over the signable preimage.
    pub signature: Vec<u8>,
}

impl ConfigTx {
    /// Canonical bytes of every field except the signature.
    pub fn signable_preimage(&self) -> Result<Vec<u8>, CodecError> {
        to_bytes_canonical(&(self.fee, self.id, self.sender_hash, &self.payload))
    }
}

/// A stake-registration transaction. Only its persistence identity is
/// specified; its payload is an opaque, encoded stake record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeTx {
    /// Fee paid to the block's beneficiary.
    pub fee: u64,
    /// Hash of the staking account's address.
    pub sender_hash: [u8; 32],
    /// Opaque, encoded stake payload (amount, commitment, ...).
    pub payload: Vec<u8>,
    /// Signature over the signable preimage.
    pub signature: Vec<u8>,
}

impl StakeTx {
    /// Canonical bytes of every field except the signature.
    pub fn signable_preimage(&self) -> Result<Vec<u8>, CodecError> {
        to_bytes_canonical(&(self.fee, self.sender_hash, &self.payload))
    }
}

/// The transaction sum type. All four variants satisfy the capability set
/// from §3: `Hash, Encode, TxFee, Size, Sender, Receiver, String` (here:
/// `hash`, `encode`, `tx_fee`, `size`, `sender`, `receiver`, `Display`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    /// See [`FundsTx`].
    Funds(FundsTx),
    /// See [`AccTx`].
    Acc(AccTx),
    /// See [`ConfigTx`].
    Config(ConfigTx),
    /// See [`StakeTx`].
    Stake(StakeTx),
}

impl Transaction {
    /// The transaction's kind, used for bucket routing and the wire tag.
    pub fn kind(&self) -> TxKind {
        match self {
            Transaction::Funds(_) => TxKind::Funds,
            Transaction::Acc(_) => TxKind::Acc,
            Transaction::Config(_) => TxKind::Config,
            Transaction::Stake(_) => TxKind::Stake,
        }
    }

    /// Canonical encoding: a leading tag byte followed by the variant's
    /// `bincode` body, so that [`Transaction::decode`] can recover the
    /// concrete variant (§9 design note).
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = vec![self.kind() as u8];
        let body = match self {
            Transaction::Funds(t) => to_bytes_canonical(t)?,
            Transaction::Acc(t) => to_bytes_canonical(t)?,
            Transaction::Config(t) => to_bytes_canonical(t)?,
            Transaction::Stake(t) => to_bytes_canonical(t)?,
        };
        out.extend(body);
        Ok(out)
    }

    /// Decodes a transaction previously produced by [`Transaction::encode`],
    /// dispatching on the leading tag byte.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let (&tag, body) = bytes
            .split_first()
            .ok_or_else(|| CodecError::Decode("empty transaction bytes".into()))?;
        Ok(match tag {
            t if t == TxKind::Funds as u8 => Transaction::Funds(from_bytes_canonical(body)?),
            t if t == TxKind::Acc as u8 => Transaction::Acc(from_bytes_canonical(body)?),
            t if t == TxKind::Config as u8 => Transaction::Config(from_bytes_canonical(body)?),
            t if t == TxKind::Stake as u8 => Transaction::Stake(from_bytes_canonical(body)?),
            other => return Err(CodecError::UnknownTag(other)),
        })
    }

    /// The content-addressed hash of the transaction's canonical encoding.
    pub fn hash(&self) -> Result<TxHash, CodecError> {
        match self {
            Transaction::Funds(t) => hash_canonical(t),
            Transaction::Acc(t) => hash_canonical(t),
            Transaction::Config(t) => hash_canonical(t),
            Transaction::Stake(t) => hash_canonical(t),
        }
    }

    /// The fee the transaction pays to the block's beneficiary.
    pub fn tx_fee(&self) -> u64 {
        match self {
            Transaction::Funds(t) => t.fee,
            Transaction::Acc(t) => t.fee,
            Transaction::Config(t) => t.fee,
            Transaction::Stake(t) => t.fee,
        }
    }

    /// The size in bytes of the transaction's canonical encoding.
    pub fn size(&self) -> Result<u64, CodecError> {
        Ok(self.encode()?.len() as u64)
    }

    /// The hash of the sending account's address, if the variant has one.
    pub fn sender(&self) -> Option<[u8; 32]> {
        match self {
            Transaction::Funds(t) => Some(t.sender_hash),
            Transaction::Acc(_) => None,
            Transaction::Config(t) => Some(t.sender_hash),
            Transaction::Stake(t) => Some(t.sender_hash),
        }
    }

    /// The hash of the receiving account's address, if the variant has one.
    pub fn receiver(&self) -> Option<[u8; 32]> {
        match self {
            Transaction::Funds(t) => Some(t.receiver_hash),
            Transaction::Acc(t) => Some(t.account_address),
            Transaction::Config(_) => None,
            Transaction::Stake(_) => None,
        }
    }

    /// The call-data payload carried by a `FundsTx`, if any.
    pub fn call_data(&self) -> Option<&[u8]> {
        match self {
            Transaction::Funds(t) => t.call_data.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Transaction {
    /// A human-readable, one-line summary, matching the original's
    /// `String()` capability (used for structured logging in
    /// `corechain-network` when gossiping a transaction).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transaction::Funds(t) => write!(
                f,
                "FundsTx(fee={}, amount={}, {}->{}{})",
                t.fee,
                t.amount,
                hex::encode(&t.sender_hash[..4]),
                hex::encode(&t.receiver_hash[..4]),
                if t.call_data.is_some() { ", call" } else { "" }
            ),
            Transaction::Acc(t) => write!(
                f,
                "AccTx(fee={}, account={}{})",
                t.fee,
                hex::encode(&t.account_address[..4]),
                if t.contract_code.is_some() {
                    ", contract"
                } else {
                    ""
                }
            ),
            Transaction::Config(t) => write!(f, "ConfigTx(fee={}, id={})", t.fee, t.id),
            Transaction::Stake(t) => write!(
                f,
                "StakeTx(fee={}, sender={})",
                t.fee,
                hex::encode(&t.sender_hash[..4])
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_funds() -> Transaction {
        Transaction::Funds(FundsTx {
            fee: 1,
            amount: 100,
            tx_count: 0,
            sender_hash: [1u8; 32],
            receiver_hash: [2u8; 32],
            signature: vec![9, 9, 9],
            multi_sig: None,
            call_data: Some(vec![0, 15]),
        })
    }

    #[test]
    fn round_trips_every_variant() {
        let txs = vec![
            sample_funds(),
            Transaction::Acc(AccTx {
                fee: 1,
                account_address: [3u8; 32],
                issuer_public_key: vec![1, 2, 3],
                issuer_signature: vec![4, 5, 6],
                contract_code: Some(vec![35, 0, 0, 5, 4, 50]),
                initial_contract_variables: None,
            }),
            Transaction::Config(ConfigTx {
                fee: 1,
                id: 7,
                sender_hash: [4u8; 32],
                payload: vec![1],
                signature: vec![1],
            }),
            Transaction::Stake(StakeTx {
                fee: 1,
                sender_hash: [5u8; 32],
                payload: vec![2],
                signature: vec![2],
            }),
        ];
        for tx in txs {
            let bytes = tx.encode().expect("encode");
            let back = Transaction::decode(&bytes).expect("decode");
            assert_eq!(tx, back);
        }
    }

    #[test]
    fn hash_is_stable_and_unknown_tag_errors() {
        let tx = sample_funds();
        assert_eq!(tx.hash().unwrap(), tx.hash().unwrap());
        assert!(matches!(
            Transaction::decode(&[9, 1, 2, 3]),
            Err(CodecError::UnknownTag(9))
        ));
    }

    #[test]
    fn display_does_not_panic() {
        let s = format!("{}", sample_funds());
        assert!(s.starts_with("FundsTx"));
    }
}
