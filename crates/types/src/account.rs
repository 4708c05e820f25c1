//! Per-account persistent state (§3, C6).

use crate::codec::hash_canonical;
use crate::error::CodecError;
use serde::{Deserialize, Serialize};

/// An account: a balance, a replay-protection counter, and — for contract
/// accounts — deployed bytecode plus its variable slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account's 32-byte address.
    pub address: [u8; 32],
    /// The account's spendable balance.
    pub balance: u64,
    /// The number of transactions this account has sent; the next
    /// `FundsTx` from this account must carry `tx_count` equal to this
    /// value (§4.4 admission rules).
    pub tx_count: u32,
    /// Deployed contract bytecode, if this is a contract account.
    pub contract_code: Option<Vec<u8>>,
    /// Ordered contract-variable slots; slot 0 is the first declared state
    /// variable. A slot's bytes may themselves encode a [`crate::map::Map`].
    pub contract_variables: Vec<Vec<u8>>,
    /// The public key the issuing `AccTx` authorized this address with.
    /// Every later `FundsTx`/`ConfigTx`/`StakeTx` naming this account as
    /// sender must carry a signature verifiable against this key (§4.4
    /// "verify signatures"). Empty for an account that was never created
    /// through the normal admission path (e.g. a fresh read-through
    /// default) — such an account can never pass a signature check.
    pub public_key: Vec<u8>,
}

impl Account {
    /// Creates a plain (non-contract) account with zero balance and no
    /// authorized signing key. Use [`Account::with_public_key`] once the
    /// issuing `AccTx`'s key is known.
    pub fn new(address: [u8; 32]) -> Self {
        Self {
            address,
            balance: 0,
            tx_count: 0,
            contract_code: None,
            contract_variables: Vec::new(),
            public_key: Vec::new(),
        }
    }

    /// Creates a contract account with the given deployed bytecode and
    /// initial variable slots.
    pub fn new_contract(
        address: [u8; 32],
        contract_code: Vec<u8>,
        contract_variables: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            address,
            balance: 0,
            tx_count: 0,
            contract_code: Some(contract_code),
            contract_variables,
            public_key: Vec::new(),
        }
    }

    /// Binds the public key later `FundsTx`/`ConfigTx`/`StakeTx` signatures
    /// from this account must verify against.
    pub fn with_public_key(mut self, public_key: Vec<u8>) -> Self {
        self.public_key = public_key;
        self
    }

    /// An account is a *contract account* iff it has non-empty bytecode
    /// (§3 glossary).
    pub fn is_contract(&self) -> bool {
        matches!(&self.contract_code, Some(code) if !code.is_empty())
    }

    /// The account's identity hash, computed over its address (§3).
    pub fn hash(&self) -> Result<[u8; 32], CodecError> {
        hash_canonical(&self.address)
    }

    /// Reads a contract-variable slot, if present.
    pub fn slot(&self, index: usize) -> Option<&[u8]> {
        self.contract_variables.get(index).map(Vec::as_slice)
    }

    /// Writes a contract-variable slot, growing the slot vector with empty
    /// slots if `index` is past the current length.
    pub fn set_slot(&mut self, index: usize, value: Vec<u8>) {
        if index >= self.contract_variables.len() {
            self.contract_variables.resize(index + 1, Vec::new());
        }
        self.contract_variables[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_account_is_not_a_contract() {
        let acc = Account::new([1u8; 32]);
        assert!(!acc.is_contract());
    }

    #[test]
    fn contract_account_reports_as_such() {
        let acc = Account::new_contract([1u8; 32], vec![49], vec![vec![0, 2]]);
        assert!(acc.is_contract());
        assert_eq!(acc.slot(0), Some(&[0u8, 2][..]));
    }

    #[test]
    fn set_slot_grows_sparse_slots() {
        let mut acc = Account::new([1u8; 32]);
        acc.set_slot(2, vec![9]);
        assert_eq!(acc.contract_variables.len(), 3);
        assert_eq!(acc.slot(2), Some(&[9u8][..]));
        assert_eq!(acc.slot(0), Some(&[][..]));
    }
}
