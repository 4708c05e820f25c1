//! The in-memory account working set (§3, C6).
//!
//! A `DashMap` mirroring a `VmStateOverlay`-style
//! (`api/src/vm/overlay.rs`): reads fall through to a absent-means-fresh
//! default, writes land in the map directly. The pipeline is the map's only
//! writer — it applies a whole block's worth of mutations to a private
//! clone before ever touching this shared map, so concurrent readers never
//! observe a partially-applied block (§5).

use dashmap::DashMap;

use corechain_types::Account;

/// The live set of accounts the pipeline validates transactions against.
#[derive(Default)]
pub struct AccountState {
    accounts: DashMap<[u8; 32], Account>,
}

impl AccountState {
    /// Creates an empty account state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the state from a previously persisted snapshot (used at node
    /// startup to rehydrate from `corechain-storage`).
    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        let map = DashMap::new();
        for account in accounts {
            map.insert(account.address, account);
        }
        Self { accounts: map }
    }

    /// Reads an account, or a fresh non-contract account with zero balance
    /// if `address` has never been created.
    pub fn get(&self, address: &[u8; 32]) -> Account {
        self.accounts
            .get(address)
            .map(|e| e.value().clone())
            .unwrap_or_else(|| Account::new(*address))
    }

    /// Whether an account has been created at `address`.
    pub fn exists(&self, address: &[u8; 32]) -> bool {
        self.accounts.contains_key(address)
    }

    /// Inserts or replaces an account's full state.
    pub fn put(&self, account: Account) {
        self.accounts.insert(account.address, account);
    }

    /// A snapshot of every account currently held, in no particular order.
    pub fn snapshot(&self) -> Vec<Account> {
        self.accounts.iter().map(|e| e.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_address_reads_as_fresh() {
        let state = AccountState::new();
        let account = state.get(&[1u8; 32]);
        assert_eq!(account.balance, 0);
        assert!(!state.exists(&[1u8; 32]));
    }

    #[test]
    fn put_then_get_round_trips() {
        let state = AccountState::new();
        let mut account = Account::new([2u8; 32]);
        account.balance = 10;
        state.put(account.clone());
        assert_eq!(state.get(&[2u8; 32]), account);
        assert!(state.exists(&[2u8; 32]));
    }

    #[test]
    fn from_accounts_seeds_every_entry() {
        let state = AccountState::from_accounts(vec![Account::new([3u8; 32]), Account::new([4u8; 32])]);
        assert_eq!(state.snapshot().len(), 2);
    }
}
