//! The block pipeline (§4.4, C4): candidate construction, admission,
//! finalization, and replay-based validation.

use std::collections::HashMap;

use tracing::{info, instrument, warn};

use corechain_storage::{Mempool, Store};
use corechain_types::block::ZERO_HASH;
use corechain_types::{Account, AccTx, Block, FundsTx, Transaction};
use corechain_vm::ExecutionContext;

use crate::account_state::AccountState;
use crate::error::{BlockError, TxError};

/// Creates an empty candidate block (`new_block`, §4.4).
pub fn new_block(parent_hash: [u8; 32], beneficiary: [u8; 32], timestamp: u64, height: u64) -> Block {
    Block::new_candidate(parent_hash, beneficiary, timestamp, height)
}

/// Admits `tx` to a candidate block (`add_tx`, §4.4). Rejects a transaction
/// that is already present in the block or names a sender with no known
/// account; deeper admission rules (balance, nonce, VM execution) are
/// re-checked at [`validate_block`] time against the state the block will
/// actually be applied to.
#[instrument(skip(block, tx, accounts))]
pub fn add_tx(block: &mut Block, tx: Transaction, accounts: &AccountState) -> Result<(), BlockError> {
    let hash = tx.hash()?;
    let index = block.transactions.len();
    for existing in &block.transactions {
        if existing.hash()? == hash {
            return Err(BlockError::Transaction {
                index,
                source: TxError::Duplicate,
            });
        }
    }
    if let Some(sender) = tx.sender() {
        if !accounts.exists(&sender) {
            return Err(BlockError::Transaction {
                index,
                source: TxError::UnknownSender,
            });
        }
    }
    block.transactions.push(tx);
    Ok(())
}

/// Finalizes a candidate block: computes its Merkle root and seals it with
/// the caller-supplied proof-of-stake `nonce` (`finalize_block`, §4.4).
pub fn finalize_block(block: &mut Block, nonce: u64) -> Result<(), BlockError> {
    block.finalize(nonce)?;
    Ok(())
}

/// Replays `block` against `accounts`, admitting its effects only if every
/// transaction succeeds (§4.4: "Accept iff all transactions succeed;
/// reject on the first failure"). On acceptance, persists the block and its
/// transactions via `store`, moves the mempool entries to closed, and
/// updates `accounts`.
///
/// `parent` is `None` only for the genesis block (height 1, zero parent
/// hash); every other block must supply its parent so the height/link
/// invariants can be checked.
#[instrument(skip(block, parent, accounts, store, mempool))]
pub fn validate_block(
    block: &Block,
    parent: Option<&Block>,
    accounts: &AccountState,
    store: &Store,
    mempool: &Mempool,
    step_budget: u64,
) -> Result<(), BlockError> {
    match parent {
        Some(p) => {
            if block.header.height != p.header.height + 1 {
                return Err(BlockError::HeightMismatch {
                    parent: p.header.height,
                    got: block.header.height,
                });
            }
            if block.header.parent_hash != p.hash()? {
                return Err(BlockError::ParentMismatch);
            }
        }
        None => {
            if block.header.height != 1 || block.header.parent_hash != ZERO_HASH {
                return Err(BlockError::ParentMismatch);
            }
        }
    }

    let mut overlay: HashMap<[u8; 32], Account> = HashMap::new();
    for (index, tx) in block.transactions.iter().enumerate() {
        apply_tx(
            &mut overlay,
            accounts,
            tx,
            block.header.beneficiary,
            block.header.height,
            block.header.timestamp,
            step_budget,
        )
        .map_err(|source| BlockError::Transaction { index, source })?;
    }

    for account in overlay.into_values() {
        accounts.put(account.clone());
        store.put_account(&account)?;
    }
    for tx in &block.transactions {
        mempool.take_open(&tx.hash()?);
        store.write_closed_tx(tx)?;
    }
    store.write_closed_block(block)?;
    store.write_last_closed_block(block)?;

    info!(height = block.header.height, txs = block.transactions.len(), "block accepted");
    Ok(())
}

/// Looks up `addr` in `overlay` if a transaction earlier in this same
/// block already touched it, falling back to the shared account state
/// otherwise — so a block that creates an account with `AccTx` and then
/// spends from it with a later `FundsTx` sees its own pending creation.
fn account_known(overlay: &HashMap<[u8; 32], Account>, accounts: &AccountState, addr: &[u8; 32]) -> bool {
    overlay.contains_key(addr) || accounts.exists(addr)
}

fn load_account(overlay: &mut HashMap<[u8; 32], Account>, accounts: &AccountState, addr: [u8; 32]) -> Account {
    overlay.entry(addr).or_insert_with(|| accounts.get(&addr)).clone()
}

fn apply_tx(
    overlay: &mut HashMap<[u8; 32], Account>,
    accounts: &AccountState,
    tx: &Transaction,
    beneficiary: [u8; 32],
    block_height: u64,
    timestamp: u64,
    step_budget: u64,
) -> Result<(), TxError> {
    match tx {
        Transaction::Funds(f) => apply_funds_tx(overlay, accounts, f, beneficiary, block_height, timestamp, step_budget),
        Transaction::Acc(a) => apply_acc_tx(overlay, accounts, a),
        Transaction::Config(c) => apply_fee_only(overlay, accounts, c.sender_hash, c.fee, beneficiary, &c.signature, &c.signable_preimage()?),
        Transaction::Stake(s) => apply_fee_only(overlay, accounts, s.sender_hash, s.fee, beneficiary, &s.signature, &s.signable_preimage()?),
    }
}

/// Verifies `signature` over `preimage` against `public_key` (§4.4 "verify
/// signatures"). An account that was never created through `AccTx` (empty
/// `public_key`) fails every check, which is the correct outcome: it has
/// no key to have signed anything with.
fn verify_signature(public_key: &[u8], preimage: &[u8], signature: &[u8]) -> Result<(), TxError> {
    let ok = corechain_crypto::verify(public_key, preimage, signature).map_err(|_| TxError::InvalidSignature)?;
    if ok {
        Ok(())
    } else {
        Err(TxError::InvalidSignature)
    }
}

fn apply_fee_only(
    overlay: &mut HashMap<[u8; 32], Account>,
    accounts: &AccountState,
    sender: [u8; 32],
    fee: u64,
    beneficiary: [u8; 32],
    signature: &[u8],
    preimage: &[u8],
) -> Result<(), TxError> {
    if !account_known(overlay, accounts, &sender) {
        return Err(TxError::UnknownSender);
    }
    let mut sender_acc = load_account(overlay, accounts, sender);
    verify_signature(&sender_acc.public_key, preimage, signature)?;
    if sender_acc.balance < fee {
        return Err(TxError::InsufficientBalance);
    }
    sender_acc.balance -= fee;
    overlay.insert(sender, sender_acc);

    let mut beneficiary_acc = load_account(overlay, accounts, beneficiary);
    beneficiary_acc.balance += fee;
    overlay.insert(beneficiary, beneficiary_acc);
    Ok(())
}

/// `AccTx`'s issuer-signature is verified over the new account's address —
/// the original Go source signs the whole transaction via its enclosing
/// `SignTx` helper (not reproduced here, §9 Non-goal: crypto primitives are
/// an external, wrapped concern); this is the narrowest signable preimage
/// that still ties the signature to the specific account being created.
fn apply_acc_tx(overlay: &mut HashMap<[u8; 32], Account>, accounts: &AccountState, tx: &AccTx) -> Result<(), TxError> {
    if account_known(overlay, accounts, &tx.account_address) {
        return Err(TxError::AccountExists);
    }
    verify_signature(&tx.issuer_public_key, &tx.account_address, &tx.issuer_signature)?;
    let account = match &tx.contract_code {
        Some(code) => Account::new_contract(
            tx.account_address,
            code.clone(),
            tx.initial_contract_variables.clone().unwrap_or_default(),
        ),
        None => Account::new(tx.account_address),
    }
    .with_public_key(tx.issuer_public_key.clone());
    overlay.insert(tx.account_address, account);
    Ok(())
}

fn apply_funds_tx(
    overlay: &mut HashMap<[u8; 32], Account>,
    accounts: &AccountState,
    tx: &FundsTx,
    beneficiary: [u8; 32],
    block_height: u64,
    timestamp: u64,
    step_budget: u64,
) -> Result<(), TxError> {
    if !account_known(overlay, accounts, &tx.sender_hash) {
        return Err(TxError::UnknownSender);
    }
    let mut sender_acc = load_account(overlay, accounts, tx.sender_hash);
    verify_signature(&sender_acc.public_key, &tx.signable_preimage()?, &tx.signature)?;
    if sender_acc.tx_count != tx.tx_count {
        return Err(TxError::NonceMismatch {
            expected: sender_acc.tx_count,
            got: tx.tx_count,
        });
    }
    let total = tx
        .amount
        .checked_add(tx.fee)
        .ok_or(TxError::InsufficientBalance)?;
    if sender_acc.balance < total {
        return Err(TxError::InsufficientBalance);
    }
    sender_acc.balance -= total;
    sender_acc.tx_count += 1;
    overlay.insert(tx.sender_hash, sender_acc);

    let mut receiver_acc = load_account(overlay, accounts, tx.receiver_hash);
    receiver_acc.balance += tx.amount;

    match (&tx.call_data, receiver_acc.is_contract()) {
        (Some(call_data), true) => {
            let code = receiver_acc.contract_code.clone().unwrap_or_default();
            let context = ExecutionContext {
                caller: tx.sender_hash,
                amount: tx.amount,
                block_height,
                timestamp,
            };
            let outcome = corechain_vm::execute(&code, call_data, &receiver_acc.contract_variables, &context, step_budget)?;
            receiver_acc.contract_variables = outcome.updated_variables;
        }
        (Some(_), false) => {
            warn!("call-data sent to a non-contract account");
            return Err(TxError::NotAContract);
        }
        (None, _) => {}
    }
    overlay.insert(tx.receiver_hash, receiver_acc);

    let mut beneficiary_acc = load_account(overlay, accounts, beneficiary);
    beneficiary_acc.balance += tx.fee;
    overlay.insert(beneficiary, beneficiary_acc);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corechain_crypto::KeyPair;
    use corechain_types::StakeTx;

    fn store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = Store::open(dir.path().join("db.redb")).expect("open");
        (s, dir)
    }

    /// A funded sender account plus a `FundsTx` signed against it, ready to
    /// pass `apply_funds_tx`'s signature check.
    fn signed_funds_tx(
        sender_hash: [u8; 32],
        receiver_hash: [u8; 32],
        fee: u64,
        amount: u64,
        tx_count: u32,
    ) -> (KeyPair, FundsTx) {
        let kp = KeyPair::generate().expect("keypair");
        let mut tx = FundsTx {
            fee,
            amount,
            tx_count,
            sender_hash,
            receiver_hash,
            signature: Vec::new(),
            multi_sig: None,
            call_data: None,
        };
        tx.signature = kp.sign(&tx.signable_preimage().expect("preimage")).expect("sign");
        (kp, tx)
    }

    #[test]
    fn genesis_block_with_no_transactions_validates() {
        let (store, _dir) = store();
        let accounts = AccountState::new();
        let mempool = Mempool::new();

        let mut block = new_block(ZERO_HASH, [9u8; 32], 0, 1);
        finalize_block(&mut block, 1).unwrap();

        validate_block(&block, None, &accounts, &store, &mempool, 64).unwrap();
        assert_eq!(store.read_last_closed_block().unwrap(), Some(block));
    }

    #[test]
    fn funds_tx_moves_balance_and_bumps_nonce() {
        let (store, _dir) = store();
        let accounts = AccountState::new();
        let mempool = Mempool::new();

        let (kp, tx) = signed_funds_tx([1u8; 32], [2u8; 32], 1, 10, 0);
        let mut sender = Account::new([1u8; 32]).with_public_key(kp.public_bytes());
        sender.balance = 100;
        accounts.put(sender);
        accounts.put(Account::new([2u8; 32]));

        let tx = Transaction::Funds(tx);

        let mut block = new_block(ZERO_HASH, [9u8; 32], 0, 1);
        add_tx(&mut block, tx, &accounts).unwrap();
        finalize_block(&mut block, 1).unwrap();
        validate_block(&block, None, &accounts, &store, &mempool, 64).unwrap();

        assert_eq!(accounts.get(&[1u8; 32]).balance, 89);
        assert_eq!(accounts.get(&[1u8; 32]).tx_count, 1);
        assert_eq!(accounts.get(&[2u8; 32]).balance, 10);
        assert_eq!(accounts.get(&[9u8; 32]).balance, 1);
    }

    #[test]
    fn unknown_sender_is_rejected_at_admission() {
        let accounts = AccountState::new();
        let tx = Transaction::Stake(StakeTx {
            fee: 1,
            sender_hash: [7u8; 32],
            payload: vec![],
            signature: vec![],
        });
        let mut block = new_block(ZERO_HASH, [9u8; 32], 0, 1);
        let err = add_tx(&mut block, tx, &accounts).unwrap_err();
        assert!(matches!(
            err,
            BlockError::Transaction {
                source: TxError::UnknownSender,
                ..
            }
        ));
    }

    #[test]
    fn insufficient_balance_rejects_the_whole_block() {
        let (store, _dir) = store();
        let accounts = AccountState::new();
        let mempool = Mempool::new();
        let (kp, tx) = signed_funds_tx([1u8; 32], [2u8; 32], 1, 10, 0);
        accounts.put(Account::new([1u8; 32]).with_public_key(kp.public_bytes()));
        accounts.put(Account::new([2u8; 32]));

        let tx = Transaction::Funds(tx);
        let mut block = new_block(ZERO_HASH, [9u8; 32], 0, 1);
        block.transactions.push(tx);
        finalize_block(&mut block, 1).unwrap();

        let err = validate_block(&block, None, &accounts, &store, &mempool, 64).unwrap_err();
        assert!(matches!(
            err,
            BlockError::Transaction {
                source: TxError::InsufficientBalance,
                index: 0,
            }
        ));
        // Nothing committed: sender's balance is untouched.
        assert_eq!(accounts.get(&[1u8; 32]).balance, 0);
    }

    #[test]
    fn height_mismatch_against_parent_is_rejected() {
        let (store, _dir) = store();
        let accounts = AccountState::new();
        let mempool = Mempool::new();

        let mut genesis = new_block(ZERO_HASH, [9u8; 32], 0, 1);
        finalize_block(&mut genesis, 1).unwrap();

        let mut bad = new_block(genesis.hash().unwrap(), [9u8; 32], 1, 3);
        finalize_block(&mut bad, 1).unwrap();

        let err = validate_block(&bad, Some(&genesis), &accounts, &store, &mempool, 64).unwrap_err();
        assert!(matches!(err, BlockError::HeightMismatch { parent: 1, got: 3 }));
    }
}
