//! In-process ledger
//!
//! Accounts, contract code and per-account storage, with the two execution
//! primitives a proxy needs: ordinary calls and delegated calls. Every
//! transaction is all-or-nothing:
//!
//!   transact(from, to, data)
//!   ↓
//!   top frame ── delegate_call ──▶ child frame (same storage, same caller)
//!   ↓                               ↓ failure: roll back to the child's checkpoint
//!   success: journal → StateDiff → Receipt
//!   failure: roll back the whole transaction
//!
//! `call` runs the same way and always rolls back.

pub mod context;
pub mod contract;
pub mod errors;
pub mod shared;

pub use context::{ExecutionContext, Frame, FrameKind};
pub use contract::Contract;
pub use errors::ExecutionError;
pub use shared::SharedLedger;

use alloy_primitives::{Address, Bytes, B256, U256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::storage::{Checkpoint, Journal, JournalEntry, StateDiff, StateDiffBuilder, StorageReader};

/// A ledger account. Externally-owned accounts have no code.
#[derive(Debug, Clone, Default)]
pub struct Account {
    pub code: Option<Arc<dyn Contract>>,
    /// Non-zero slots only
    pub storage: BTreeMap<U256, B256>,
    pub nonce: u64,
}

impl Account {
    fn read(&self, slot: U256) -> B256 {
        self.storage.get(&slot).copied().unwrap_or(B256::ZERO)
    }

    fn write(&mut self, slot: U256, value: B256) {
        if value == B256::ZERO {
            self.storage.remove(&slot);
        } else {
            self.storage.insert(slot, value);
        }
    }
}

/// Result of a committed transaction.
#[derive(Debug, Clone)]
pub struct Receipt {
    /// Commit sequence number
    pub sequence: u64,
    pub from: Address,
    pub to: Address,
    /// Return data of the top frame
    pub output: Bytes,
    /// State the transaction changed
    pub diff: StateDiff,
}

/// Accounts plus the journal of the transaction in flight.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: BTreeMap<Address, Account>,
    journal: Journal,
    config: RuntimeConfig,
    sequence: u64,
}

impl Ledger {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Number of committed transactions (deployments included).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn has_code(&self, address: Address) -> bool {
        self.accounts
            .get(&address)
            .is_some_and(|account| account.code.is_some())
    }

    /// Name of the contract deployed at `address`.
    pub fn code_name(&self, address: Address) -> Option<&str> {
        self.accounts
            .get(&address)
            .and_then(|account| account.code.as_deref())
            .map(|code| code.name())
    }

    pub fn nonce(&self, address: Address) -> u64 {
        self.accounts.get(&address).map_or(0, |account| account.nonce)
    }

    pub fn account(&self, address: Address) -> Option<&Account> {
        self.accounts.get(&address)
    }

    /// Storage word at `(address, slot)`; zero when unset or the account is absent.
    pub fn storage_at(&self, address: Address, slot: U256) -> B256 {
        self.accounts
            .get(&address)
            .map_or(B256::ZERO, |account| account.read(slot))
    }

    /// Deployed contracts with their names, in address order.
    pub fn contracts(&self) -> Vec<(Address, &str)> {
        self.accounts
            .iter()
            .filter_map(|(address, account)| account.code.as_deref().map(|c| (*address, c.name())))
            .collect()
    }

    // ── Transactions ─────────────────────────────────────────────────────

    /// Deploy `code` from `from` and run its constructor with `args`.
    ///
    /// The address is derived from `(from, nonce)` as CREATE does. A failing
    /// constructor leaves no account behind and the nonce untouched.
    pub fn deploy(
        &mut self,
        from: Address,
        code: Arc<dyn Contract>,
        args: &[u8],
    ) -> Result<Address, ExecutionError> {
        let address = from.create(self.nonce(from));
        if self.accounts.contains_key(&address) {
            return Err(ExecutionError::Reverted {
                message: format!("account already exists at {address}"),
            });
        }

        let checkpoint = self.journal.checkpoint();
        self.bump_nonce(from);
        self.accounts.insert(
            address,
            Account {
                code: Some(Arc::clone(&code)),
                ..Account::default()
            },
        );
        self.journal.record(JournalEntry::AccountCreated { address });

        let frame = Frame::top(from, address);
        if let Err(err) = code.construct(&mut ExecutionContext::new(self, frame), args) {
            self.rollback(checkpoint);
            warn!(contract = code.name(), deployer = %from, %err, "constructor reverted");
            return Err(err);
        }

        let diff = self.commit(from, address);
        info!(contract = code.name(), %address, deployer = %from, "deployed");
        debug!(diff = %diff.summary(), "deployment committed");
        Ok(address)
    }

    /// Execute `data` against `to` and commit on success.
    pub fn transact(
        &mut self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<Receipt, ExecutionError> {
        let checkpoint = self.journal.checkpoint();
        self.bump_nonce(from);

        match self.execute_frame(Frame::top(from, to), data) {
            Ok(output) => {
                let diff = self.commit(from, to);
                debug!(diff = %diff.summary(), "transaction committed");
                Ok(Receipt {
                    sequence: diff.sequence,
                    from,
                    to,
                    output,
                    diff,
                })
            }
            Err(err) => {
                self.rollback(checkpoint);
                warn!(%from, %to, %err, "transaction reverted");
                Err(err)
            }
        }
    }

    /// Execute `data` against `to` and discard every state change.
    pub fn call(&mut self, from: Address, to: Address, data: &[u8]) -> Result<Bytes, ExecutionError> {
        let checkpoint = self.journal.checkpoint();
        let result = self.execute_frame(Frame::top(from, to), data);
        self.rollback(checkpoint);
        result
    }

    // ── Frames ───────────────────────────────────────────────────────────

    /// Run the code at `frame.code_address`. A failing frame is rolled back
    /// to its own checkpoint; the caller decides what happens next.
    pub(crate) fn execute_frame(&mut self, frame: Frame, input: &[u8]) -> Result<Bytes, ExecutionError> {
        let limit = self.config.max_call_depth;
        if frame.depth > limit {
            return Err(ExecutionError::CallDepthExceeded { limit });
        }
        let code = self
            .accounts
            .get(&frame.code_address)
            .and_then(|account| account.code.clone())
            .ok_or(ExecutionError::NoCode {
                address: frame.code_address,
            })?;

        debug!(
            contract = code.name(),
            caller = %frame.caller,
            address = %frame.address,
            code_address = %frame.code_address,
            kind = ?frame.kind,
            depth = frame.depth,
            "enter frame"
        );

        let checkpoint = self.journal.checkpoint();
        let result = code.execute(&mut ExecutionContext::new(self, frame), input);
        if result.is_err() {
            self.rollback(checkpoint);
        }
        result
    }

    pub(crate) fn set_storage(&mut self, address: Address, slot: U256, value: B256) {
        let previous = self.storage_at(address, slot);
        if previous == value {
            return;
        }
        self.ensure_account(address);
        self.journal.record(JournalEntry::StorageChanged {
            address,
            slot,
            previous,
        });
        if let Some(account) = self.accounts.get_mut(&address) {
            account.write(slot, value);
        }
    }

    fn ensure_account(&mut self, address: Address) {
        if !self.accounts.contains_key(&address) {
            self.accounts.insert(address, Account::default());
            self.journal.record(JournalEntry::AccountCreated { address });
        }
    }

    fn bump_nonce(&mut self, address: Address) {
        self.ensure_account(address);
        if let Some(account) = self.accounts.get_mut(&address) {
            self.journal.record(JournalEntry::NonceChanged {
                address,
                previous: account.nonce,
            });
            account.nonce += 1;
        }
    }

    // ── Journal ──────────────────────────────────────────────────────────

    fn rollback(&mut self, checkpoint: Checkpoint) {
        for entry in self.journal.revert_to(checkpoint) {
            match entry {
                JournalEntry::AccountCreated { address } => {
                    self.accounts.remove(&address);
                }
                JournalEntry::NonceChanged { address, previous } => {
                    if let Some(account) = self.accounts.get_mut(&address) {
                        account.nonce = previous;
                    }
                }
                JournalEntry::StorageChanged {
                    address,
                    slot,
                    previous,
                } => {
                    if let Some(account) = self.accounts.get_mut(&address) {
                        account.write(slot, previous);
                    }
                }
            }
        }
    }

    /// Fold the journal into a diff and start a fresh one.
    fn commit(&mut self, from: Address, to: Address) -> StateDiff {
        self.sequence += 1;
        let mut builder = StateDiffBuilder::new(self.sequence, from, to);
        for entry in self.journal.take() {
            match entry {
                JournalEntry::AccountCreated { address } => {
                    if self.has_code(address) {
                        builder.record_code_created(address);
                    }
                }
                JournalEntry::NonceChanged { address, previous } => {
                    builder.record_nonce_change(address, previous, self.nonce(address));
                }
                JournalEntry::StorageChanged {
                    address,
                    slot,
                    previous,
                } => {
                    builder.record_storage_change(address, slot, previous, self.storage_at(address, slot));
                }
            }
        }
        builder.build()
    }
}

impl StorageReader for Ledger {
    fn read_storage(&self, address: Address, slot: U256) -> Option<B256> {
        self.accounts.get(&address).map(|account| account.read(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{decode_address, encode_address};
    use crate::accounts::dev_accounts;

    // =========================================================================
    // Helper: byte-command contract
    // =========================================================================

    /// `[1, v]`   store `v` at slot 0 and the caller at slot 1
    /// `[2]`      write slot 0, then revert
    /// `[3]`      call itself forever
    /// `[4, ..a]` delegate `[2]` to `a`, swallow the failure, then write slot 2
    /// `[5, ..a]` call `a` with `[1, 9]`
    /// constructor args `[0xff]` write slot 0 and revert
    #[derive(Debug)]
    struct Scratch;

    impl Contract for Scratch {
        fn name(&self) -> &str {
            "Scratch"
        }

        fn construct(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> Result<(), ExecutionError> {
            if args == [0xff] {
                ctx.sstore(U256::ZERO, B256::repeat_byte(0xee));
                return Err(ExecutionError::Reverted {
                    message: "bad constructor".to_string(),
                });
            }
            Ok(())
        }

        fn execute(&self, ctx: &mut ExecutionContext<'_>, input: &[u8]) -> Result<Bytes, ExecutionError> {
            match input.first() {
                Some(1) => {
                    ctx.sstore(U256::ZERO, B256::with_last_byte(input[1]));
                    let caller = ctx.caller();
                    ctx.sstore(U256::from(1), encode_address(caller));
                    Ok(Bytes::new())
                }
                Some(2) => {
                    ctx.sstore(U256::ZERO, B256::repeat_byte(0xee));
                    Err(ExecutionError::Reverted {
                        message: "scratch failure".to_string(),
                    })
                }
                Some(3) => {
                    let me = ctx.address();
                    ctx.call(me, input)
                }
                Some(4) => {
                    let target = Address::from_slice(&input[1..21]);
                    let _ = ctx.delegate_call(target, &[2]);
                    ctx.sstore(U256::from(2), B256::with_last_byte(1));
                    Ok(Bytes::new())
                }
                Some(5) => {
                    let target = Address::from_slice(&input[1..21]);
                    ctx.call(target, &[1, 9])
                }
                _ => Err(ExecutionError::Reverted {
                    message: "unknown command".to_string(),
                }),
            }
        }
    }

    fn setup() -> (Ledger, Address, Address) {
        let deployer = dev_accounts()[0];
        let mut ledger = Ledger::new(RuntimeConfig::dev());
        let scratch = ledger.deploy(deployer, Arc::new(Scratch), &[]).unwrap();
        (ledger, deployer, scratch)
    }

    fn with_address(command: u8, address: Address) -> Vec<u8> {
        let mut data = vec![command];
        data.extend_from_slice(address.as_slice());
        data
    }

    // =========================================================================
    // Deployment
    // =========================================================================

    #[test]
    fn test_deploy_uses_create_address_and_bumps_nonce() {
        let (ledger, deployer, scratch) = setup();
        assert_eq!(scratch, deployer.create(0));
        assert_eq!(ledger.nonce(deployer), 1);
        assert!(ledger.has_code(scratch));
        assert_eq!(ledger.code_name(scratch), Some("Scratch"));
        assert!(!ledger.has_code(deployer));
        assert_eq!(ledger.sequence(), 1);
        assert_eq!(ledger.contracts(), vec![(scratch, "Scratch")]);
    }

    #[test]
    fn test_failed_constructor_leaves_nothing() {
        let (mut ledger, deployer, _) = setup();
        let next = deployer.create(1);

        let err = ledger.deploy(deployer, Arc::new(Scratch), &[0xff]).unwrap_err();
        assert!(matches!(err, ExecutionError::Reverted { .. }));
        assert!(ledger.account(next).is_none());
        assert_eq!(ledger.nonce(deployer), 1);
        assert_eq!(ledger.sequence(), 1);
        assert!(ledger.read_storage(next, U256::ZERO).is_none());
    }

    // =========================================================================
    // Transactions and calls
    // =========================================================================

    #[test]
    fn test_transact_commits_with_diff() {
        let (mut ledger, deployer, scratch) = setup();
        let user = dev_accounts()[1];

        let receipt = ledger.transact(user, scratch, &[1, 7]).unwrap();
        assert_eq!(receipt.sequence, 2);
        assert_eq!(ledger.storage_at(scratch, U256::ZERO), B256::with_last_byte(7));
        assert_eq!(decode_address(ledger.storage_at(scratch, U256::from(1))), user);
        assert_eq!(ledger.nonce(user), 1);

        let diff = &receipt.diff;
        assert_eq!(diff.changed_slots(&scratch), vec![U256::ZERO, U256::from(1)]);
        assert_eq!(diff.account_diff(&user).unwrap().nonce, Some((0, 1)));
        assert!(diff.account_diff(&deployer).is_none());
    }

    #[test]
    fn test_failed_transaction_rolls_back_everything() {
        let (mut ledger, _, scratch) = setup();
        let user = dev_accounts()[1];

        let err = ledger.transact(user, scratch, &[2]).unwrap_err();
        assert_eq!(
            err,
            ExecutionError::Reverted {
                message: "scratch failure".to_string()
            }
        );
        assert_eq!(ledger.storage_at(scratch, U256::ZERO), B256::ZERO);
        assert!(ledger.account(user).is_none(), "sender account not created");
        assert_eq!(ledger.sequence(), 1);
    }

    #[test]
    fn test_call_never_commits() {
        let (mut ledger, _, scratch) = setup();
        let user = dev_accounts()[1];

        ledger.call(user, scratch, &[1, 7]).unwrap();
        assert_eq!(ledger.storage_at(scratch, U256::ZERO), B256::ZERO);
        assert_eq!(ledger.nonce(user), 0);
        assert_eq!(ledger.sequence(), 1);
    }

    #[test]
    fn test_call_to_account_without_code() {
        let (mut ledger, deployer, _) = setup();
        let user = dev_accounts()[1];
        assert_eq!(
            ledger.transact(user, deployer, &[]).unwrap_err(),
            ExecutionError::NoCode { address: deployer }
        );
    }

    // =========================================================================
    // Nested frames
    // =========================================================================

    #[test]
    fn test_nested_failure_rolls_back_only_the_child() {
        let (mut ledger, deployer, scratch) = setup();
        let helper = ledger.deploy(deployer, Arc::new(Scratch), &[]).unwrap();
        let user = dev_accounts()[1];

        ledger.transact(user, scratch, &with_address(4, helper)).unwrap();
        // child wrote slot 0 of scratch (delegated) then reverted
        assert_eq!(ledger.storage_at(scratch, U256::ZERO), B256::ZERO);
        assert_eq!(ledger.storage_at(scratch, U256::from(2)), B256::with_last_byte(1));
        assert_eq!(ledger.storage_at(helper, U256::ZERO), B256::ZERO);
    }

    #[test]
    fn test_plain_call_switches_identity_and_storage() {
        let (mut ledger, deployer, scratch) = setup();
        let other = ledger.deploy(deployer, Arc::new(Scratch), &[]).unwrap();
        let user = dev_accounts()[1];

        ledger.transact(user, scratch, &with_address(5, other)).unwrap();
        assert_eq!(ledger.storage_at(other, U256::ZERO), B256::with_last_byte(9));
        assert_eq!(decode_address(ledger.storage_at(other, U256::from(1))), scratch);
        assert_eq!(ledger.storage_at(scratch, U256::ZERO), B256::ZERO);
    }

    #[test]
    fn test_call_depth_is_bounded() {
        let deployer = dev_accounts()[0];
        let mut ledger = Ledger::new(RuntimeConfig::dev().with_max_call_depth(8));
        let scratch = ledger.deploy(deployer, Arc::new(Scratch), &[]).unwrap();

        assert_eq!(
            ledger.transact(deployer, scratch, &[3]).unwrap_err(),
            ExecutionError::CallDepthExceeded { limit: 8 }
        );
        assert_eq!(ledger.nonce(deployer), 1);
    }

    // =========================================================================
    // StorageReader
    // =========================================================================

    #[test]
    fn test_storage_reader_semantics() {
        let (ledger, _, scratch) = setup();
        assert_eq!(ledger.read_storage(scratch, U256::from(99)), Some(B256::ZERO));
        assert_eq!(ledger.read_storage(Address::repeat_byte(0xab), U256::ZERO), None);
    }
}
