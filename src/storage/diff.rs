//! What a committed transaction changed.
//!
//!   journal entries (in write order)
//!   ↓ StateDiffBuilder: first `before` wins, `after` follows the last write
//!   ↓ build(): drop writes that ended where they started
//!   StateDiff { account → AccountDiff { nonce, deployed, slots } }

use alloy_primitives::{Address, B256, U256};
use serde::Serialize;
use std::collections::BTreeMap;

use super::slots::ProxySlots;

/// One storage slot before and after a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotChange {
    pub before: B256,
    pub after: B256,
}

/// Changes to one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountDiff {
    /// `(before, after)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<(u64, u64)>,
    /// Code was deployed at this address
    pub deployed: bool,
    pub slots: BTreeMap<U256, SlotChange>,
}

impl AccountDiff {
    fn is_empty(&self) -> bool {
        self.nonce.is_none() && !self.deployed && self.slots.is_empty()
    }
}

/// State changed by one committed transaction. Untouched accounts are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateDiff {
    /// Commit sequence number
    pub sequence: u64,
    pub from: Address,
    /// Call target, or the new contract for deployments
    pub to: Address,
    pub accounts: BTreeMap<Address, AccountDiff>,
}

impl StateDiff {
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn account_diff(&self, address: &Address) -> Option<&AccountDiff> {
        self.accounts.get(address)
    }

    pub fn slot_change_count(&self) -> usize {
        self.accounts.values().map(|account| account.slots.len()).sum()
    }

    /// Value of `(address, slot)` after the transaction, if it changed.
    pub fn storage_after(&self, address: &Address, slot: &U256) -> Option<B256> {
        self.accounts
            .get(address)
            .and_then(|account| account.slots.get(slot))
            .map(|change| change.after)
    }

    /// Changed slots of `address`, ascending.
    pub fn changed_slots(&self, address: &Address) -> Vec<U256> {
        self.accounts
            .get(address)
            .map(|account| account.slots.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Names of the proxy metadata slots of `address` that changed.
    pub fn proxy_metadata_changes(&self, address: &Address) -> Vec<&'static str> {
        self.changed_slots(address)
            .into_iter()
            .filter_map(|slot| ProxySlots::EIP1967.slot_name(slot))
            .collect()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "seq={} from={} to={} accounts={} slots={}",
            self.sequence,
            self.from,
            self.to,
            self.accounts.len(),
            self.slot_change_count(),
        )
    }
}

/// Folds journal entries into a [`StateDiff`] at commit time.
#[derive(Debug, Default)]
pub struct StateDiffBuilder {
    diff: StateDiff,
}

impl StateDiffBuilder {
    pub fn new(sequence: u64, from: Address, to: Address) -> Self {
        Self {
            diff: StateDiff {
                sequence,
                from,
                to,
                accounts: BTreeMap::new(),
            },
        }
    }

    fn account(&mut self, address: Address) -> &mut AccountDiff {
        self.diff.accounts.entry(address).or_default()
    }

    pub fn record_nonce_change(&mut self, address: Address, before: u64, after: u64) {
        let account = self.account(address);
        let before = account.nonce.map_or(before, |(first, _)| first);
        account.nonce = Some((before, after));
    }

    pub fn record_code_created(&mut self, address: Address) {
        self.account(address).deployed = true;
    }

    pub fn record_storage_change(&mut self, address: Address, slot: U256, before: B256, after: B256) {
        self.account(address)
            .slots
            .entry(slot)
            .and_modify(|change| change.after = after)
            .or_insert(SlotChange { before, after });
    }

    pub fn build(mut self) -> StateDiff {
        for account in self.diff.accounts.values_mut() {
            account.slots.retain(|_, change| change.before != change.after);
            if account.nonce.is_some_and(|(before, after)| before == after) {
                account.nonce = None;
            }
        }
        self.diff.accounts.retain(|_, account| !account.is_empty());
        self.diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::proxy_slots;

    fn addr(n: u8) -> Address {
        Address::repeat_byte(n)
    }

    fn word(n: u8) -> B256 {
        B256::with_last_byte(n)
    }

    fn builder() -> StateDiffBuilder {
        StateDiffBuilder::new(7, addr(0xaa), addr(0xbb))
    }

    #[test]
    fn test_empty_build() {
        let diff = builder().build();
        assert!(diff.is_empty());
        assert_eq!(diff.sequence, 7);
        assert_eq!(diff.to, addr(0xbb));
    }

    #[test]
    fn test_repeated_writes_keep_first_before_and_last_after() {
        let mut b = builder();
        b.record_storage_change(addr(1), U256::ZERO, word(1), word(2));
        b.record_storage_change(addr(1), U256::ZERO, word(2), word(3));
        let diff = b.build();

        assert_eq!(
            diff.account_diff(&addr(1)).unwrap().slots[&U256::ZERO],
            SlotChange {
                before: word(1),
                after: word(3)
            }
        );
    }

    #[test]
    fn test_write_back_to_original_is_dropped() {
        let mut b = builder();
        b.record_storage_change(addr(1), U256::ZERO, word(5), word(7));
        b.record_storage_change(addr(1), U256::ZERO, word(7), word(5));
        b.record_nonce_change(addr(2), 3, 3);
        assert!(b.build().is_empty());
    }

    #[test]
    fn test_nonce_and_deployment() {
        let mut b = builder();
        b.record_nonce_change(addr(1), 0, 1);
        b.record_nonce_change(addr(1), 1, 2);
        b.record_code_created(addr(2));
        let diff = b.build();

        assert_eq!(diff.account_diff(&addr(1)).unwrap().nonce, Some((0, 2)));
        assert!(diff.account_diff(&addr(2)).unwrap().deployed);
        assert_eq!(diff.slot_change_count(), 0);
    }

    #[test]
    fn test_slot_queries() {
        let mut b = builder();
        b.record_storage_change(addr(1), U256::from(3), B256::ZERO, word(99));
        b.record_storage_change(addr(1), U256::from(1), B256::ZERO, word(1));
        b.record_storage_change(addr(2), U256::ZERO, B256::ZERO, word(2));
        let diff = b.build();

        assert_eq!(diff.slot_change_count(), 3);
        assert_eq!(diff.storage_after(&addr(1), &U256::from(3)), Some(word(99)));
        assert!(diff.storage_after(&addr(1), &U256::from(4)).is_none());
        assert_eq!(diff.changed_slots(&addr(1)), vec![U256::from(1), U256::from(3)]);
        assert!(diff.changed_slots(&addr(9)).is_empty());
    }

    #[test]
    fn test_proxy_metadata_changes_are_named() {
        let mut b = builder();
        b.record_storage_change(addr(1), proxy_slots::ADMIN, B256::ZERO, word(1));
        b.record_storage_change(addr(1), proxy_slots::IMPLEMENTATION, B256::ZERO, word(2));
        b.record_storage_change(addr(1), U256::ZERO, B256::ZERO, word(3));
        let diff = b.build();

        let mut names = diff.proxy_metadata_changes(&addr(1));
        names.sort();
        assert_eq!(names, vec!["admin", "implementation"]);
    }

    #[test]
    fn test_summary_and_json() {
        let mut b = builder();
        b.record_storage_change(addr(0xbb), U256::ZERO, B256::ZERO, word(1));
        let diff = b.build();
        assert!(diff.summary().contains("seq=7"));
        assert!(diff.summary().contains("slots=1"));

        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["sequence"], 7);
        assert!(json["accounts"].as_object().unwrap().len() == 1);
    }
}
