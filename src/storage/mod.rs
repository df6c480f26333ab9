//! Storage slot model
//!
//! A proxy and its implementation share one key-value store: the proxy's
//! account storage. Implementation fields are allocated from slot 0; proxy
//! metadata sits at hashed EIP-1967 slots far away from that range.
//!
//!   slot 0                       → SimpleStorage.value
//!   keccak("…implementation")-1  → active implementation
//!   keccak("…admin")-1           → admin
//!   keccak("…initialized")-1     → initializer version
//!
//! The journal and diff types record changes to that store so the ledger can
//! roll frames back and report what a committed transaction touched.

pub mod diff;
pub mod journal;
pub mod readers;
pub mod slots;

pub use diff::{AccountDiff, SlotChange, StateDiff, StateDiffBuilder};
pub use journal::{Checkpoint, Journal, JournalEntry};
pub use readers::{
    read_admin, read_implementation, read_initialization, read_proxy_state, ProxyState,
};
pub use slots::{namespaced_slot, proxy_slots, simple_storage_slots, ProxySlots};

use alloy_primitives::{Address, B256, U256};

/// Trait for reading contract storage slots.
///
/// Implemented by [`Ledger`](crate::ledger::Ledger); tests use an in-memory map.
pub trait StorageReader {
    /// Read a storage slot value from an account.
    /// Returns None if no account exists at `address`; unset slots of an
    /// existing account read as zero.
    fn read_storage(&self, address: Address, slot: U256) -> Option<B256>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{encode_address, encode_u64};
    use crate::accounts::dev_accounts;
    use crate::initializer::InitializationState;
    use std::collections::BTreeMap;

    // =========================================================================
    // Helper: In-memory storage reader for unit tests
    // =========================================================================

    struct MockStorage {
        storage: BTreeMap<(Address, U256), B256>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                storage: BTreeMap::new(),
            }
        }

        fn set(&mut self, address: Address, slot: U256, value: B256) {
            self.storage.insert((address, slot), value);
        }
    }

    impl StorageReader for MockStorage {
        fn read_storage(&self, address: Address, slot: U256) -> Option<B256> {
            self.storage.get(&(address, slot)).copied()
        }
    }

    // =========================================================================
    // Storage slot constant tests
    // =========================================================================

    #[test]
    fn test_constants_match_label_derivation() {
        assert_eq!(ProxySlots::derive(), ProxySlots::EIP1967);
        assert_eq!(
            namespaced_slot("eip1967.proxy.implementation"),
            proxy_slots::IMPLEMENTATION
        );
        assert_eq!(namespaced_slot("eip1967.proxy.admin"), proxy_slots::ADMIN);
        assert_eq!(
            namespaced_slot("eip1967.proxy.initialized"),
            proxy_slots::INITIALIZED
        );
    }

    #[test]
    fn test_proxy_slots_are_distinct_and_far_from_implementation_layout() {
        let slots = ProxySlots::default();
        assert_ne!(slots.implementation, slots.admin);
        assert_ne!(slots.admin, slots.initialized);
        assert_ne!(slots.implementation, slots.initialized);

        let low = U256::from(u64::MAX);
        for slot in [slots.implementation, slots.admin, slots.initialized] {
            assert!(slot > low);
        }
        assert_eq!(slots.slot_name(simple_storage_slots::VALUE), None);
        assert_eq!(slots.slot_name(proxy_slots::ADMIN), Some("admin"));
        assert_eq!(slots.slot_name(proxy_slots::IMPLEMENTATION), Some("implementation"));
        assert_eq!(slots.slot_name(proxy_slots::INITIALIZED), Some("initialized"));
    }

    #[test]
    fn test_namespaced_slot_is_hash_minus_one() {
        let label = "example.slot";
        let hash = U256::from_be_bytes(alloy_primitives::keccak256(label).0);
        assert_eq!(namespaced_slot(label) + U256::from(1), hash);
    }

    // =========================================================================
    // Reader tests
    // =========================================================================

    #[test]
    fn test_read_proxy_state() {
        let proxy = Address::repeat_byte(0x42);
        let implementation = Address::repeat_byte(0x11);
        let admin = dev_accounts()[0];

        let mut storage = MockStorage::new();
        storage.set(proxy, proxy_slots::IMPLEMENTATION, encode_address(implementation));
        storage.set(proxy, proxy_slots::ADMIN, encode_address(admin));
        storage.set(proxy, proxy_slots::INITIALIZED, encode_u64(1));

        let state = read_proxy_state(&storage, proxy).unwrap();
        assert_eq!(state.implementation, implementation);
        assert_eq!(state.admin, admin);
        assert_eq!(
            state.initialization,
            InitializationState::Initialized { version: 1 }
        );

        assert_eq!(read_implementation(&storage, proxy), Some(implementation));
        assert_eq!(read_admin(&storage, proxy), Some(admin));
    }

    #[test]
    fn test_read_proxy_state_missing_account() {
        let storage = MockStorage::new();
        let proxy = Address::repeat_byte(0x42);
        assert!(read_proxy_state(&storage, proxy).is_none());
        assert!(read_implementation(&storage, proxy).is_none());
        assert_eq!(
            read_initialization(&storage, proxy),
            InitializationState::Uninitialized
        );
    }

    #[test]
    fn test_read_initialization_disabled() {
        let mut storage = MockStorage::new();
        let implementation = Address::repeat_byte(0x11);
        storage.set(implementation, proxy_slots::INITIALIZED, encode_u64(u64::MAX));
        assert_eq!(
            read_initialization(&storage, implementation),
            InitializationState::Disabled
        );
    }
}
