use alloy_primitives::{keccak256, Address, U256};

use crate::abi::helpers::{decode_address, decode_u64, encode_address, encode_u64};
use crate::initializer::InitializationState;
use crate::ledger::ExecutionContext;

/// EIP-1967 proxy metadata slots.
///
/// Each is `keccak256(label) - 1`, so no preimage is known and no
/// implementation field (allocated from slot 0, or at `keccak256(..)` for
/// mappings and arrays) can land on it.
pub mod proxy_slots {
    use alloy_primitives::{uint, U256};

    /// keccak256("eip1967.proxy.implementation") - 1 (address)
    pub const IMPLEMENTATION: U256 =
        uint!(0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc_U256);
    /// keccak256("eip1967.proxy.admin") - 1 (address)
    pub const ADMIN: U256 =
        uint!(0xb53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103_U256);
    /// keccak256("eip1967.proxy.initialized") - 1 (uint64 version)
    pub const INITIALIZED: U256 =
        uint!(0x834ce84547018237034401a09067277cdcbe7bbf7d7d30f6b382b0a102b7b4a2_U256);

    /// Label hashed into [`IMPLEMENTATION`]
    pub const IMPLEMENTATION_LABEL: &str = "eip1967.proxy.implementation";
    /// Label hashed into [`ADMIN`]
    pub const ADMIN_LABEL: &str = "eip1967.proxy.admin";
    /// Label hashed into [`INITIALIZED`]
    pub const INITIALIZED_LABEL: &str = "eip1967.proxy.initialized";
}

/// SimpleStorage contract storage layout.
///
/// Both v1 and v2 keep the same layout so state carries across upgrades.
pub mod simple_storage_slots {
    use alloy_primitives::U256;

    /// slot 0: value (uint256)
    pub const VALUE: U256 = U256::from_limbs([0, 0, 0, 0]);
}

/// `keccak256(label) - 1` as a slot number.
pub fn namespaced_slot(label: &str) -> U256 {
    U256::from_be_bytes(keccak256(label.as_bytes()).0).wrapping_sub(U256::from(1))
}

/// The three proxy metadata slots.
///
/// Read and written through the executing frame, so during delegation they
/// resolve against the proxy's own storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxySlots {
    pub implementation: U256,
    pub admin: U256,
    pub initialized: U256,
}

impl ProxySlots {
    /// The EIP-1967 slot set as compile-time constants.
    pub const EIP1967: Self = Self {
        implementation: proxy_slots::IMPLEMENTATION,
        admin: proxy_slots::ADMIN,
        initialized: proxy_slots::INITIALIZED,
    };

    /// Derive the slot set from its labels.
    pub fn derive() -> Self {
        Self {
            implementation: namespaced_slot(proxy_slots::IMPLEMENTATION_LABEL),
            admin: namespaced_slot(proxy_slots::ADMIN_LABEL),
            initialized: namespaced_slot(proxy_slots::INITIALIZED_LABEL),
        }
    }

    /// Current implementation (zero when unset).
    pub fn get_implementation(&self, ctx: &ExecutionContext<'_>) -> Address {
        decode_address(ctx.sload(self.implementation))
    }

    pub fn set_implementation(&self, ctx: &mut ExecutionContext<'_>, implementation: Address) {
        ctx.sstore(self.implementation, encode_address(implementation));
    }

    pub fn get_admin(&self, ctx: &ExecutionContext<'_>) -> Address {
        decode_address(ctx.sload(self.admin))
    }

    pub fn set_admin(&self, ctx: &mut ExecutionContext<'_>, admin: Address) {
        ctx.sstore(self.admin, encode_address(admin));
    }

    pub fn read_initialization(&self, ctx: &ExecutionContext<'_>) -> InitializationState {
        InitializationState::from_version(decode_u64(ctx.sload(self.initialized)))
    }

    pub fn write_initialization(&self, ctx: &mut ExecutionContext<'_>, state: InitializationState) {
        ctx.sstore(self.initialized, encode_u64(state.version()));
    }

    /// Name of `slot` if it is one of the proxy metadata slots.
    pub fn slot_name(&self, slot: U256) -> Option<&'static str> {
        if slot == self.implementation {
            Some("implementation")
        } else if slot == self.admin {
            Some("admin")
        } else if slot == self.initialized {
            Some("initialized")
        } else {
            None
        }
    }
}

impl Default for ProxySlots {
    fn default() -> Self {
        Self::EIP1967
    }
}
