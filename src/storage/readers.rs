use alloy_primitives::{Address, B256};
use serde::Serialize;

use super::slots::proxy_slots;
use super::StorageReader;
use crate::abi::helpers::{decode_address, decode_u64};
use crate::initializer::InitializationState;

/// Proxy metadata read out-of-band from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProxyState {
    /// Active implementation (zero when none is set)
    pub implementation: Address,
    /// Address allowed to upgrade
    pub admin: Address,
    /// One-shot initializer state
    pub initialization: InitializationState,
}

/// Read the full proxy metadata. `None` if no account exists at `proxy`.
pub fn read_proxy_state(reader: &impl StorageReader, proxy: Address) -> Option<ProxyState> {
    let implementation = reader.read_storage(proxy, proxy_slots::IMPLEMENTATION)?;
    let admin = reader.read_storage(proxy, proxy_slots::ADMIN)?;
    let initialized = reader
        .read_storage(proxy, proxy_slots::INITIALIZED)
        .unwrap_or(B256::ZERO);

    Some(ProxyState {
        implementation: decode_address(implementation),
        admin: decode_address(admin),
        initialization: InitializationState::from_version(decode_u64(initialized)),
    })
}

/// Read just the implementation address.
pub fn read_implementation(reader: &impl StorageReader, proxy: Address) -> Option<Address> {
    reader
        .read_storage(proxy, proxy_slots::IMPLEMENTATION)
        .map(decode_address)
}

/// Read just the admin address.
pub fn read_admin(reader: &impl StorageReader, proxy: Address) -> Option<Address> {
    reader
        .read_storage(proxy, proxy_slots::ADMIN)
        .map(decode_address)
}

/// Read the initializer state of any contract (proxy or implementation).
pub fn read_initialization(reader: &impl StorageReader, address: Address) -> InitializationState {
    reader
        .read_storage(address, proxy_slots::INITIALIZED)
        .map(|word| InitializationState::from_version(decode_u64(word)))
        .unwrap_or_default()
}
