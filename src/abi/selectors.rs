use alloy_primitives::keccak256;

use crate::constants::SELECTOR_LENGTH;

/// A 4-byte function (or custom error) selector.
pub type Selector = [u8; SELECTOR_LENGTH];

/// Compute the Solidity function selector (first 4 bytes of keccak256(signature)).
///
/// The signature must already be canonical; see
/// [`FunctionSignature::canonical`](super::FunctionSignature::canonical).
pub fn function_selector(signature: &str) -> Selector {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; SELECTOR_LENGTH];
    selector.copy_from_slice(&hash[..SELECTOR_LENGTH]);
    selector
}

// Proxy administration
pub fn upgrade_to() -> Selector {
    function_selector("upgradeTo(address)")
}
pub fn upgrade_to_and_call() -> Selector {
    function_selector("upgradeToAndCall(address,bytes)")
}
pub fn admin() -> Selector {
    function_selector("admin()")
}
pub fn implementation() -> Selector {
    function_selector("implementation()")
}

// SimpleStorage
pub fn initialize() -> Selector {
    function_selector("initialize(uint256)")
}
pub fn get() -> Selector {
    function_selector("get()")
}
pub fn set() -> Selector {
    function_selector("set(uint256)")
}
pub fn version() -> Selector {
    function_selector("version()")
}
pub fn increment() -> Selector {
    function_selector("increment()")
}
