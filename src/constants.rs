/// ABI word size in bytes. Every static value occupies exactly one word.
pub const WORD_SIZE: usize = 32;
/// Function selector length (first 4 bytes of keccak256(signature))
pub const SELECTOR_LENGTH: usize = 4;
/// Ethereum address length (20 bytes)
pub const ADDRESS_LENGTH: usize = 20;
/// Default maximum nesting of call frames (matches the EVM call depth limit)
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;
/// Initialization version written by a first-time initializer
pub const FIRST_INITIALIZATION_VERSION: u64 = 1;
/// Initialization version marking that initializers are permanently disabled
pub const DISABLED_INITIALIZATION_VERSION: u64 = u64::MAX;
