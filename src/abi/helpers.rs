use alloy_primitives::{Address, B256, U256};

use crate::constants::{ADDRESS_LENGTH, WORD_SIZE};

/// Encode an address into a word (left-padded with zeros).
pub fn encode_address(addr: Address) -> B256 {
    addr.into_word()
}

/// Decode an address from the low 20 bytes of a word. High bytes are ignored.
pub fn decode_address(value: B256) -> Address {
    Address::from_word(value)
}

/// Encode a u256 into a big-endian word.
pub fn encode_u256(value: U256) -> B256 {
    B256::from(value.to_be_bytes())
}

/// Decode a big-endian word into a u256.
pub fn decode_u256(value: B256) -> U256 {
    U256::from_be_bytes(value.0)
}

/// Encode a u64 value into a word.
pub fn encode_u64(value: u64) -> B256 {
    encode_u256(U256::from(value))
}

/// Decode the low 64 bits of a word.
pub fn decode_u64(value: B256) -> u64 {
    decode_u256(value).as_limbs()[0]
}

/// Whether the high bytes of a word are clear, i.e. it holds a clean address.
pub fn is_clean_address(value: B256) -> bool {
    value[..WORD_SIZE - ADDRESS_LENGTH].iter().all(|b| *b == 0)
}
