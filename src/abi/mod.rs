//! Call encoding and decoding
//!
//! Builds selector-prefixed call payloads from a function signature and typed
//! arguments, and decodes typed values back out of return data.
//!
//!   encode_call("set(uint256)", [20])
//!   ↓
//!   60fe47b1 ‖ 0000…0014
//!   ↓
//!   CallEnvelope { selector, encoded_args } on the receiving side

pub mod codec;
pub mod errors;
pub mod helpers;
pub mod selectors;
pub mod types;

pub use codec::{decode, decode_return, encode_call, encode_result, encode_with_selector};
pub use errors::AbiError;
pub use helpers::{decode_address, decode_u256, decode_u64, encode_address, encode_u256, encode_u64};
pub use selectors::{function_selector, Selector};
pub use types::{AbiType, AbiValue, FunctionSignature};

use alloy_primitives::Bytes;

use crate::constants::SELECTOR_LENGTH;

/// Calldata split into its selector and argument encoding.
///
/// Transient: built per call by the receiving contract, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEnvelope {
    /// First 4 bytes of the calldata
    pub selector: Selector,
    /// Everything after the selector
    pub encoded_args: Bytes,
}

impl CallEnvelope {
    /// Split calldata. Fails with [`AbiError::MissingSelector`] below 4 bytes.
    pub fn parse(calldata: &[u8]) -> Result<Self, AbiError> {
        if calldata.len() < SELECTOR_LENGTH {
            return Err(AbiError::MissingSelector {
                len: calldata.len(),
            });
        }
        let mut selector = [0u8; SELECTOR_LENGTH];
        selector.copy_from_slice(&calldata[..SELECTOR_LENGTH]);
        Ok(Self {
            selector,
            encoded_args: Bytes::copy_from_slice(&calldata[SELECTOR_LENGTH..]),
        })
    }

    /// Decode the arguments as `types`.
    pub fn decode_args(&self, types: &[AbiType]) -> Result<Vec<AbiValue>, AbiError> {
        decode(types, &self.encoded_args)
    }

    /// Selector as `0x`-prefixed hex, for logs.
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }
}
