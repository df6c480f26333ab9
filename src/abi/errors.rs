use thiserror::Error;

use super::types::AbiType;

/// Errors raised while encoding call payloads or decoding return data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// Output bytes do not have the size the declared type requires
    #[error("Malformed output for {ty}: expected {expected} bytes, got {got}")]
    MalformedOutput {
        /// Declared output type
        ty: AbiType,
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        got: usize,
    },

    /// Signature string is not of the form `name(type,...)`
    #[error("Invalid function signature: {0}")]
    InvalidSignature(String),

    /// Type name is not one of the supported ABI types
    #[error("Unsupported ABI type: {0}")]
    UnsupportedType(String),

    /// Wrong number of arguments for the signature
    #[error("Argument count mismatch: expected {expected}, got {got}")]
    ArgumentCountMismatch {
        /// Parameters declared by the signature
        expected: usize,
        /// Arguments supplied
        got: usize,
    },

    /// Argument value does not match the declared parameter type
    #[error("Type mismatch at argument {index}: expected {expected}, got {got}")]
    TypeMismatch {
        /// Zero-based argument position
        index: usize,
        /// Declared type
        expected: AbiType,
        /// Type of the supplied value
        got: AbiType,
    },

    /// Value does not fit its declared type (dirty high bits, non-0/1 bool, ...)
    #[error("Value out of range for {ty}")]
    ValueOutOfRange {
        /// Declared type
        ty: AbiType,
    },

    /// Calldata is shorter than a function selector
    #[error("Calldata too short for a selector: {len} bytes")]
    MissingSelector {
        /// Calldata length
        len: usize,
    },

    /// Encoded data is shorter than the head its declared types need
    #[error("Encoded data truncated: needed {needed} bytes, have {available}")]
    Truncated {
        /// Bytes the head needs
        needed: usize,
        /// Total bytes available
        available: usize,
    },

    /// The ABI decoder rejected the data (a tail outside the buffer, bad offsets, ...)
    #[error("ABI decoding failed: {0}")]
    Decode(String),
}

impl From<alloy_sol_types::Error> for AbiError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
