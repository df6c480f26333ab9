use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, Revert, SolError};
use thiserror::Error;

use crate::abi::{AbiError, Selector};

// Custom errors carried in revert data
sol! {
    error Unauthorized(address caller);
    error InvalidImplementation(address implementation);
    error NoImplementationSet();
    error AlreadyInitialized();
}

/// Errors that abort a call and roll back its state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Caller is not the proxy admin
    #[error("Unauthorized: caller {caller} is not the admin {admin}")]
    Unauthorized {
        /// Caller of the administrative operation
        caller: Address,
        /// Admin recorded in the proxy
        admin: Address,
    },

    /// Target has no code, or is the proxy itself
    #[error("Invalid implementation: {implementation}")]
    InvalidImplementation {
        /// Rejected implementation address
        implementation: Address,
    },

    /// Proxy implementation slot is zero
    #[error("No implementation set")]
    NoImplementationSet,

    /// Initializer already ran (or initializers are disabled)
    #[error("Already initialized")]
    AlreadyInitialized,

    /// The implementation failed while running under the proxy
    #[error("Delegated call to {implementation} failed: {reason}")]
    DelegatedFailure {
        /// Implementation the proxy delegated to
        implementation: Address,
        /// The implementation's own failure
        reason: Box<ExecutionError>,
    },

    /// No function matches the selector
    #[error("Unknown selector 0x{}", hex::encode(.selector))]
    UnknownSelector {
        /// Selector taken from the calldata
        selector: Selector,
    },

    /// Calldata or constructor arguments do not decode
    #[error("Invalid calldata: {0}")]
    InvalidCalldata(#[from] AbiError),

    /// Call target has no contract code
    #[error("No code at {address}")]
    NoCode {
        /// Target address
        address: Address,
    },

    /// Nested frames exceeded the configured depth
    #[error("Call depth limit of {limit} exceeded")]
    CallDepthExceeded {
        /// Configured maximum depth
        limit: usize,
    },

    /// Contract-defined revert with a reason string
    #[error("Reverted: {message}")]
    Reverted {
        /// Revert reason
        message: String,
    },
}

impl ExecutionError {
    /// Strip delegation layers down to the error the executing code raised.
    pub fn root_cause(&self) -> &ExecutionError {
        let mut err = self;
        while let Self::DelegatedFailure { reason, .. } = err {
            err = reason;
        }
        err
    }

    /// Solidity-style revert payload.
    ///
    /// Proxy and initializer failures use their custom error encodings; a
    /// delegated failure passes the implementation's payload through
    /// unchanged; everything else is `Error(string)` with the message.
    pub fn revert_data(&self) -> Bytes {
        let data = match self {
            Self::Unauthorized { caller, .. } => Unauthorized { caller: *caller }.abi_encode(),
            Self::InvalidImplementation { implementation } => InvalidImplementation {
                implementation: *implementation,
            }
            .abi_encode(),
            Self::NoImplementationSet => NoImplementationSet {}.abi_encode(),
            Self::AlreadyInitialized => AlreadyInitialized {}.abi_encode(),
            Self::DelegatedFailure { reason, .. } => return reason.revert_data(),
            other => Revert {
                reason: other.to_string(),
            }
            .abi_encode(),
        };
        data.into()
    }

    /// Whether the failure was raised by implementation code behind a proxy.
    pub fn is_delegated(&self) -> bool {
        matches!(self, Self::DelegatedFailure { .. })
    }
}
