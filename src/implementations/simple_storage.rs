use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolValue;

use crate::abi::{decode_u256, encode_u256, selectors, AbiError, AbiType, AbiValue, CallEnvelope};
use crate::initializer::{disable_initializers, initializer};
use crate::ledger::{Contract, ExecutionContext, ExecutionError};
use crate::storage::simple_storage_slots;

/// Integer getter/setter meant to sit behind an upgradeable proxy.
///
/// Both versions share the storage layout (`value` at slot 0) and the ABI
/// `initialize(uint256)`, `get()`, `set(uint256)`, `version()`. Version 2
/// adds `increment()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleStorage {
    version: u64,
}

impl SimpleStorage {
    pub fn v1() -> Self {
        Self { version: 1 }
    }

    pub fn v2() -> Self {
        Self { version: 2 }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn load(ctx: &ExecutionContext<'_>) -> U256 {
        decode_u256(ctx.sload(simple_storage_slots::VALUE))
    }

    fn store(ctx: &mut ExecutionContext<'_>, value: U256) {
        ctx.sstore(simple_storage_slots::VALUE, encode_u256(value));
    }

    fn uint_result(value: U256) -> Result<Bytes, ExecutionError> {
        Ok(value.abi_encode().into())
    }
}

/// Decode the single `uint256` argument of `initialize`/`set`.
fn uint_argument(envelope: &CallEnvelope) -> Result<U256, ExecutionError> {
    let args = envelope.decode_args(&[AbiType::Uint(256)])?;
    args.first()
        .and_then(AbiValue::as_uint)
        .ok_or(ExecutionError::InvalidCalldata(AbiError::ArgumentCountMismatch {
            expected: 1,
            got: args.len(),
        }))
}

impl Contract for SimpleStorage {
    fn name(&self) -> &str {
        match self.version {
            1 => "SimpleStorageV1",
            _ => "SimpleStorageV2",
        }
    }

    /// Lock the bare implementation account; only proxies get initialized.
    fn construct(&self, ctx: &mut ExecutionContext<'_>, _args: &[u8]) -> Result<(), ExecutionError> {
        disable_initializers(ctx);
        Ok(())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, input: &[u8]) -> Result<Bytes, ExecutionError> {
        let envelope = CallEnvelope::parse(input)?;
        let selector = envelope.selector;

        if selector == selectors::initialize() {
            initializer(ctx)?;
            let value = uint_argument(&envelope)?;
            Self::store(ctx, value);
            Ok(Bytes::new())
        } else if selector == selectors::get() {
            Self::uint_result(Self::load(ctx))
        } else if selector == selectors::set() {
            let value = uint_argument(&envelope)?;
            Self::store(ctx, value);
            Self::uint_result(value)
        } else if selector == selectors::version() {
            Self::uint_result(U256::from(self.version))
        } else if selector == selectors::increment() && self.version >= 2 {
            let value = Self::load(ctx)
                .checked_add(U256::from(1))
                .ok_or_else(|| ExecutionError::Reverted {
                    message: "arithmetic overflow".to_string(),
                })?;
            Self::store(ctx, value);
            Self::uint_result(value)
        } else {
            Err(ExecutionError::UnknownSelector { selector })
        }
    }
}
