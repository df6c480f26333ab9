//! Upgradeable proxy
//!
//! A stable address that owns the state and forwards calls to a swappable
//! implementation:
//!
//!   caller → proxy.execute(input)
//!            ├─ upgradeTo / upgradeToAndCall   → upgrade (admin only)
//!            ├─ admin() / implementation()     → views (anyone)
//!            └─ anything else                  → dispatcher::forward
//!                                                 ↓ delegate_call
//!                                                 implementation code on proxy storage
//!
//! Administrative selectors are always handled by the proxy, even when the
//! implementation declares a function with the same selector.

pub mod dispatcher;
pub mod upgrade;

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol_data, SolType, SolValue};
use tracing::info;

use crate::abi::{selectors, CallEnvelope};
use crate::ledger::{Contract, ExecutionContext, ExecutionError};
use crate::storage::ProxySlots;

/// Proxy constructor parameters `(address initialImplementation, bytes initCallData)`.
type ConstructorParams = (sol_data::Address, sol_data::Bytes);

/// ABI-encode the proxy constructor arguments `(address, bytes)`.
pub fn constructor_args(implementation: Address, init_data: &[u8]) -> Bytes {
    let params = (implementation, Bytes::copy_from_slice(init_data));
    ConstructorParams::abi_encode_params(&params).into()
}

/// EIP-1967 upgradeable proxy.
///
/// Deployed with `(initialImplementation, initCallData)`; the deployer
/// becomes the admin for the proxy's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeableProxy {
    slots: ProxySlots,
}

impl UpgradeableProxy {
    pub fn new() -> Self {
        Self {
            slots: ProxySlots::derive(),
        }
    }

    pub fn slots(&self) -> &ProxySlots {
        &self.slots
    }
}

impl Default for UpgradeableProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl Contract for UpgradeableProxy {
    fn name(&self) -> &str {
        "UpgradeableProxy"
    }

    /// Record the admin, set the initial implementation and run the init
    /// call data, all inside the deployment.
    fn construct(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> Result<(), ExecutionError> {
        let (implementation, init_data) = ConstructorParams::abi_decode_params(args)
            .map_err(|err| ExecutionError::InvalidCalldata(err.into()))?;

        let admin = ctx.caller();
        self.slots.set_admin(ctx, admin);

        if !implementation.is_zero() {
            upgrade::validate_implementation(ctx, implementation)?;
            self.slots.set_implementation(ctx, implementation);
        }

        if !init_data.is_empty() {
            dispatcher::forward(ctx, &self.slots, &init_data)?;
        }

        info!(
            proxy = %ctx.address(),
            %admin,
            implementation = %implementation,
            initialized = !init_data.is_empty(),
            "proxy constructed"
        );
        Ok(())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, input: &[u8]) -> Result<Bytes, ExecutionError> {
        let Ok(envelope) = CallEnvelope::parse(input) else {
            return dispatcher::forward(ctx, &self.slots, input);
        };

        let selector = envelope.selector;
        if selector == selectors::upgrade_to() {
            upgrade::upgrade_to(ctx, &self.slots, &envelope.encoded_args)
        } else if selector == selectors::upgrade_to_and_call() {
            upgrade::upgrade_to_and_call(ctx, &self.slots, &envelope.encoded_args)
        } else if selector == selectors::admin() {
            Ok(self.slots.get_admin(ctx).abi_encode().into())
        } else if selector == selectors::implementation() {
            Ok(self.slots.get_implementation(ctx).abi_encode().into())
        } else {
            dispatcher::forward(ctx, &self.slots, input)
        }
    }
}
