use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol_data, SolType};
use tracing::info;

use super::dispatcher::delegate_to;
use crate::abi::AbiError;
use crate::ledger::{ExecutionContext, ExecutionError};
use crate::storage::ProxySlots;

/// `upgradeTo(address)`: admin-only swap of the implementation slot.
pub fn upgrade_to(
    ctx: &mut ExecutionContext<'_>,
    slots: &ProxySlots,
    args: &[u8],
) -> Result<Bytes, ExecutionError> {
    only_admin(ctx, slots)?;
    let (new_implementation,) =
        <(sol_data::Address,)>::abi_decode_params(args).map_err(invalid_args)?;
    set_implementation(ctx, slots, new_implementation)?;
    Ok(Bytes::new())
}

/// `upgradeToAndCall(address,bytes)`: upgrade, then delegate `data` to the new
/// implementation when it is non-empty. A failing setup call fails the whole
/// upgrade.
pub fn upgrade_to_and_call(
    ctx: &mut ExecutionContext<'_>,
    slots: &ProxySlots,
    args: &[u8],
) -> Result<Bytes, ExecutionError> {
    only_admin(ctx, slots)?;
    let (new_implementation, data) =
        <(sol_data::Address, sol_data::Bytes)>::abi_decode_params(args).map_err(invalid_args)?;
    set_implementation(ctx, slots, new_implementation)?;
    if data.is_empty() {
        return Ok(Bytes::new());
    }
    delegate_to(ctx, new_implementation, &data)
}

/// Reject anything that is not deployed code, and the proxy itself.
pub(crate) fn validate_implementation(
    ctx: &ExecutionContext<'_>,
    implementation: Address,
) -> Result<(), ExecutionError> {
    if implementation == ctx.address() || !ctx.has_code(implementation) {
        return Err(ExecutionError::InvalidImplementation { implementation });
    }
    Ok(())
}

/// Validate and write the implementation slot. No other slot is touched.
fn set_implementation(
    ctx: &mut ExecutionContext<'_>,
    slots: &ProxySlots,
    new_implementation: Address,
) -> Result<(), ExecutionError> {
    validate_implementation(ctx, new_implementation)?;
    let previous = slots.get_implementation(ctx);
    slots.set_implementation(ctx, new_implementation);
    info!(
        proxy = %ctx.address(),
        %previous,
        implementation = %new_implementation,
        "upgraded"
    );
    Ok(())
}

fn only_admin(ctx: &ExecutionContext<'_>, slots: &ProxySlots) -> Result<(), ExecutionError> {
    let admin = slots.get_admin(ctx);
    let caller = ctx.caller();
    if caller != admin {
        return Err(ExecutionError::Unauthorized { caller, admin });
    }
    Ok(())
}

fn invalid_args(err: alloy_sol_types::Error) -> ExecutionError {
    ExecutionError::InvalidCalldata(AbiError::from(err))
}
