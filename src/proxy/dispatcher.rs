use alloy_primitives::{Address, Bytes};
use tracing::debug;

use crate::ledger::{ExecutionContext, ExecutionError};
use crate::storage::ProxySlots;

/// Proxy fallback: forward `input` unchanged to the current implementation.
///
/// The implementation runs against the proxy's storage with the original
/// caller. Its output is returned as-is; its failure comes back wrapped in
/// [`ExecutionError::DelegatedFailure`].
pub fn forward(
    ctx: &mut ExecutionContext<'_>,
    slots: &ProxySlots,
    input: &[u8],
) -> Result<Bytes, ExecutionError> {
    let implementation = slots.get_implementation(ctx);
    if implementation.is_zero() {
        return Err(ExecutionError::NoImplementationSet);
    }
    delegate_to(ctx, implementation, input)
}

/// Delegate `input` to a known implementation.
pub(crate) fn delegate_to(
    ctx: &mut ExecutionContext<'_>,
    implementation: Address,
    input: &[u8],
) -> Result<Bytes, ExecutionError> {
    debug!(
        proxy = %ctx.address(),
        %implementation,
        selector = %hex::encode(input.get(..4).unwrap_or(input)),
        "delegating"
    );
    ctx.delegate_call(implementation, input)
        .map_err(|reason| ExecutionError::DelegatedFailure {
            implementation,
            reason: Box::new(reason),
        })
}
