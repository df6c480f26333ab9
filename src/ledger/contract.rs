use alloy_primitives::Bytes;
use std::fmt;

use super::context::ExecutionContext;
use super::errors::ExecutionError;

/// Executable code deployed at a ledger address.
///
/// The code itself is stateless; every read and write goes through the
/// [`ExecutionContext`], whose frame decides which account's storage is used.
/// Under delegation that is the calling proxy, not the account holding the code.
pub trait Contract: Send + Sync + fmt::Debug {
    /// Human-readable name, for logs and `Ledger::code_name`.
    fn name(&self) -> &str;

    /// Constructor, run once when the code is deployed.
    /// `args` are the ABI-encoded constructor arguments.
    fn construct(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> Result<(), ExecutionError> {
        let _ = (ctx, args);
        Ok(())
    }

    /// Handle a call. `input` is the full calldata, selector included.
    fn execute(&self, ctx: &mut ExecutionContext<'_>, input: &[u8]) -> Result<Bytes, ExecutionError>;
}
