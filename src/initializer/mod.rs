//! One-shot initialization
//!
//! Construction of a proxy and initialization of the logic behind it are
//! separate steps: the proxy runs the init call data through delegation, so
//! the initializer writes into the proxy's storage. The flag lives at the
//! EIP-1967-style `INITIALIZED` slot of whichever account is executing.
//!
//!   Uninitialized ──initialize()──▶ Initialized { version: 1 }
//!   Uninitialized ──disable_initializers()──▶ Disabled
//!
//! Both transitions are one-way.

use serde::Serialize;
use tracing::debug;

use crate::constants::{DISABLED_INITIALIZATION_VERSION, FIRST_INITIALIZATION_VERSION};
use crate::ledger::{ExecutionContext, ExecutionError};
use crate::storage::ProxySlots;

/// Initializer state decoded from the stored version counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InitializationState {
    /// Version 0: `initialize` may run once
    #[default]
    Uninitialized,
    /// Initialized at `version`
    Initialized { version: u64 },
    /// Version `u64::MAX`: initializers can never run
    Disabled,
}

impl InitializationState {
    pub fn from_version(version: u64) -> Self {
        match version {
            0 => Self::Uninitialized,
            DISABLED_INITIALIZATION_VERSION => Self::Disabled,
            version => Self::Initialized { version },
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            Self::Uninitialized => 0,
            Self::Initialized { version } => *version,
            Self::Disabled => DISABLED_INITIALIZATION_VERSION,
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self, Self::Uninitialized)
    }
}

/// Guard for an initializer function. Call it first: it fails with
/// [`ExecutionError::AlreadyInitialized`] unless the executing storage is
/// uninitialized, and otherwise marks it initialized before any other write.
///
/// A failure later in the same call rolls the flag back with the frame.
pub fn initializer(ctx: &mut ExecutionContext<'_>) -> Result<(), ExecutionError> {
    let slots = ProxySlots::EIP1967;
    if !slots.read_initialization(ctx).is_uninitialized() {
        return Err(ExecutionError::AlreadyInitialized);
    }
    slots.write_initialization(
        ctx,
        InitializationState::Initialized {
            version: FIRST_INITIALIZATION_VERSION,
        },
    );
    debug!(
        storage = %ctx.address(),
        code = %ctx.code_address(),
        delegated = ctx.is_delegated(),
        "initializer ran"
    );
    Ok(())
}

/// Lock the executing storage against any future initializer.
///
/// Implementation contracts call this from their constructor so nobody can
/// initialize the bare implementation account.
pub fn disable_initializers(ctx: &mut ExecutionContext<'_>) {
    let slots = ProxySlots::EIP1967;
    if slots.read_initialization(ctx) != InitializationState::Disabled {
        slots.write_initialization(ctx, InitializationState::Disabled);
    }
}
