use alloy_primitives::{Address, Bytes};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{Contract, ExecutionError, Ledger, Receipt};
use crate::config::RuntimeConfig;

/// Cloneable async handle to one [`Ledger`].
///
/// Each operation holds the lock for its whole duration, so concurrent
/// callers are serialized in lock-acquisition order and a call in flight
/// always sees a single implementation address behind a proxy.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::new(Ledger::new(config))
    }

    pub async fn deploy(
        &self,
        from: Address,
        code: Arc<dyn Contract>,
        args: &[u8],
    ) -> Result<Address, ExecutionError> {
        self.inner.lock().await.deploy(from, code, args)
    }

    pub async fn transact(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<Receipt, ExecutionError> {
        self.inner.lock().await.transact(from, to, data)
    }

    pub async fn call(&self, from: Address, to: Address, data: &[u8]) -> Result<Bytes, ExecutionError> {
        self.inner.lock().await.call(from, to, data)
    }

    /// Run `f` with read access to the ledger.
    pub async fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&*self.inner.lock().await)
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
