//! Typed clients over a [`SharedLedger`].
//!
//! Each method encodes its call, submits it (committing for writes, a
//! read-only call for views) and decodes the return value.

use alloy_primitives::{Address, Bytes, U256};
use thiserror::Error;

use crate::abi::{decode_return, encode_call, AbiError, AbiType, AbiValue};
use crate::ledger::{ExecutionError, Receipt, SharedLedger};

/// Errors from a typed client call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The call itself failed
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The call succeeded but returned something that does not decode
    #[error("Failed to decode return data: {0}")]
    Decode(#[from] AbiError),
}

impl ClientError {
    /// The execution failure, if this was one.
    pub fn execution(&self) -> Option<&ExecutionError> {
        match self {
            Self::Execution(err) => Some(err),
            Self::Decode(_) => None,
        }
    }
}

/// `SimpleStorage` ABI, usually pointed at a proxy.
#[derive(Debug, Clone)]
pub struct SimpleStorageClient {
    ledger: SharedLedger,
    target: Address,
    from: Address,
}

impl SimpleStorageClient {
    pub fn new(ledger: SharedLedger, target: Address, from: Address) -> Self {
        Self { ledger, target, from }
    }

    /// Same target, different sender.
    pub fn as_caller(&self, from: Address) -> Self {
        Self {
            from,
            ..self.clone()
        }
    }

    pub fn target(&self) -> Address {
        self.target
    }

    pub fn caller(&self) -> Address {
        self.from
    }

    pub async fn initialize(&self, value: U256) -> Result<Receipt, ClientError> {
        self.send("initialize(uint256)", &[AbiValue::uint256(value)]).await
    }

    pub async fn get(&self) -> Result<U256, ClientError> {
        let out = self.view("get()").await?;
        uint(&out)
    }

    /// Store `value`; returns the value the contract reports back.
    pub async fn set(&self, value: U256) -> Result<U256, ClientError> {
        let receipt = self.send("set(uint256)", &[AbiValue::uint256(value)]).await?;
        uint(&receipt.output)
    }

    pub async fn version(&self) -> Result<U256, ClientError> {
        let out = self.view("version()").await?;
        uint(&out)
    }

    /// v2 only; returns the new value.
    pub async fn increment(&self) -> Result<U256, ClientError> {
        let receipt = self.send("increment()", &[]).await?;
        uint(&receipt.output)
    }

    async fn send(&self, signature: &str, args: &[AbiValue]) -> Result<Receipt, ClientError> {
        let data = encode_call(signature, args)?;
        Ok(self.ledger.transact(self.from, self.target, &data).await?)
    }

    async fn view(&self, signature: &str) -> Result<Bytes, ClientError> {
        let data = encode_call(signature, &[])?;
        Ok(self.ledger.call(self.from, self.target, &data).await?)
    }
}

/// Administrative ABI of an upgradeable proxy.
#[derive(Debug, Clone)]
pub struct ProxyAdminClient {
    ledger: SharedLedger,
    proxy: Address,
    from: Address,
}

impl ProxyAdminClient {
    pub fn new(ledger: SharedLedger, proxy: Address, from: Address) -> Self {
        Self { ledger, proxy, from }
    }

    pub fn as_caller(&self, from: Address) -> Self {
        Self {
            from,
            ..self.clone()
        }
    }

    pub fn proxy(&self) -> Address {
        self.proxy
    }

    pub async fn upgrade_to(&self, implementation: Address) -> Result<Receipt, ClientError> {
        let data = encode_call("upgradeTo(address)", &[AbiValue::Address(implementation)])?;
        Ok(self.ledger.transact(self.from, self.proxy, &data).await?)
    }

    /// Upgrade and run `data` against the new implementation in one transaction.
    pub async fn upgrade_to_and_call(
        &self,
        implementation: Address,
        data: Bytes,
    ) -> Result<Receipt, ClientError> {
        let call = encode_call(
            "upgradeToAndCall(address,bytes)",
            &[AbiValue::Address(implementation), AbiValue::Bytes(data)],
        )?;
        Ok(self.ledger.transact(self.from, self.proxy, &call).await?)
    }

    pub async fn admin(&self) -> Result<Address, ClientError> {
        self.address_view("admin()").await
    }

    pub async fn implementation(&self) -> Result<Address, ClientError> {
        self.address_view("implementation()").await
    }

    async fn address_view(&self, signature: &str) -> Result<Address, ClientError> {
        let data = encode_call(signature, &[])?;
        let out = self.ledger.call(self.from, self.proxy, &data).await?;
        let value = decode_return(AbiType::Address, &out)?;
        value.as_address().ok_or_else(|| mismatch(AbiType::Address, &value))
    }
}

fn uint(data: &[u8]) -> Result<U256, ClientError> {
    let value = decode_return(AbiType::Uint(256), data)?;
    value.as_uint().ok_or_else(|| mismatch(AbiType::Uint(256), &value))
}

fn mismatch(expected: AbiType, got: &AbiValue) -> ClientError {
    AbiError::TypeMismatch {
        index: 0,
        expected,
        got: got.abi_type(),
    }
    .into()
}
