use alloy_primitives::{Address, Bytes, B256, U256};
use serde::Serialize;

use super::errors::ExecutionError;
use super::Ledger;

/// How a frame was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    /// Ordinary call: code and storage belong to the same account.
    Call,
    /// Delegated call: foreign code runs against the caller's storage and identity.
    DelegateCall,
}

/// One level of execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// `msg.sender` as the executing code sees it
    pub caller: Address,
    /// Account whose storage the frame reads and writes
    pub address: Address,
    /// Account whose code is running
    pub code_address: Address,
    pub kind: FrameKind,
    /// 0 for the transaction's top frame
    pub depth: usize,
}

impl Frame {
    /// Top-level frame of a transaction from `caller` to `target`.
    pub fn top(caller: Address, target: Address) -> Self {
        Self {
            caller,
            address: target,
            code_address: target,
            kind: FrameKind::Call,
            depth: 0,
        }
    }

    /// Child frame for a delegated call: same caller and storage, other code.
    pub fn delegate(&self, code_address: Address) -> Self {
        Self {
            caller: self.caller,
            address: self.address,
            code_address,
            kind: FrameKind::DelegateCall,
            depth: self.depth + 1,
        }
    }

    /// Child frame for an ordinary call made by this frame's account.
    pub fn call(&self, target: Address) -> Self {
        Self {
            caller: self.address,
            address: target,
            code_address: target,
            kind: FrameKind::Call,
            depth: self.depth + 1,
        }
    }
}

/// What contract code sees while it runs: its frame plus access to the ledger.
///
/// Storage access is always scoped to `frame.address`.
#[derive(Debug)]
pub struct ExecutionContext<'a> {
    ledger: &'a mut Ledger,
    frame: Frame,
}

impl<'a> ExecutionContext<'a> {
    pub(crate) fn new(ledger: &'a mut Ledger, frame: Frame) -> Self {
        Self { ledger, frame }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn caller(&self) -> Address {
        self.frame.caller
    }

    /// Account whose storage this frame uses.
    pub fn address(&self) -> Address {
        self.frame.address
    }

    pub fn code_address(&self) -> Address {
        self.frame.code_address
    }

    pub fn is_delegated(&self) -> bool {
        self.frame.kind == FrameKind::DelegateCall
    }

    /// Read a slot of the executing storage (zero when unset).
    pub fn sload(&self, slot: U256) -> B256 {
        self.ledger.storage_at(self.frame.address, slot)
    }

    /// Write a slot of the executing storage.
    pub fn sstore(&mut self, slot: U256, value: B256) {
        self.ledger.set_storage(self.frame.address, slot, value);
    }

    pub fn has_code(&self, address: Address) -> bool {
        self.ledger.has_code(address)
    }

    /// Run `code_address`'s code against this frame's storage, as this frame's caller.
    ///
    /// On failure the child's writes are rolled back before the error returns.
    pub fn delegate_call(&mut self, code_address: Address, input: &[u8]) -> Result<Bytes, ExecutionError> {
        let frame = self.frame.delegate(code_address);
        self.ledger.execute_frame(frame, input)
    }

    /// Call `target` with this frame's account as the caller.
    pub fn call(&mut self, target: Address, input: &[u8]) -> Result<Bytes, ExecutionError> {
        let frame = self.frame.call(target);
        self.ledger.execute_frame(frame, input)
    }
}
