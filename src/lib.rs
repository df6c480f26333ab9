//! # Upgradeable proxy runtime
//!
//! An EIP-1967 upgradeable proxy on a small in-process ledger: ABI call
//! encoding, reserved storage slots for proxy metadata, delegated dispatch,
//! admin-gated upgrades and one-shot initialization, plus reference
//! implementations, typed clients and a scenario runner.

pub mod abi;
pub mod accounts;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod implementations;
pub mod initializer;
pub mod ledger;
pub mod output;
pub mod proxy;
pub mod scenario;
pub mod storage;
