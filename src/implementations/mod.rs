//! Reference implementation contracts.

pub mod simple_storage;

pub use simple_storage::SimpleStorage;
