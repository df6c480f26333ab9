//! Runtime configuration for the ledger and the demo scenario.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::accounts::dev_accounts;
use crate::constants::DEFAULT_MAX_CALL_DEPTH;

/// Errors raised while loading a [`RuntimeConfig`] file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// File is not valid JSON for this schema
    #[error("Failed to parse config {}: {source}", .path.display())]
    Json {
        /// Config path
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// The scenario needs an admin and at least one other caller
    #[error("Config lists {got} accounts, need at least {need}")]
    NotEnoughAccounts {
        /// Minimum account count
        need: usize,
        /// Accounts listed
        got: usize,
    },
}

/// Ledger and scenario settings.
///
/// `accounts[0]` deploys everything and is the proxy admin; the rest are
/// ordinary callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Maximum nesting of call frames
    pub max_call_depth: usize,
    /// Known externally-owned accounts
    pub accounts: Vec<Address>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            accounts: vec![],
        }
    }
}

impl RuntimeConfig {
    /// Minimum accounts for the scenario: one admin plus one user.
    pub const MIN_ACCOUNTS: usize = 2;

    /// Development configuration with the standard dev accounts
    pub fn dev() -> Self {
        Self {
            accounts: dev_accounts(),
            ..Self::default()
        }
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Check that the scenario has the callers it needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accounts.len() < Self::MIN_ACCOUNTS {
            return Err(ConfigError::NotEnoughAccounts {
                need: Self::MIN_ACCOUNTS,
                got: self.accounts.len(),
            });
        }
        Ok(())
    }

    /// Builder method to set the call depth limit
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Builder method to set the account list
    pub fn with_accounts(mut self, accounts: Vec<Address>) -> Self {
        self.accounts = accounts;
        self
    }

    /// Builder method to append one account
    pub fn with_account(mut self, account: Address) -> Self {
        self.accounts.push(account);
        self
    }

    /// The deployer/admin account, if any.
    pub fn admin(&self) -> Option<Address> {
        self.accounts.first().copied()
    }

    /// Non-admin callers.
    pub fn users(&self) -> &[Address] {
        self.accounts.get(1..).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_call_depth, 1024);
        assert!(config.accounts.is_empty());
        assert!(config.admin().is_none());
        assert!(config.users().is_empty());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotEnoughAccounts { need: 2, got: 0 })
        ));
    }

    #[test]
    fn test_dev_config() {
        let config = RuntimeConfig::dev();
        assert_eq!(config.admin(), Some(dev_accounts()[0]));
        assert_eq!(config.users().len(), dev_accounts().len() - 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = RuntimeConfig::default()
            .with_max_call_depth(8)
            .with_account(Address::repeat_byte(1))
            .with_account(Address::repeat_byte(2));
        assert_eq!(config.max_call_depth, 8);
        assert_eq!(config.users(), &[Address::repeat_byte(2)]);

        let replaced = config.with_accounts(vec![Address::repeat_byte(9)]);
        assert_eq!(replaced.accounts, vec![Address::repeat_byte(9)]);
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config = RuntimeConfig::from_json(r#"{ "maxCallDepth": 16 }"#).unwrap();
        assert_eq!(config.max_call_depth, 16);
        assert!(config.accounts.is_empty());

        let config = RuntimeConfig::from_json(
            r#"{ "accounts": ["0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"] }"#,
        )
        .unwrap();
        assert_eq!(config.max_call_depth, 1024);
        assert_eq!(config.accounts, vec![dev_accounts()[0]]);
    }

    #[test]
    fn test_json_round_trip() {
        let config = RuntimeConfig::dev().with_max_call_depth(32);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("maxCallDepth"));
        assert_eq!(RuntimeConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let missing = std::env::temp_dir().join("upgradeable-proxy-missing-config.json");
        assert!(matches!(
            RuntimeConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));

        let bad = std::env::temp_dir().join(format!(
            "upgradeable-proxy-bad-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&bad, "{ not json").unwrap();
        let result = RuntimeConfig::load(&bad);
        std::fs::remove_file(&bad).unwrap();
        assert!(matches!(result, Err(ConfigError::Json { .. })));
    }
}
