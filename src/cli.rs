use alloy_primitives::U256;
use clap::Parser;
use std::path::PathBuf;

use crate::scenario::ScenarioOptions;

/// CLI arguments for the proxy scenario runner
#[derive(Parser, Debug)]
#[command(name = "proxyctl", about = "Deploy, initialize and upgrade an EIP-1967 proxy on an in-process ledger")]
pub struct Cli {
    /// Value passed to `initialize(uint256)` when the proxy is deployed
    #[arg(long, default_value = "10", value_parser = parse_uint)]
    pub init_value: U256,

    /// Value written with `set(uint256)` before the upgrade
    #[arg(long, default_value = "20", value_parser = parse_uint)]
    pub set_value: U256,

    /// Number of concurrent `increment()` callers after the upgrade.
    /// Set to 0 to skip the concurrency step.
    #[arg(long, default_value = "4")]
    pub writers: usize,

    /// JSON runtime config (`maxCallDepth`, `accounts`).
    /// Defaults to the standard dev accounts.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the scenario report as JSON instead of colored text
    #[arg(long)]
    pub json: bool,

    /// Enable structured JSON logging instead of human-readable output.
    ///
    /// When enabled, all log output is emitted as newline-delimited JSON.
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    pub fn scenario_options(&self) -> ScenarioOptions {
        ScenarioOptions {
            init_value: self.init_value,
            set_value: self.set_value,
            writers: self.writers,
        }
    }
}

/// Decimal or `0x`-prefixed hex `uint256`.
fn parse_uint(raw: &str) -> Result<U256, String> {
    raw.parse::<U256>().map_err(|err| format!("invalid uint256 {raw:?}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["proxyctl"]);
        assert_eq!(cli.scenario_options(), ScenarioOptions::default());
        assert!(cli.config.is_none());
        assert!(!cli.json);
        assert!(!cli.log_json);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "proxyctl",
            "--init-value",
            "0x10",
            "--set-value",
            "300",
            "--writers",
            "0",
            "--config",
            "proxy.json",
            "--json",
        ]);
        assert_eq!(cli.init_value, U256::from(16));
        assert_eq!(cli.set_value, U256::from(300));
        assert_eq!(cli.writers, 0);
        assert_eq!(cli.config, Some(PathBuf::from("proxy.json")));
        assert!(cli.json);
    }

    #[test]
    fn test_rejects_bad_uint() {
        assert!(Cli::try_parse_from(["proxyctl", "--set-value", "twenty"]).is_err());
        assert!(Cli::try_parse_from(["proxyctl", "--set-value", "-1"]).is_err());
    }
}
