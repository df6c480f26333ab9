//! Colored console output for `proxyctl`.
//!
//! Color scheme: blue+bold headers, cyan values, green success,
//! yellow expected rejections, dimmed secondary text.

use alloy_primitives::{Address, U256};
use colored::Colorize;

use crate::config::RuntimeConfig;
use crate::scenario::{ScenarioReport, StepOutcome, StepReport};
use crate::storage::ProxyState;

// ── Helpers ────────────────────────────────────────────────────────

/// Shorten an address to `0x1234…abcd` for step lines.
pub fn short_address(addr: &Address) -> String {
    let full = format!("{addr}");
    if full.len() <= 12 {
        return full;
    }
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

// ── Banner ─────────────────────────────────────────────────────────

/// Print the startup banner with the runtime settings.
pub fn print_banner(config: &RuntimeConfig) {
    println!();
    println!("{}", "=== Upgradeable Proxy Scenario ===".blue().bold());
    println!(
        "  Call depth:   {}",
        config.max_call_depth.to_string().cyan()
    );
    println!("  Accounts:     {}", config.accounts.len().to_string().cyan());
    if let Some(admin) = config.admin() {
        println!("  Admin:        {}", format!("{admin}").cyan());
    }
}

// ── Scenario ───────────────────────────────────────────────────────

/// Print deployed addresses.
pub fn print_contracts(report: &ScenarioReport) {
    println!();
    println!("{}", "Contracts:".blue().bold());
    for (label, address) in [
        ("SimpleStorageV1", report.v1),
        ("SimpleStorageV2", report.v2),
        ("Proxy          ", report.proxy),
    ] {
        println!("  {} {}", label.dimmed(), format!("{address}").cyan());
    }
}

/// Print one scenario step.
pub fn print_step(index: usize, step: &StepReport) {
    let marker = match step.outcome {
        StepOutcome::Ok => "OK".green().bold(),
        StepOutcome::Rejected => "REJECTED".yellow().bold(),
    };
    let call = if step.call.is_empty() {
        String::new()
    } else {
        format!(" {} {}", step.call, step.selector.dimmed())
    };
    println!(
        "  {} {} {}{} from {}",
        format!("{:>2}.", index + 1).dimmed(),
        marker,
        step.name.cyan(),
        call,
        short_address(&step.caller).dimmed(),
    );
    println!("      {}", step.detail.dimmed());
}

/// Print the steps section.
pub fn print_steps(steps: &[StepReport]) {
    println!();
    println!("{}", "Steps:".blue().bold());
    for (i, step) in steps.iter().enumerate() {
        print_step(i, step);
    }
}

/// Print the proxy metadata read back from storage.
pub fn print_proxy_state(state: &ProxyState, value: U256) {
    println!();
    println!("{}", "Final proxy state:".blue().bold());
    println!(
        "  {} {}",
        "Implementation:".dimmed(),
        format!("{}", state.implementation).cyan()
    );
    println!("  {} {}", "Admin:         ".dimmed(), format!("{}", state.admin).cyan());
    println!(
        "  {} {:?}",
        "Initializer:   ".dimmed(),
        state.initialization
    );
    println!("  {} {}", "Value:         ".dimmed(), value.to_string().cyan());
}

/// Print the whole report.
pub fn print_report(report: &ScenarioReport) {
    print_contracts(report);
    print_steps(&report.steps);
    print_proxy_state(&report.state, report.final_value);
    println!();
    println!(
        "{} {} steps, {} expected rejections, {} transactions committed",
        "Scenario passed:".green().bold(),
        report.steps.len().to_string().cyan(),
        report.rejected_count().to_string().cyan(),
        report.transactions.to_string().cyan(),
    );
}

/// Print a failed run.
pub fn print_failure(err: &eyre::Report) {
    println!();
    println!("  {} {}", "FAILED".red().bold(), err.to_string().red());
    for cause in err.chain().skip(1) {
        println!("    {} {}", "caused by:".dimmed(), cause);
    }
}

// ── Tests ───────────────────────────────────────────────────────────
