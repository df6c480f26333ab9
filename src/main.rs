use upgradeable_proxy::cli::Cli;
use upgradeable_proxy::config::RuntimeConfig;
use upgradeable_proxy::output;
use upgradeable_proxy::scenario;

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::EnvFilter;

/// Main entry point for the scenario runner
#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)
            .wrap_err_with(|| format!("loading {}", path.display()))?,
        None => RuntimeConfig::dev(),
    };

    if !cli.json {
        output::print_banner(&config);
    }

    let report = match scenario::run(&config, cli.scenario_options()).await {
        Ok(report) => report,
        Err(err) => {
            if !cli.json {
                output::print_failure(&err);
            }
            return Err(err);
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_report(&report);
    }
    Ok(())
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
