use anyhow::Result;
use clap::Parser;
use colored::*;
use studiolens::cli::Cli;
use studiolens::{execute, resolve_args};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, reload, util::SubscriberInitExt};

/// `RUST_LOG` if set, otherwise info or warn for this crate
fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            "studiolens=info".into()
        } else {
            "studiolens=warn".into()
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cli_verbose = cli.verbose;

    // Installed before the config file is read; a config that sets verbose swaps the filter
    let (filter, filter_handle) = reload::Layer::new(log_filter(cli_verbose));

    // Logs go to stderr so `--output json` stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = match resolve_args(cli) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
            std::process::exit(1);
        }
    };

    if args.verbose != cli_verbose
        && let Err(e) = filter_handle.reload(log_filter(args.verbose))
    {
        tracing::warn!(error = %e, "Failed to apply verbose setting from config");
    }

    if let Err(e) = execute(args).await {
        eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
