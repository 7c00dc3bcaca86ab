//! Rummage binary entrypoint.
//!
//! Parses CLI arguments, initializes tracing, runs one engine
//! operation, and writes the rendered result to stdout.

use std::io::{self, Write};

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rummage::cli::{Cli, execute};

/// Initializes the tracing subscriber.
///
/// Reads `RUMMAGE_LOG` for per-module levels, falling back to
/// `rummage=debug` under `--verbose` and `rummage=warn` otherwise.
/// Diagnostics go to stderr so stdout stays machine-parseable.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "rummage=debug" } else { "rummage=warn" };
    let filter =
        EnvFilter::try_from_env("RUMMAGE_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = execute(&cli).await?;
    writeln!(io::stdout(), "{output}")?;
    Ok(())
}
