use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use erc20_ledger::{
    address::Address,
    bin_utils::{RowError, Service},
    processor::MintPolicy,
};
use tracing_subscriber::EnvFilter;

/// Replays an ERC20 operation log and prints the final balances as CSV.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// CSV file with `type,caller,from,to,amount` rows
    file: PathBuf,
    /// Only this account may mint; anyone may when omitted
    #[arg(long)]
    minter: Option<Address>,
    /// Log every applied operation
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let file = File::open(&cli.file)
        .with_context(|| format!("Failed to open `{}`", cli.file.display()))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        policy: cli.minter.map_or(MintPolicy::Open, MintPolicy::Minter),
        error_printer: Box::new(|line: u64, err: RowError| {
            if err.is_revert() {
                tracing::info!(line, "operation reverted: {err}")
            } else {
                eprintln!("Error at line {line}: {err}")
            }
        }),
    };
    service.run()
}
