use std::io::Write;

use anyhow::Context;
use csv::WriterBuilder;
use serde::Serialize;

use crate::address::Address;

#[derive(Debug, Serialize)]
pub struct AccountBalance {
    pub account: Address,
    /// Token quantity, already formatted from base units.
    pub balance: String,
}

/// Writes `account,balance` rows. The header is written even when there are no
/// accounts.
pub fn print_balances<W>(
    output: &mut W,
    balances: impl Iterator<Item = AccountBalance>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);
    writer
        .write_record(["account", "balance"])
        .context("Failed to write CSV header")?;
    for row in balances {
        writer
            .serialize(&row)
            .with_context(|| format!("Failed to write balance of {}", row.account))?;
    }
    writer.flush().context("Failed to flush CSV writer")
}
