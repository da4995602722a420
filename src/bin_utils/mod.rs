//! Bootstraps [`erc20_ledger`](crate) for the command line: reads an operation
//! log, runs it through a processor and prints the resulting balances.

use std::io::{Read, Write};

use crate::{
    ledger::LedgerError,
    processor::{
        MintPolicy, TransactionProcessError, TransactionProcessor,
        in_memory_processor::InMemoryTransactionProcessor,
    },
    units::format_units,
};
use anyhow::Result;
use csv_parser::{CsvTransactionParser, ParseError};
use csv_printer::{AccountBalance, print_balances};
use thiserror::Error;

pub mod csv_parser;
pub mod csv_printer;

/// Why a single row of the operation log was skipped.
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Process(#[from] TransactionProcessError),
}

impl RowError {
    /// Insufficient balance or allowance: the operation was rejected the way
    /// a contract call reverts. Everything else is a malformed log or usage
    /// error, `Overflow` included.
    pub fn is_revert(&self) -> bool {
        matches!(
            self,
            RowError::Process(TransactionProcessError::LedgerErr(
                LedgerError::InsufficientBalance | LedgerError::InsufficientAllowance
            ))
        )
    }
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub policy: MintPolicy,
    pub error_printer: Box<dyn FnMut(u64, RowError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvTransactionParser::new(self.input);

        let mut processor = InMemoryTransactionProcessor::with_policy(self.policy);

        let mut applied = 0usize;
        for (line, row) in parser {
            let outcome = row
                .map_err(RowError::from)
                .and_then(|record| {
                    processor
                        .process_transaction(&record)
                        .map_err(RowError::from)
                });
            match outcome {
                Ok(_) => applied += 1,
                Err(err) => (self.error_printer)(line, err),
            }
        }
        tracing::info!(
            applied,
            total_supply = %format_units(processor.ledger.total_supply()),
            "operation log processed"
        );

        let mut balances: Vec<_> = processor.ledger.accounts().collect();
        balances.sort_unstable();
        print_balances(
            self.output,
            balances.into_iter().map(|(account, balance)| AccountBalance {
                account,
                balance: format_units(balance),
            }),
        )
    }
}
