use std::io::Read;

use crate::{
    address::Address,
    command::{TransactionKind, TransactionRecord},
    units::{UnitsError, parse_units},
};
use csv::{DeserializeRecordsIntoIter, Trim};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub caller: Address,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: Option<String>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed row: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Units(#[from] UnitsError),
}

impl TryFrom<Transaction> for TransactionRecord {
    type Error = UnitsError;

    fn try_from(tx: Transaction) -> Result<Self, Self::Error> {
        let amount = match tx.amount.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(amount) => Some(parse_units(amount)?),
        };
        Ok(TransactionRecord {
            kind: tx.kind,
            caller: tx.caller,
            from: tx.from,
            to: tx.to,
            amount,
        })
    }
}

/// Parses an operation log in CSV format (`type,caller,from,to,amount`).
/// Amounts are token quantities and come out in base units.
pub struct CsvTransactionParser<R> {
    iter: DeserializeRecordsIntoIter<R, Transaction>,
    header_error: Option<csv::Error>,
    finished: bool,
}

impl<R> CsvTransactionParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        // consume the header row now, so `position()` points at the next data row
        let header_error = reader.headers().err();

        Self {
            iter: reader.into_deserialize(),
            header_error,
            finished: false,
        }
    }
}

impl<R> Iterator for CsvTransactionParser<R>
where
    R: Read,
{
    type Item = (u64, Result<TransactionRecord, ParseError>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        // without usable headers no row can be mapped to its columns
        if let Some(err) = self.header_error.take() {
            self.finished = true;
            return Some((1, Err(err.into())));
        }
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| {
            let record = row
                .map_err(ParseError::from)
                .and_then(|tx| TransactionRecord::try_from(tx).map_err(ParseError::from));
            (curr_line, record)
        })
    }
}
