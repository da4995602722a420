use serde::Deserialize;
use thiserror::Error;

use crate::{address::Address, ledger::Balance};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Mint,
    Transfer,
    Approve,
    #[serde(alias = "transfer_from")]
    TransferFrom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    From,
    To,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCommand {
    Mint {
        to: Address,
        amount: Balance,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: Balance,
    },
    Approve {
        owner: Address,
        spender: Address,
        amount: Balance,
    },
    TransferFrom {
        spender: Address,
        from: Address,
        to: Address,
        amount: Balance,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Amount is required for {kind:?}")]
    AmountRequired { kind: TransactionKind },
    #[error("Account `{field:?}` is required for {kind:?}")]
    AccountRequired {
        kind: TransactionKind,
        field: AccountField,
    },
}

/// Raw operation as submitted by `caller`, before validation.
#[derive(Debug, Clone, Copy)]
pub struct TransactionRecord {
    pub kind: TransactionKind,
    pub caller: Address,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: Option<Balance>,
}

impl LedgerCommand {
    /// Maps a record onto a command the way an ERC20 contract reads its
    /// arguments: the caller owns the balance for `transfer`, grants the
    /// allowance for `approve` (with `to` as the spender), and spends it for
    /// `transferfrom`.
    pub fn parse_command(record: &TransactionRecord) -> Result<Self, CommandError> {
        let kind = record.kind;
        let amount = record.amount.ok_or(CommandError::AmountRequired { kind })?;
        let required = |value: Option<Address>, field| {
            value.ok_or(CommandError::AccountRequired { kind, field })
        };
        match kind {
            TransactionKind::Mint => Ok(Self::Mint {
                to: required(record.to, AccountField::To)?,
                amount,
            }),
            TransactionKind::Transfer => Ok(Self::Transfer {
                from: record.caller,
                to: required(record.to, AccountField::To)?,
                amount,
            }),
            TransactionKind::Approve => Ok(Self::Approve {
                owner: record.caller,
                spender: required(record.to, AccountField::To)?,
                amount,
            }),
            TransactionKind::TransferFrom => Ok(Self::TransferFrom {
                spender: record.caller,
                from: required(record.from, AccountField::From)?,
                to: required(record.to, AccountField::To)?,
                amount,
            }),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Mint { .. } => TransactionKind::Mint,
            Self::Transfer { .. } => TransactionKind::Transfer,
            Self::Approve { .. } => TransactionKind::Approve,
            Self::TransferFrom { .. } => TransactionKind::TransferFrom,
        }
    }
}
