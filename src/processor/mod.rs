use thiserror::Error;

use crate::{
    address::Address,
    command::{CommandError, LedgerCommand, TransactionRecord},
    ledger::{Ledger, LedgerError, LedgerEvent},
};

pub mod in_memory_processor;
pub mod shared_processor;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionProcessError {
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    LedgerErr(#[from] LedgerError),
    #[error("{caller} is not allowed to mint")]
    Unauthorized { caller: Address },
}

/// Who may call `mint`. The ledger itself has no notion of roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MintPolicy {
    #[default]
    Open,
    Minter(Address),
}

impl MintPolicy {
    pub fn authorize(&self, caller: &Address) -> Result<(), TransactionProcessError> {
        match self {
            MintPolicy::Open => Ok(()),
            MintPolicy::Minter(minter) if minter == caller => Ok(()),
            MintPolicy::Minter(_) => Err(TransactionProcessError::Unauthorized { caller: *caller }),
        }
    }
}

pub trait TransactionProcessor {
    fn process_transaction(
        &mut self,
        record: &TransactionRecord,
    ) -> Result<LedgerEvent, TransactionProcessError>;
}

/// Parses, authorizes and executes one record against `ledger`.
/// Either the whole record is applied or nothing is.
fn execute(
    ledger: &mut Ledger,
    policy: &MintPolicy,
    record: &TransactionRecord,
) -> Result<LedgerEvent, TransactionProcessError> {
    let cmd = LedgerCommand::parse_command(record)?;
    let evt = match cmd {
        LedgerCommand::Mint { to, amount } => {
            if let Err(err) = policy.authorize(&record.caller) {
                tracing::warn!(caller = %record.caller, "rejected mint");
                return Err(err);
            }
            ledger.handle_mint(to, amount)?
        }
        LedgerCommand::Transfer { from, to, amount } => ledger.handle_transfer(from, to, amount)?,
        LedgerCommand::Approve {
            owner,
            spender,
            amount,
        } => ledger.handle_approve(owner, spender, amount),
        LedgerCommand::TransferFrom {
            spender,
            from,
            to,
            amount,
        } => ledger.handle_transfer_from(spender, from, to, amount)?,
    };
    ledger.apply(&evt)?;
    tracing::debug!(kind = ?cmd.kind(), amount = %evt.amount, "applied {:?}", evt.kind);
    Ok(evt)
}
