use crate::{command::TransactionRecord, ledger::Ledger, ledger::LedgerEvent};

use super::{MintPolicy, TransactionProcessError, TransactionProcessor, execute};

#[derive(Debug, Default)]
pub struct InMemoryTransactionProcessor {
    pub ledger: Ledger,
    policy: MintPolicy,
}

impl InMemoryTransactionProcessor {
    pub fn with_policy(policy: MintPolicy) -> Self {
        Self {
            ledger: Ledger::default(),
            policy,
        }
    }
}

impl TransactionProcessor for InMemoryTransactionProcessor {
    fn process_transaction(
        &mut self,
        record: &TransactionRecord,
    ) -> Result<LedgerEvent, TransactionProcessError> {
        execute(&mut self.ledger, &self.policy, record)
    }
}
