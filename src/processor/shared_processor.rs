use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    address::Address,
    command::TransactionRecord,
    ledger::{Balance, Ledger, LedgerEvent},
};

use super::{MintPolicy, TransactionProcessError, TransactionProcessor, execute};

/// Cloneable handle to a ledger shared between threads.
///
/// A single lock guards the whole ledger: every record is validated and
/// applied under one write guard, so concurrent callers observe the same
/// result as some serial order of their records. Reads take the read guard
/// and never see a half-applied record.
#[derive(Debug, Clone, Default)]
pub struct SharedTransactionProcessor {
    ledger: Arc<RwLock<Ledger>>,
    policy: MintPolicy,
}

impl SharedTransactionProcessor {
    pub fn new(ledger: Ledger, policy: MintPolicy) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            policy,
        }
    }

    pub fn balance_of(&self, who: &Address) -> Balance {
        self.ledger.read().balance_of(who)
    }

    pub fn allowance_of(&self, owner: &Address, spender: &Address) -> Balance {
        self.ledger.read().allowance_of(owner, spender)
    }

    pub fn total_supply(&self) -> Balance {
        self.ledger.read().total_supply()
    }

    /// Consistent copy of the ledger at one point of the serial order.
    pub fn snapshot(&self) -> Ledger {
        self.ledger.read().clone()
    }
}

impl TransactionProcessor for SharedTransactionProcessor {
    fn process_transaction(
        &mut self,
        record: &TransactionRecord,
    ) -> Result<LedgerEvent, TransactionProcessError> {
        let mut ledger = self.ledger.write();
        execute(&mut ledger, &self.policy, record)
    }
}
