use std::collections::HashMap;

use thiserror::Error;

use crate::address::Address;

/// Amount in base units.
pub type Balance = u128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEventKind {
    Minted {
        to: Address,
    },
    Transferred {
        from: Address,
        to: Address,
    },
    Approved {
        owner: Address,
        spender: Address,
    },
    TransferredFrom {
        spender: Address,
        from: Address,
        to: Address,
        remaining_allowance: Balance,
    },
}

/// Validated state change. Produced by the `handle_*` methods and consumed by
/// [`Ledger::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEvent {
    pub amount: Balance,
    pub kind: LedgerEventKind,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ERC20: insufficient-balance")]
    InsufficientBalance,
    #[error("ERC20: insufficient-allowance")]
    InsufficientAllowance,
    #[error("ERC20: overflow")]
    Overflow,
}

#[derive(Debug, Default, Clone)]
pub struct Ledger {
    balances: HashMap<Address, Balance>,
    allowances: HashMap<(Address, Address), Balance>,
    total_supply: Balance,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> Balance {
        self.total_supply
    }

    pub fn balance_of(&self, who: &Address) -> Balance {
        self.balances.get(who).copied().unwrap_or_default()
    }

    pub fn allowance_of(&self, owner: &Address, spender: &Address) -> Balance {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Every account that ever held a balance, including ones drained to zero.
    pub fn accounts(&self) -> impl Iterator<Item = (Address, Balance)> + '_ {
        self.balances.iter().map(|(addr, balance)| (*addr, *balance))
    }

    pub fn mint(&mut self, to: Address, amount: Balance) -> Result<LedgerEvent, LedgerError> {
        let event = self.handle_mint(to, amount)?;
        self.apply(&event)?;
        Ok(event)
    }

    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Balance,
    ) -> Result<LedgerEvent, LedgerError> {
        let event = self.handle_transfer(from, to, amount)?;
        self.apply(&event)?;
        Ok(event)
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: Balance) -> LedgerEvent {
        let event = self.handle_approve(owner, spender, amount);
        self.allowances.insert((owner, spender), amount);
        event
    }

    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Balance,
    ) -> Result<LedgerEvent, LedgerError> {
        let event = self.handle_transfer_from(spender, from, to, amount)?;
        self.apply(&event)?;
        Ok(event)
    }

    pub fn handle_mint(&self, to: Address, amount: Balance) -> Result<LedgerEvent, LedgerError> {
        self.total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balance_of(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(LedgerEvent {
            amount,
            kind: LedgerEventKind::Minted { to },
        })
    }

    pub fn handle_transfer(
        &self,
        from: Address,
        to: Address,
        amount: Balance,
    ) -> Result<LedgerEvent, LedgerError> {
        if self.balance_of(&from) < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        Ok(LedgerEvent {
            amount,
            kind: LedgerEventKind::Transferred { from, to },
        })
    }

    pub fn handle_approve(&self, owner: Address, spender: Address, amount: Balance) -> LedgerEvent {
        LedgerEvent {
            amount,
            kind: LedgerEventKind::Approved { owner, spender },
        }
    }

    /// Allowance is checked before balance, so a request that is both
    /// under-approved and under-funded reports `InsufficientAllowance`.
    pub fn handle_transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Balance,
    ) -> Result<LedgerEvent, LedgerError> {
        let allowance = self.allowance_of(&from, &spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance);
        }
        if self.balance_of(&from) < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        Ok(LedgerEvent {
            amount,
            kind: LedgerEventKind::TransferredFrom {
                spender,
                from,
                to,
                remaining_allowance: allowance - amount,
            },
        })
    }

    /// Applies an event produced by one of the `handle_*` methods.
    ///
    /// The event may have been validated against an older state, so the
    /// amounts are re-checked against the current one. On error nothing is
    /// mutated. A `TransferredFrom` debits the current allowance; the
    /// `remaining_allowance` it carries is informational.
    pub fn apply(&mut self, event: &LedgerEvent) -> Result<(), LedgerError> {
        let amount = event.amount;
        match event.kind {
            LedgerEventKind::Minted { to } => {
                let supply = self
                    .total_supply
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow)?;
                let balance = self
                    .balance_of(&to)
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow)?;
                self.balances.insert(to, balance);
                self.total_supply = supply;
            }
            LedgerEventKind::Transferred { from, to } => {
                self.move_balance(from, to, amount)?;
            }
            LedgerEventKind::Approved { owner, spender } => {
                self.allowances.insert((owner, spender), amount);
            }
            LedgerEventKind::TransferredFrom {
                spender,
                from,
                to,
                ..
            } => {
                let remaining = self
                    .allowance_of(&from, &spender)
                    .checked_sub(amount)
                    .ok_or(LedgerError::InsufficientAllowance)?;
                self.move_balance(from, to, amount)?;
                self.allowances.insert((from, spender), remaining);
            }
        }
        Ok(())
    }

    fn move_balance(
        &mut self,
        from: Address,
        to: Address,
        amount: Balance,
    ) -> Result<(), LedgerError> {
        let debited = self
            .balance_of(&from)
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance)?;
        if from == to {
            self.balances.entry(from).or_default();
            return Ok(());
        }
        let credited = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETHER: Balance = 1_000_000_000_000_000_000;

    fn signer(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address::new(bytes)
    }

    fn sum_of_balances(ledger: &Ledger) -> Balance {
        ledger.accounts().map(|(_, balance)| balance).sum()
    }

    #[test]
    fn empty_ledger_reads_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.total_supply(), 0);
        assert_eq!(ledger.balance_of(&signer(0)), 0);
        assert_eq!(ledger.allowance_of(&signer(0), &signer(1)), 0);
        assert_eq!(ledger.accounts().count(), 0);
    }

    #[test]
    fn erc20_scenarios() {
        let (s0, s1) = (signer(0), signer(1));
        let mut ledger = Ledger::new();

        ledger.mint(s0, 100 * ETHER).unwrap();
        assert_eq!(ledger.balance_of(&s0), 100 * ETHER);

        ledger.transfer(s0, s1, 5 * ETHER).unwrap();
        assert_eq!(ledger.balance_of(&s0), 95 * ETHER);
        assert_eq!(ledger.balance_of(&s1), 5 * ETHER);

        let err = ledger.transfer(s0, s1, 500 * ETHER).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientBalance);
        assert_eq!(err.to_string(), "ERC20: insufficient-balance");
        assert_eq!(ledger.balance_of(&s0), 95 * ETHER);
        assert_eq!(ledger.balance_of(&s1), 5 * ETHER);

        let err = ledger.transfer_from(s0, s1, s0, 5 * ETHER).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientAllowance);
        assert_eq!(err.to_string(), "ERC20: insufficient-allowance");

        ledger.approve(s1, s0, 4 * ETHER);
        ledger.transfer_from(s0, s1, s0, 2 * ETHER).unwrap();
        assert_eq!(ledger.balance_of(&s0), 97 * ETHER);
        assert_eq!(ledger.balance_of(&s1), 3 * ETHER);
        assert_eq!(ledger.allowance_of(&s1, &s0), 2 * ETHER);

        // had 3 tokens and 2 allowance left, asking for 3 fails on allowance
        let err = ledger.transfer_from(s0, s1, s0, 3 * ETHER).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientAllowance);
        assert_eq!(ledger.balance_of(&s0), 97 * ETHER);
        assert_eq!(ledger.balance_of(&s1), 3 * ETHER);
        assert_eq!(ledger.allowance_of(&s1, &s0), 2 * ETHER);

        assert_eq!(ledger.total_supply(), 100 * ETHER);
        assert_eq!(sum_of_balances(&ledger), ledger.total_supply());
    }

    #[test]
    fn transfer_from_checks_balance_after_allowance() {
        let (owner, spender, to) = (signer(1), signer(2), signer(3));
        let mut ledger = Ledger::new();
        ledger.mint(owner, 1).unwrap();
        ledger.approve(owner, spender, 10);

        let err = ledger.transfer_from(spender, owner, to, 5).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientBalance);
        assert_eq!(ledger.allowance_of(&owner, &spender), 10);
        assert_eq!(ledger.balance_of(&owner), 1);
        assert_eq!(ledger.balance_of(&to), 0);
    }

    #[test]
    fn repeated_draws_reduce_allowance() {
        let (owner, spender, to) = (signer(1), signer(2), signer(3));
        let mut ledger = Ledger::new();
        ledger.mint(owner, 100).unwrap();
        ledger.approve(owner, spender, 10);

        for remaining in [7, 4, 1] {
            let evt = ledger.transfer_from(spender, owner, to, 3).unwrap();
            assert_eq!(
                evt.kind,
                LedgerEventKind::TransferredFrom {
                    spender,
                    from: owner,
                    to,
                    remaining_allowance: remaining
                }
            );
            assert_eq!(ledger.allowance_of(&owner, &spender), remaining);
        }
        assert_eq!(
            ledger.transfer_from(spender, owner, to, 3),
            Err(LedgerError::InsufficientAllowance)
        );
        ledger.transfer_from(spender, owner, to, 1).unwrap();
        assert_eq!(ledger.allowance_of(&owner, &spender), 0);
        assert_eq!(ledger.balance_of(&to), 10);
        assert_eq!(ledger.balance_of(&owner), 90);
    }

    #[test]
    fn approve_overwrites() {
        let (owner, spender) = (signer(1), signer(2));
        let mut ledger = Ledger::new();
        ledger.approve(owner, spender, 50);
        ledger.approve(owner, spender, 50);
        assert_eq!(ledger.allowance_of(&owner, &spender), 50);
        ledger.approve(owner, spender, 20);
        assert_eq!(ledger.allowance_of(&owner, &spender), 20);
        // allowances are directional
        assert_eq!(ledger.allowance_of(&spender, &owner), 0);
    }

    #[test]
    fn self_transfer_is_noop() {
        let a = signer(1);
        let mut ledger = Ledger::new();
        ledger.mint(a, 10).unwrap();
        ledger.transfer(a, a, 10).unwrap();
        assert_eq!(ledger.balance_of(&a), 10);
        assert_eq!(
            ledger.transfer(a, a, 11),
            Err(LedgerError::InsufficientBalance)
        );
        assert_eq!(ledger.balance_of(&a), 10);
    }

    #[test]
    fn zero_amounts_are_valid() {
        let (a, b) = (signer(1), signer(2));
        let mut ledger = Ledger::new();
        ledger.transfer(a, b, 0).unwrap();
        ledger.transfer_from(b, a, b, 0).unwrap();
        assert_eq!(ledger.balance_of(&a), 0);
        assert_eq!(ledger.balance_of(&b), 0);
    }

    #[test]
    fn mint_overflow_is_rejected() {
        let (a, b) = (signer(1), signer(2));
        let mut ledger = Ledger::new();
        ledger.mint(a, Balance::MAX).unwrap();
        assert_eq!(ledger.mint(b, 1), Err(LedgerError::Overflow));
        assert_eq!(ledger.balance_of(&b), 0);
        assert_eq!(ledger.total_supply(), Balance::MAX);
        assert_eq!(LedgerError::Overflow.to_string(), "ERC20: overflow");
    }

    #[test]
    fn handle_does_not_mutate() {
        let (a, b) = (signer(1), signer(2));
        let mut ledger = Ledger::new();
        let evt = ledger.handle_mint(a, 10).unwrap();
        assert_eq!(ledger.balance_of(&a), 0);
        ledger.apply(&evt).unwrap();
        assert_eq!(ledger.balance_of(&a), 10);

        let evt = ledger.handle_transfer(a, b, 4).unwrap();
        assert_eq!(evt.kind, LedgerEventKind::Transferred { from: a, to: b });
        assert_eq!(ledger.balance_of(&b), 0);
        ledger.apply(&evt).unwrap();
        assert_eq!(ledger.balance_of(&a), 6);
        assert_eq!(ledger.balance_of(&b), 4);
    }

    #[test]
    fn stale_events_are_rechecked_on_apply() {
        let (a, b, spender) = (signer(1), signer(2), signer(3));
        let mut ledger = Ledger::new();
        ledger.mint(a, 10).unwrap();

        // both validated against the same state, only one can be applied
        let first = ledger.handle_transfer(a, b, 10).unwrap();
        let second = ledger.handle_transfer(a, b, 10).unwrap();
        ledger.apply(&first).unwrap();
        assert_eq!(ledger.apply(&second), Err(LedgerError::InsufficientBalance));
        assert_eq!(ledger.balance_of(&a), 0);
        assert_eq!(ledger.balance_of(&b), 10);
        assert_eq!(ledger.total_supply(), 10);
        assert_eq!(sum_of_balances(&ledger), ledger.total_supply());

        ledger.approve(b, spender, 6);
        let first = ledger.handle_transfer_from(spender, b, a, 6).unwrap();
        let second = ledger.handle_transfer_from(spender, b, a, 6).unwrap();
        ledger.apply(&first).unwrap();
        assert_eq!(
            ledger.apply(&second),
            Err(LedgerError::InsufficientAllowance)
        );
        assert_eq!(ledger.allowance_of(&b, &spender), 0);
        assert_eq!(ledger.balance_of(&a), 6);
        assert_eq!(ledger.balance_of(&b), 4);

        let first = ledger.handle_mint(a, Balance::MAX - 10).unwrap();
        let second = ledger.handle_mint(b, 1).unwrap();
        ledger.apply(&first).unwrap();
        assert_eq!(ledger.apply(&second), Err(LedgerError::Overflow));
        assert_eq!(ledger.balance_of(&b), 4);
        assert_eq!(ledger.total_supply(), Balance::MAX);
        assert_eq!(sum_of_balances(&ledger), ledger.total_supply());
    }

    #[test]
    fn drained_account_stays_listed() {
        let (a, b) = (signer(1), signer(2));
        let mut ledger = Ledger::new();
        ledger.mint(a, 5).unwrap();
        ledger.transfer(a, b, 5).unwrap();
        let mut accounts: Vec<_> = ledger.accounts().collect();
        accounts.sort();
        assert_eq!(accounts, vec![(a, 0), (b, 5)]);
    }
}
