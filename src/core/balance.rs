//! Balance calculator
//!
//! Derives balances by replaying the entry log. For each tracked account the
//! balance is credits minus debits. Nothing is cached, so a balance always
//! reflects the latest appended entry.
//!
//! Sums are taken in `i128` and narrowed at the end, so only a final balance
//! that does not fit an `Amount` is reported as `ArithmeticOverflow`.

use crate::core::engine::Ledger;
use crate::core::traits::PayoutIssuer;
use crate::types::{Account, Amount, Balance, LedgerEntry, LedgerError};

/// Read-only view over an entry log that computes balances
#[derive(Debug, Clone, Copy)]
pub struct BalanceCalculator<'a> {
    entries: &'a [LedgerEntry],
}

impl<'a> BalanceCalculator<'a> {
    pub fn new(entries: &'a [LedgerEntry]) -> Self {
        BalanceCalculator { entries }
    }

    /// Balance of one merchant's entries
    pub fn merchant(&self, merchant_id: &str) -> Result<Balance, LedgerError> {
        accumulate(
            Balance::for_merchant(merchant_id),
            self.entries.iter().filter(|e| e.merchant_id == merchant_id),
        )
    }

    /// Balance over every entry in the log
    pub fn system(&self) -> Result<Balance, LedgerError> {
        accumulate(Balance::system(), self.entries.iter())
    }
}

fn accumulate<'a>(
    mut balance: Balance,
    entries: impl Iterator<Item = &'a LedgerEntry>,
) -> Result<Balance, LedgerError> {
    let mut sums = [0i128; Account::TRACKED.len()];
    for entry in entries {
        // External accounts are not tracked
        if let Some(index) = Account::TRACKED.iter().position(|a| *a == entry.account) {
            sums[index] += i128::from(entry.signed_amount());
        }
    }

    for (account, sum) in Account::TRACKED.into_iter().zip(sums) {
        if let Some(slot) = balance.slot_mut(account) {
            *slot = Amount::try_from(sum)
                .map_err(|_| LedgerError::arithmetic_overflow(&format!("{} balance", account)))?;
        }
    }
    Ok(balance)
}

impl<P: PayoutIssuer> Ledger<P> {
    /// Current balance of a merchant, derived from the entry log
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if an account balance does not fit an `Amount`
    pub fn merchant_balance(&self, merchant_id: &str) -> Result<Balance, LedgerError> {
        BalanceCalculator::new(self.log.entries()).merchant(merchant_id)
    }

    /// Current system-wide balance, derived from the entry log
    pub fn system_balance(&self) -> Result<Balance, LedgerError> {
        BalanceCalculator::new(self.log.entries()).system()
    }

    /// Balances of every merchant seen at authorization, sorted by merchant id
    pub fn merchant_balances(&self) -> Result<Vec<Balance>, LedgerError> {
        let calculator = BalanceCalculator::new(self.log.entries());
        self.merchants()
            .iter()
            .map(|merchant_id| calculator.merchant(merchant_id))
            .collect()
    }
}
