//! Reconciliation engine
//!
//! Validates a bank deposit against the total expected from settlement for
//! its date and, on a match, moves every transaction settling on that date
//! to Available. A mismatch changes nothing.

use crate::core::engine::{Ledger, REF_RECONCILIATION};
use crate::core::entry_log::Movement;
use crate::core::traits::PayoutIssuer;
use crate::types::{Account, BankDeposit, LedgerError, TransactionStatus};
use chrono::Utc;

impl<P: PayoutIssuer> Ledger<P> {
    /// Reconcile a bank deposit with the expected settlement total
    ///
    /// Candidates are transactions in Settling whose settlement date equals
    /// the deposit's date, visited in transaction-id order. Each produces a
    /// debit Settling / credit Available journal for its authorized amount.
    ///
    /// Reconciling an already-reconciled date with the same amount succeeds
    /// again and moves nothing, since no Settling transactions remain.
    ///
    /// # Arguments
    ///
    /// * `deposit` - The deposit received from the bank
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of transactions moved to Available
    /// * `Err(LedgerError)` if the deposit was rejected; nothing is changed
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No settlement total was recorded for the date
    /// - The deposit amount differs from the recorded total
    pub fn reconcile_bank_deposit(&mut self, deposit: BankDeposit) -> Result<usize, LedgerError> {
        let date = deposit.settlement_date;
        let expected = self
            .settlements
            .expected_total(date)
            .ok_or_else(|| LedgerError::settlement_not_found(date))?;

        if deposit.amount != expected {
            tracing::warn!(
                date = %date,
                expected,
                actual = deposit.amount,
                "bank deposit does not match settlement total"
            );
            return Err(LedgerError::deposit_mismatch(date, expected, deposit.amount));
        }

        let now = Utc::now();
        let mut moved = 0;

        for transaction_id in self.registry.ids_with_status(TransactionStatus::Settling) {
            let Some(txn) = self.registry.get_mut(&transaction_id) else {
                continue;
            };
            if txn.settlement_date != Some(date) || !txn.advance_from(TransactionStatus::Settling) {
                continue;
            }

            self.log.append_pair(
                Movement {
                    transaction_id: &txn.transaction_id,
                    merchant_id: &txn.merchant_id,
                    debit: Account::Settling,
                    credit: Account::Available,
                    amount: txn.amount,
                    reference: REF_RECONCILIATION,
                },
                now,
            );
            moved += 1;
        }

        tracing::info!(date = %date, amount = deposit.amount, moved, "bank deposit reconciled");

        Ok(moved)
    }
}
