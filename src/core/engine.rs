//! Ledger engine
//!
//! This module provides the Ledger, the owned context object that ties the
//! transaction registry, the entry log and the settlement book together.
//! Each engine operation lives in its own module as an `impl Ledger` block:
//!
//! - authorization (here)
//! - settlement file processing (`settlement`)
//! - bank deposit reconciliation (`reconciliation`)
//! - payout batches (`payout`)
//! - balance derivation (`balance`)
//!
//! The engine is single-threaded and holds no internal synchronization. Each
//! operation runs to completion before returning, and a failing operation
//! leaves the ledger untouched. Concurrent callers must go through a single
//! writer such as [`LedgerWorker`](crate::core::worker::LedgerWorker).

use crate::core::entry_log::{EntryLog, Movement};
use crate::core::registry::TransactionRegistry;
use crate::core::settlement::SettlementBook;
use crate::core::traits::PayoutIssuer;
use crate::types::{
    Account, Amount, Authorization, LedgerEntry, LedgerError, MerchantId, Transaction,
};
use chrono::{NaiveDate, Utc};
use std::collections::BTreeSet;

/// Reference tag of authorization journals
pub const REF_AUTHORIZATION: &str = "authorization";
/// Reference tag of settlement journals
pub const REF_SETTLEMENT: &str = "settlement";
/// Reference tag of reconciliation journals
pub const REF_RECONCILIATION: &str = "bank_reconciliation";
/// Reference tag of payout journals
pub const REF_PAYOUT: &str = "payout";

/// Double-entry ledger for the authorization → payout pipeline
pub struct Ledger<P> {
    pub(crate) registry: TransactionRegistry,
    pub(crate) log: EntryLog,
    pub(crate) settlements: SettlementBook,
    pub(crate) issuer: P,
}

impl<P: PayoutIssuer> Ledger<P> {
    /// Create an empty ledger that pays merchants through `issuer`
    pub fn new(issuer: P) -> Self {
        Ledger {
            registry: TransactionRegistry::new(),
            log: EntryLog::new(),
            settlements: SettlementBook::new(),
            issuer,
        }
    }

    /// Record an approved card authorization
    ///
    /// Creates the transaction in status Pending, indexes it by processor
    /// reference id, and journals debit CardProcessor / credit Pending for
    /// the authorized amount.
    ///
    /// # Arguments
    ///
    /// * `authorization` - The approved authorization
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the transaction was recorded
    /// * `Err(LedgerError)` if it was rejected; nothing is changed
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The transaction id, merchant id or processor reference id is empty
    /// - The amount is not positive
    /// - The transaction id is already known
    /// - The processor reference id is already assigned to another transaction
    pub fn record_authorization(&mut self, authorization: Authorization) -> Result<(), LedgerError> {
        validate_authorization(&authorization)?;

        let txn = Transaction::authorized(authorization, Utc::now());
        let txn = self.registry.insert(txn)?;

        self.log.append_pair(
            Movement {
                transaction_id: &txn.transaction_id,
                merchant_id: &txn.merchant_id,
                debit: Account::CardProcessor,
                credit: Account::Pending,
                amount: txn.amount,
                reference: REF_AUTHORIZATION,
            },
            txn.created_at,
        );

        tracing::debug!(
            transaction_id = %txn.transaction_id,
            merchant_id = %txn.merchant_id,
            amount = txn.amount,
            "authorization recorded"
        );

        Ok(())
    }

    /// Look up a transaction by id
    pub fn transaction(&self, transaction_id: &str) -> Option<&Transaction> {
        self.registry.get(transaction_id)
    }

    /// Look up the transaction a processor reference id was assigned to
    pub fn transaction_by_processor_ref(&self, processor_ref_id: &str) -> Option<&Transaction> {
        self.registry.get_by_ref(processor_ref_id)
    }

    /// All transactions, ordered by transaction id
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.registry.iter()
    }

    /// Distinct merchant ids seen at authorization, sorted
    pub fn merchants(&self) -> Vec<MerchantId> {
        self.registry
            .iter()
            .map(|txn| txn.merchant_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The full entry log in append order
    pub fn entries(&self) -> &[LedgerEntry] {
        self.log.entries()
    }

    /// Entries journaled for one transaction, in append order
    pub fn entries_for_transaction<'a>(
        &'a self,
        transaction_id: &'a str,
    ) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
        self.log.entries_for_transaction(transaction_id)
    }

    /// Expected bank deposit recorded for a settlement date
    pub fn expected_settlement_total(&self, date: NaiveDate) -> Option<Amount> {
        self.settlements.expected_total(date)
    }

    /// Whether a settlement file id has already been processed
    pub fn is_settlement_file_processed(&self, file_id: &str) -> bool {
        self.settlements.is_processed(file_id)
    }

    /// Check the pairing invariant over the whole entry log
    ///
    /// # Errors
    ///
    /// Returns `JournalImbalance` for the first journal that is not exactly
    /// one debit and one credit of equal, positive amount.
    pub fn verify_journal(&self) -> Result<(), LedgerError> {
        self.log.verify()
    }

    /// The payout issuer this ledger was built with
    pub fn issuer(&self) -> &P {
        &self.issuer
    }
}

fn validate_authorization(authorization: &Authorization) -> Result<(), LedgerError> {
    if authorization.transaction_id.trim().is_empty() {
        return Err(LedgerError::missing_field("transaction_id"));
    }
    if authorization.merchant_id.trim().is_empty() {
        return Err(LedgerError::missing_field("merchant_id"));
    }
    if authorization.processor_ref_id.trim().is_empty() {
        return Err(LedgerError::missing_field("processor_ref_id"));
    }
    if authorization.amount <= 0 {
        return Err(LedgerError::validation("amount", "must be positive"));
    }
    Ok(())
}
