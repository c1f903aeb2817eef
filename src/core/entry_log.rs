//! Append-only journal of paired ledger entries
//!
//! The EntryLog is the single source of truth for balances. Every fund
//! movement appends exactly two entries, a debit and then a credit, that share
//! a journal id and an amount. Entries are never updated or removed.

use crate::types::{
    Account, Amount, EntryId, EntryType, JournalId, LedgerEntry, LedgerError,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One fund movement between two accounts, before it is journaled
#[derive(Debug, Clone, Copy)]
pub struct Movement<'a> {
    pub transaction_id: &'a str,
    pub merchant_id: &'a str,
    pub debit: Account,
    pub credit: Account,
    pub amount: Amount,
    pub reference: &'a str,
}

/// Append-only entry log
#[derive(Debug, Default)]
pub struct EntryLog {
    entries: Vec<LedgerEntry>,
    last_journal_id: JournalId,
}

impl EntryLog {
    /// Create an empty entry log
    pub fn new() -> Self {
        EntryLog::default()
    }

    /// Journal a movement as a debit/credit pair
    ///
    /// The debit entry is appended first. Entry ids are `2j - 1` and `2j` for
    /// journal `j`, so they stay monotonic and unique.
    ///
    /// # Returns
    ///
    /// The journal id shared by the two new entries
    pub fn append_pair(&mut self, movement: Movement<'_>, timestamp: DateTime<Utc>) -> JournalId {
        self.last_journal_id += 1;
        let journal_id = self.last_journal_id;

        let debit_id: EntryId = journal_id * 2 - 1;
        self.entries.push(LedgerEntry {
            entry_id: debit_id,
            journal_id,
            transaction_id: movement.transaction_id.to_string(),
            merchant_id: movement.merchant_id.to_string(),
            account: movement.debit,
            entry_type: EntryType::Debit,
            amount: movement.amount,
            timestamp,
            reference: movement.reference.to_string(),
        });
        self.entries.push(LedgerEntry {
            entry_id: debit_id + 1,
            journal_id,
            transaction_id: movement.transaction_id.to_string(),
            merchant_id: movement.merchant_id.to_string(),
            account: movement.credit,
            entry_type: EntryType::Credit,
            amount: movement.amount,
            timestamp,
            reference: movement.reference.to_string(),
        });

        journal_id
    }

    /// All entries in append order
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Entries recorded for one transaction, in append order
    pub fn entries_for_transaction<'a>(
        &'a self,
        transaction_id: &'a str,
    ) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.transaction_id == transaction_id)
    }

    /// Number of entries (always even)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been journaled yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every journal is exactly one debit and one credit of equal,
    /// positive amount
    ///
    /// # Errors
    ///
    /// Returns `JournalImbalance` for the lowest offending journal id.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let mut journals: BTreeMap<JournalId, Vec<&LedgerEntry>> = BTreeMap::new();
        for entry in &self.entries {
            journals.entry(entry.journal_id).or_default().push(entry);
        }

        for (journal_id, entries) in journals {
            let debits: Vec<_> = entries
                .iter()
                .filter(|e| e.entry_type == EntryType::Debit)
                .collect();
            let credits: Vec<_> = entries
                .iter()
                .filter(|e| e.entry_type == EntryType::Credit)
                .collect();

            match (debits.as_slice(), credits.as_slice()) {
                ([debit], [credit]) => {
                    if debit.amount != credit.amount {
                        return Err(LedgerError::journal_imbalance(
                            journal_id,
                            &format!(
                                "debit {} does not equal credit {}",
                                debit.amount, credit.amount
                            ),
                        ));
                    }
                    if debit.amount <= 0 {
                        return Err(LedgerError::journal_imbalance(
                            journal_id,
                            "amount must be positive",
                        ));
                    }
                }
                _ => {
                    return Err(LedgerError::journal_imbalance(
                        journal_id,
                        &format!(
                            "expected one debit and one credit, found {} and {}",
                            debits.len(),
                            credits.len()
                        ),
                    ))
                }
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn push_raw(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }
}
