//! Ledger entry types
//!
//! A LedgerEntry is one half of a journal pair. Entries are immutable once
//! appended to the entry log.

use super::account::{Account, Amount, EntryType, MerchantId};
use super::transaction::TransactionId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Monotonic, unique entry identifier
pub type EntryId = u64;

/// Identifier shared by the debit and credit halves of one fund movement
pub type JournalId = u64;

/// One row of a journal pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub journal_id: JournalId,
    pub transaction_id: TransactionId,
    pub merchant_id: MerchantId,
    pub account: Account,
    pub entry_type: EntryType,
    /// Always positive
    pub amount: Amount,
    pub timestamp: DateTime<Utc>,
    /// Human-readable tag ("authorization", "settlement", ...)
    pub reference: String,
}

impl LedgerEntry {
    /// Signed effect of this entry on its account's balance
    ///
    /// Credits add, debits subtract.
    pub fn signed_amount(&self) -> Amount {
        match self.entry_type {
            EntryType::Credit => self.amount,
            EntryType::Debit => -self.amount,
        }
    }
}
