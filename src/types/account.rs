//! Account-related types for the ledger
//!
//! This module defines the accounts that fund movements flow between, the
//! debit/credit tag of a ledger entry, and the derived Balance value object.

use super::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount in minor currency units (e.g. cents)
pub type Amount = i64;

/// Merchant identifier
pub type MerchantId = String;

/// Ledger account a journal entry is posted to
///
/// Funds enter the system from `CardProcessor` and leave it to `MerchantBank`.
/// Only the four internal accounts in between are ever summed into balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Account {
    /// External: funds held at the card processor
    CardProcessor,

    /// Authorized, not yet on a settlement file
    Pending,

    /// On a settlement file, not yet matched to a bank deposit
    Settling,

    /// Reconciled against a bank deposit, ready for payout
    Available,

    /// Paid out to the merchant
    Funded,

    /// External: funds in the merchant's own bank account
    MerchantBank,
}

impl Account {
    /// The accounts that carry a balance inside the system
    pub const TRACKED: [Account; 4] = [
        Account::Pending,
        Account::Settling,
        Account::Available,
        Account::Funded,
    ];

    /// Whether this account is summed into balances
    pub fn is_tracked(self) -> bool {
        !matches!(self, Account::CardProcessor | Account::MerchantBank)
    }

    /// Stable tag used in logs and CSV output
    pub fn as_str(self) -> &'static str {
        match self {
            Account::CardProcessor => "card_processor",
            Account::Pending => "pending",
            Account::Settling => "settling",
            Account::Available => "available",
            Account::Funded => "funded",
            Account::MerchantBank => "merchant_bank",
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a journal pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Money leaving the account
    Debit,
    /// Money entering the account
    Credit,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::Debit => f.write_str("debit"),
            EntryType::Credit => f.write_str("credit"),
        }
    }
}

/// Per-account sums derived from the entry log
///
/// Either merchant-scoped (`merchant_id` is `Some`) or system-wide (`None`).
/// Always recomputed on demand and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Balance {
    /// Merchant the balance is scoped to, `None` for the whole system
    pub merchant_id: Option<MerchantId>,

    /// Authorized, awaiting settlement
    pub pending: Amount,

    /// Settled, awaiting bank reconciliation
    pub settling: Amount,

    /// Reconciled, awaiting payout
    pub available: Amount,

    /// Paid out
    pub funded: Amount,
}

impl Balance {
    /// Create a zero balance for a merchant
    pub fn for_merchant(merchant_id: impl Into<MerchantId>) -> Self {
        Balance {
            merchant_id: Some(merchant_id.into()),
            ..Balance::default()
        }
    }

    /// Create a zero system-wide balance
    pub fn system() -> Self {
        Balance::default()
    }

    /// Get the balance of a tracked account, `None` for external accounts
    pub fn get(&self, account: Account) -> Option<Amount> {
        match account {
            Account::Pending => Some(self.pending),
            Account::Settling => Some(self.settling),
            Account::Available => Some(self.available),
            Account::Funded => Some(self.funded),
            Account::CardProcessor | Account::MerchantBank => None,
        }
    }

    /// Get a mutable slot for a tracked account, `None` for external accounts
    pub(crate) fn slot_mut(&mut self, account: Account) -> Option<&mut Amount> {
        match account {
            Account::Pending => Some(&mut self.pending),
            Account::Settling => Some(&mut self.settling),
            Account::Available => Some(&mut self.available),
            Account::Funded => Some(&mut self.funded),
            Account::CardProcessor | Account::MerchantBank => None,
        }
    }

    /// Money authorized but not yet paid out
    ///
    /// Pending + Settling + Available. Fails with `ArithmeticOverflow` when
    /// the sum does not fit an `Amount`.
    pub fn outstanding(&self) -> Result<Amount, LedgerError> {
        self.pending
            .checked_add(self.settling)
            .and_then(|sum| sum.checked_add(self.available))
            .ok_or_else(|| LedgerError::arithmetic_overflow("outstanding balance"))
    }
}
