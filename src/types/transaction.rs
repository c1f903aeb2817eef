//! Transaction-related types for the ledger
//!
//! This module defines the transaction lifecycle status, the authorization
//! request that creates a transaction, and the stored transaction itself.

use super::account::{Account, Amount, MerchantId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

/// Internal transaction identifier
pub type TransactionId = String;

/// Identifier assigned by the card processor, used to correlate settlement rows
pub type ProcessorRefId = String;

/// Where a transaction is in its lifecycle
///
/// Moves strictly forward along Pending → Settling → Available → Funded,
/// one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Authorized, not yet settled
    Pending,
    /// On a settlement file, awaiting bank reconciliation
    Settling,
    /// Reconciled, awaiting payout
    Available,
    /// Paid out to the merchant (terminal)
    Funded,
}

impl TransactionStatus {
    /// The next status in the lineage, `None` once funded
    pub fn next(self) -> Option<TransactionStatus> {
        match self {
            TransactionStatus::Pending => Some(TransactionStatus::Settling),
            TransactionStatus::Settling => Some(TransactionStatus::Available),
            TransactionStatus::Available => Some(TransactionStatus::Funded),
            TransactionStatus::Funded => None,
        }
    }

    /// The ledger account holding a transaction's funds in this status
    pub fn account(self) -> Account {
        match self {
            TransactionStatus::Pending => Account::Pending,
            TransactionStatus::Settling => Account::Settling,
            TransactionStatus::Available => Account::Available,
            TransactionStatus::Funded => Account::Funded,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.account(), f)
    }
}

/// An approved card authorization submitted by a merchant
///
/// This is the input to `Ledger::record_authorization`; the ledger assigns
/// status and creation time itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// Unique internal transaction id
    pub transaction_id: TransactionId,

    /// Merchant who submitted the transaction
    pub merchant_id: MerchantId,

    /// Processor-assigned correlation id, never reused
    pub processor_ref_id: ProcessorRefId,

    /// Authorized amount in minor units, must be positive
    pub amount: Amount,

    /// Masked card token (last 4 + token), informational only
    pub card_number: Option<String>,
}

impl Authorization {
    /// Create an authorization without card details
    pub fn new(
        transaction_id: impl Into<TransactionId>,
        merchant_id: impl Into<MerchantId>,
        processor_ref_id: impl Into<ProcessorRefId>,
        amount: Amount,
    ) -> Self {
        Authorization {
            transaction_id: transaction_id.into(),
            merchant_id: merchant_id.into(),
            processor_ref_id: processor_ref_id.into(),
            amount,
            card_number: None,
        }
    }

    /// Attach a masked card token
    pub fn with_card_number(mut self, card_number: impl Into<String>) -> Self {
        self.card_number = Some(card_number.into());
        self
    }
}

/// A card payment tracked by the ledger
///
/// Owned by the transaction registry and mutated only by the four engine
/// operations. Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Unique internal transaction id
    pub transaction_id: TransactionId,

    /// Merchant who submitted the transaction
    pub merchant_id: MerchantId,

    /// Processor-assigned correlation id
    pub processor_ref_id: ProcessorRefId,

    /// Authorized amount in minor units
    pub amount: Amount,

    /// Masked card token, if supplied at authorization
    pub card_number: Option<String>,

    /// Current lifecycle status
    pub status: TransactionStatus,

    /// When the authorization was recorded
    pub created_at: DateTime<Utc>,

    /// Date of the settlement file that matched this transaction
    ///
    /// Set exactly once, on the Pending → Settling transition.
    pub settlement_date: Option<NaiveDate>,
}

impl Transaction {
    /// Build a freshly authorized (Pending) transaction
    pub fn authorized(authorization: Authorization, created_at: DateTime<Utc>) -> Self {
        Transaction {
            transaction_id: authorization.transaction_id,
            merchant_id: authorization.merchant_id,
            processor_ref_id: authorization.processor_ref_id,
            amount: authorization.amount,
            card_number: authorization.card_number,
            status: TransactionStatus::Pending,
            created_at,
            settlement_date: None,
        }
    }

    /// Step forward to the status after `from`
    ///
    /// Returns false and leaves the transaction untouched unless it is
    /// currently in `from`.
    pub(crate) fn advance_from(&mut self, from: TransactionStatus) -> bool {
        match from.next() {
            Some(next) if self.status == from => {
                self.status = next;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::pending(TransactionStatus::Pending, Some(TransactionStatus::Settling))]
    #[case::settling(TransactionStatus::Settling, Some(TransactionStatus::Available))]
    #[case::available(TransactionStatus::Available, Some(TransactionStatus::Funded))]
    #[case::funded(TransactionStatus::Funded, None)]
    fn test_status_lineage(
        #[case] status: TransactionStatus,
        #[case] expected: Option<TransactionStatus>,
    ) {
        assert_eq!(status.next(), expected);
        if let Some(next) = expected {
            assert!(next > status);
        }
    }

    #[test]
    fn test_authorized_transaction_starts_pending() {
        let auth = Authorization::new("txn-1", "m1", "ref-1", 500).with_card_number("4242");
        let txn = Transaction::authorized(auth, Utc::now());

        assert_eq!(txn.status, TransactionStatus::Pending);
        assert_eq!(txn.card_number.as_deref(), Some("4242"));
        assert!(txn.settlement_date.is_none());
    }

    #[test]
    fn test_advance_moves_one_step_only() {
        let mut txn = Transaction::authorized(Authorization::new("txn-1", "m1", "ref-1", 500), Utc::now());

        assert!(!txn.advance_from(TransactionStatus::Settling));
        assert_eq!(txn.status, TransactionStatus::Pending);

        assert!(txn.advance_from(TransactionStatus::Pending));
        assert_eq!(txn.status, TransactionStatus::Settling);
        assert!(!txn.advance_from(TransactionStatus::Pending));

        assert!(txn.advance_from(TransactionStatus::Settling));
        assert!(txn.advance_from(TransactionStatus::Available));
        assert_eq!(txn.status, TransactionStatus::Funded);
        assert!(!txn.advance_from(TransactionStatus::Funded));
    }
}
