//! Error types for the ledger
//!
//! This module defines all error types that can occur while moving funds
//! through the ledger, plus the I/O errors of the CSV front end.
//!
//! # Error Categories
//!
//! - **Validation**: a required field is missing or invalid
//! - **Duplicate**: re-authorizing a known transaction or processor reference
//! - **Not found**: reconciling a date with no recorded settlement total
//! - **Mismatch**: a bank deposit that differs from the expected total
//! - **External**: payout issuer failures, carried per merchant in `PayoutResult`
//! - **File I/O and CSV**: errors from the acquisition layer
//!
//! Every engine error aborts its operation with zero state change.

use crate::types::account::Amount;
use crate::types::entry::JournalId;
use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A required field is missing or invalid
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// The transaction id has already been authorized
    #[error("Transaction {transaction_id} already exists")]
    DuplicateTransaction {
        /// Transaction id that is duplicated
        transaction_id: String,
    },

    /// The processor reference id is already indexed to another transaction
    #[error("Processor reference {processor_ref_id} is already assigned to transaction {existing_transaction_id}")]
    DuplicateProcessorReference {
        /// Processor reference id that is duplicated
        processor_ref_id: String,
        /// Transaction currently holding the reference
        existing_transaction_id: String,
    },

    /// No settlement total was recorded for the date
    #[error("No settlement found for date {date}")]
    SettlementNotFound {
        /// Settlement date that was reconciled
        date: NaiveDate,
    },

    /// The bank deposit differs from the expected settlement total
    #[error("Deposit mismatch for {date}: expected {expected}, got {actual}")]
    DepositMismatch {
        /// Settlement date that was reconciled
        date: NaiveDate,
        /// Total recorded from settlement
        expected: Amount,
        /// Amount actually deposited
        actual: Amount,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },

    /// A journal does not consist of one debit and one credit of equal amount
    #[error("Journal {journal_id} is unbalanced: {reason}")]
    JournalImbalance {
        /// Offending journal
        journal_id: JournalId,
        /// Description of the violation
        reason: String,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// Recoverable: the malformed record is skipped.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// The ledger worker has shut down and no longer accepts commands
    #[error("Ledger worker has stopped")]
    WorkerStopped,
}

/// Failure reported by the external payout issuer
///
/// Never returned from a batch call; carried per merchant in `PayoutResult`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Payout failed: {detail}")]
pub struct PayoutError {
    /// Issuer-supplied description
    pub detail: String,
}

impl PayoutError {
    pub fn new(detail: impl Into<String>) -> Self {
        PayoutError {
            detail: detail.into(),
        }
    }
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a Validation error
    pub fn validation(field: &str, reason: &str) -> Self {
        LedgerError::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a Validation error for an empty required field
    pub fn missing_field(field: &str) -> Self {
        Self::validation(field, "is required")
    }

    /// Create a DuplicateTransaction error
    pub fn duplicate_transaction(transaction_id: &str) -> Self {
        LedgerError::DuplicateTransaction {
            transaction_id: transaction_id.to_string(),
        }
    }

    /// Create a DuplicateProcessorReference error
    pub fn duplicate_processor_reference(
        processor_ref_id: &str,
        existing_transaction_id: &str,
    ) -> Self {
        LedgerError::DuplicateProcessorReference {
            processor_ref_id: processor_ref_id.to_string(),
            existing_transaction_id: existing_transaction_id.to_string(),
        }
    }

    /// Create a SettlementNotFound error
    pub fn settlement_not_found(date: NaiveDate) -> Self {
        LedgerError::SettlementNotFound { date }
    }

    /// Create a DepositMismatch error
    pub fn deposit_mismatch(date: NaiveDate, expected: Amount, actual: Amount) -> Self {
        LedgerError::DepositMismatch {
            date,
            expected,
            actual,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create a JournalImbalance error
    pub fn journal_imbalance(journal_id: JournalId, reason: &str) -> Self {
        LedgerError::JournalImbalance {
            journal_id,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[rstest]
    #[case::validation(
        LedgerError::Validation { field: "amount".to_string(), reason: "must be positive".to_string() },
        "Invalid amount: must be positive"
    )]
    #[case::duplicate_transaction(
        LedgerError::DuplicateTransaction { transaction_id: "txn-1".to_string() },
        "Transaction txn-1 already exists"
    )]
    #[case::duplicate_reference(
        LedgerError::DuplicateProcessorReference { processor_ref_id: "ref-1".to_string(), existing_transaction_id: "txn-1".to_string() },
        "Processor reference ref-1 is already assigned to transaction txn-1"
    )]
    #[case::settlement_not_found(
        LedgerError::SettlementNotFound { date: date() },
        "No settlement found for date 2026-02-10"
    )]
    #[case::deposit_mismatch(
        LedgerError::DepositMismatch { date: date(), expected: 1000, actual: 999 },
        "Deposit mismatch for 2026-02-10: expected 1000, got 999"
    )]
    #[case::parse_error_with_line(
        LedgerError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        LedgerError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    #[case::worker_stopped(LedgerError::WorkerStopped, "Ledger worker has stopped")]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::missing_field(
        LedgerError::missing_field("merchant_id"),
        LedgerError::Validation { field: "merchant_id".to_string(), reason: "is required".to_string() }
    )]
    #[case::duplicate_transaction(
        LedgerError::duplicate_transaction("txn-1"),
        LedgerError::DuplicateTransaction { transaction_id: "txn-1".to_string() }
    )]
    #[case::deposit_mismatch(
        LedgerError::deposit_mismatch(date(), 1000, 999),
        LedgerError::DepositMismatch { date: date(), expected: 1000, actual: 999 }
    )]
    fn test_helper_functions(#[case] result: LedgerError, #[case] expected: LedgerError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_payout_error_display() {
        assert_eq!(
            PayoutError::new("bank unavailable").to_string(),
            "Payout failed: bank unavailable"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
