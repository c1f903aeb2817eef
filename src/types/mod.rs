//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Accounts, entry sides and derived balances
//! - `transaction`: Transaction lifecycle types and identifiers
//! - `entry`: Ledger entries (journal pair halves)
//! - `settlement`: Settlement files, their results, and bank deposits
//! - `payout`: Per-merchant payout outcomes
//! - `error`: Error types for the ledger

pub mod account;
pub mod entry;
pub mod error;
pub mod payout;
pub mod settlement;
pub mod transaction;

pub use account::{Account, Amount, Balance, EntryType, MerchantId};
pub use entry::{EntryId, JournalId, LedgerEntry};
pub use error::{LedgerError, PayoutError};
pub use payout::PayoutResult;
pub use settlement::{
    BankDeposit, FileId, RejectedRow, SettlementFile, SettlementFileResult, SettlementRow,
};
pub use transaction::{
    Authorization, ProcessorRefId, Transaction, TransactionId, TransactionStatus,
};
