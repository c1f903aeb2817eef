//! Payment Facilitator Ledger Library
//! # Overview
//!
//! A double-entry ledger that tracks card payments from authorization to
//! merchant payout. Every movement of funds is recorded as a balanced pair
//! of journal entries in an append-only log, and balances are derived from
//! that log.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, LedgerEntry, etc.)
//! - [`core`] - The ledger engine:
//!   - [`core::engine`] - The `Ledger` context object and authorization recording
//!   - [`core::settlement`] - Settlement file processing
//!   - [`core::reconciliation`] - Bank deposit reconciliation
//!   - [`core::payout`] - Payout batches
//!   - [`core::balance`] - Balance derivation
//!   - [`core::worker`] - Single-writer worker for concurrent callers
//! - [`io`] - CSV input and output
//! - [`strategy`] - Sync and async pipeline drivers
//! - [`cli`] - CLI arguments parsing
//!
//! # Transaction Lifecycle
//!
//! A transaction only ever moves forward:
//!
//! - **Pending**: authorized, funds still at the card processor
//! - **Settling**: listed on a processor settlement file
//! - **Available**: matched to a bank deposit, ready for payout
//! - **Funded**: paid out to the merchant
//!
//! # Example
//!
//! ```
//! use payfac_ledger::{Authorization, Ledger, SimulatedIssuer};
//!
//! let mut ledger = Ledger::new(SimulatedIssuer::new());
//! ledger
//!     .record_authorization(Authorization::new("txn-1", "merchant-a", "ref-1", 1000))
//!     .unwrap();
//!
//! assert_eq!(ledger.merchant_balance("merchant-a").unwrap().pending, 1000);
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{Ledger, LedgerHandle, LedgerWorker, PayoutIssuer, SimulatedIssuer, WorkerConfig};
pub use io::{write_balances_csv, write_entries_csv};
pub use types::{
    Account, Amount, Authorization, Balance, BankDeposit, EntryType, LedgerEntry, LedgerError,
    MerchantId, PayoutError, PayoutResult, RejectedRow, SettlementFile, SettlementFileResult,
    SettlementRow, Transaction, TransactionId, TransactionStatus,
};
