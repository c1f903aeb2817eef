//! Core ledger module
//!
//! This module contains the ledger engine components:
//! - `traits` - The payout issuer seam
//! - `entry_log` - Append-only double-entry log
//! - `registry` - Transaction registry with processor reference index
//! - `engine` - The `Ledger` context object and authorization recording
//! - `settlement` - Settlement file processing
//! - `reconciliation` - Bank deposit reconciliation
//! - `payout` - Payout batches
//! - `balance` - Balance derivation from the entry log
//! - `issuer` - Simulated payout issuer
//! - `worker` - Single-writer worker for concurrent callers

pub mod balance;
pub mod engine;
pub mod entry_log;
pub mod issuer;
pub mod payout;
pub mod reconciliation;
pub mod registry;
pub mod settlement;
pub mod traits;
pub mod worker;

pub use balance::BalanceCalculator;
pub use engine::Ledger;
pub use entry_log::EntryLog;
pub use issuer::{IssuedPayout, SimulatedIssuer};
pub use registry::TransactionRegistry;
pub use settlement::SettlementBook;
pub use traits::PayoutIssuer;
pub use worker::{LedgerHandle, LedgerWorker, WorkerConfig};
