//! Settlement and deposit types
//!
//! Settlement files arrive from the card processor; bank deposits arrive from
//! the facilitator's bank. Both are transient inputs: only the file id and the
//! per-date total outlive processing.

use super::account::{Amount, MerchantId};
use super::transaction::ProcessorRefId;
use chrono::NaiveDate;
use serde::Serialize;

/// Settlement file identifier, used for idempotency
pub type FileId = String;

/// A single row of a processor settlement file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementRow {
    pub processor_ref_id: ProcessorRefId,
    pub merchant_id: MerchantId,
    pub amount: Amount,
}

impl SettlementRow {
    pub fn new(
        processor_ref_id: impl Into<ProcessorRefId>,
        merchant_id: impl Into<MerchantId>,
        amount: Amount,
    ) -> Self {
        SettlementRow {
            processor_ref_id: processor_ref_id.into(),
            merchant_id: merchant_id.into(),
            amount,
        }
    }
}

/// A settlement row that could not be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub row: SettlementRow,
    pub reason: String,
}

impl RejectedRow {
    pub fn new(row: SettlementRow, reason: impl Into<String>) -> Self {
        RejectedRow {
            row,
            reason: reason.into(),
        }
    }
}

/// A daily settlement file from the card processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementFile {
    pub file_id: FileId,
    pub date: NaiveDate,
    /// Rows in file order
    pub rows: Vec<SettlementRow>,
}

impl SettlementFile {
    pub fn new(file_id: impl Into<FileId>, date: NaiveDate, rows: Vec<SettlementRow>) -> Self {
        SettlementFile {
            file_id: file_id.into(),
            date,
            rows,
        }
    }
}

/// Outcome of processing one settlement file
///
/// Row-level problems are reported here rather than as errors, since a
/// settlement file legitimately mixes matched and unmatched rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementFileResult {
    /// Rows that advanced a Pending transaction to Settling
    pub matched: usize,

    /// Rows whose transaction had already left Pending
    pub already_settled: usize,

    /// Rows with no transaction indexed for their processor reference, in file order
    pub unmatched_rows: Vec<SettlementRow>,

    /// Rows with no processor reference, or matching a Pending transaction
    /// with a non-positive amount, in file order
    pub rejected_rows: Vec<RejectedRow>,

    /// True when the file id had already been processed and nothing was done
    pub replayed: bool,
}

impl SettlementFileResult {
    /// Result returned for a file id that was already processed
    pub fn replay() -> Self {
        SettlementFileResult {
            replayed: true,
            ..SettlementFileResult::default()
        }
    }

    /// Number of unmatched rows
    pub fn unmatched(&self) -> usize {
        self.unmatched_rows.len()
    }
}

/// A deposit received into the facilitator's bank account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankDeposit {
    pub amount: Amount,
    pub settlement_date: NaiveDate,
}

impl BankDeposit {
    pub fn new(amount: Amount, settlement_date: NaiveDate) -> Self {
        BankDeposit {
            amount,
            settlement_date,
        }
    }
}
