//! Settlement processor
//!
//! Consumes processor settlement files, correlates each row to a transaction
//! through the processor-reference index, and advances matched Pending
//! transactions to Settling. It also records, per settlement date, the total
//! the bank deposit for that date is expected to match.
//!
//! # Idempotency
//!
//! Files are processed at most once per file id. Replaying a known file id
//! returns an empty result flagged `replayed` and journals nothing.
//!
//! # Row outcomes
//!
//! Every row is classified before any state changes:
//! - no processor reference: rejected
//! - reference not indexed: unmatched
//! - transaction already past Pending: already settled
//! - Pending transaction with a non-positive amount: rejected
//! - otherwise: settled
//!
//! # Expected totals
//!
//! The total for a date is the sum of every row in the file except rejected
//! ones, matched or not. A later file for the same date replaces the earlier
//! total rather than adding to it.

use crate::core::engine::{Ledger, REF_SETTLEMENT};
use crate::core::entry_log::Movement;
use crate::core::traits::PayoutIssuer;
use crate::types::{
    Account, Amount, FileId, LedgerError, RejectedRow, SettlementFile, SettlementFileResult,
    SettlementRow, TransactionId, TransactionStatus,
};
use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};

/// Processed file ids and expected totals per settlement date
#[derive(Debug, Default)]
pub struct SettlementBook {
    processed_files: HashSet<FileId>,
    expected_totals: BTreeMap<NaiveDate, Amount>,
}

impl SettlementBook {
    /// Create an empty book
    pub fn new() -> Self {
        SettlementBook::default()
    }

    /// Whether a file with this id has already been applied
    pub fn is_processed(&self, file_id: &str) -> bool {
        self.processed_files.contains(file_id)
    }

    /// Total the bank deposit for `date` must match, if any file covered it
    pub fn expected_total(&self, date: NaiveDate) -> Option<Amount> {
        self.expected_totals.get(&date).copied()
    }

    /// Mark a file processed and record its total for `date`
    ///
    /// # Returns
    ///
    /// The total previously recorded for that date, if any
    fn record(&mut self, file_id: &str, date: NaiveDate, total: Amount) -> Option<Amount> {
        self.processed_files.insert(file_id.to_string());
        self.expected_totals.insert(date, total)
    }
}

/// What a row does once the file is applied
#[derive(Debug, PartialEq, Eq)]
enum RowPlan {
    Settle(TransactionId),
    AlreadySettled,
    Unmatched,
    Rejected(String),
}

impl<P: PayoutIssuer> Ledger<P> {
    /// Process a daily settlement file from the card processor
    ///
    /// Rows are handled in file order. Unknown processor references are
    /// reported as unmatched, transactions that already left Pending are
    /// counted as already settled, and Pending transactions move to Settling
    /// with a debit Pending / credit Settling journal for the row amount.
    /// Rows that cannot be applied are returned in `rejected_rows` without
    /// blocking their siblings.
    ///
    /// # Arguments
    ///
    /// * `file` - The settlement file to process
    ///
    /// # Returns
    ///
    /// * `Ok(SettlementFileResult)` with per-row outcomes
    /// * `Err(LedgerError)` if the file was rejected; nothing is changed
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file id is empty
    /// - The file total overflows
    pub fn process_settlement_file(
        &mut self,
        file: &SettlementFile,
    ) -> Result<SettlementFileResult, LedgerError> {
        if file.file_id.trim().is_empty() {
            return Err(LedgerError::missing_field("file_id"));
        }

        if self.settlements.is_processed(&file.file_id) {
            tracing::info!(file_id = %file.file_id, "settlement file already processed, skipping");
            return Ok(SettlementFileResult::replay());
        }

        let (plans, total) = self.plan_rows(&file.rows)?;

        let now = Utc::now();
        let mut result = SettlementFileResult::default();

        for (row, plan) in file.rows.iter().zip(plans) {
            let transaction_id = match plan {
                RowPlan::Settle(transaction_id) => transaction_id,
                RowPlan::AlreadySettled => {
                    result.already_settled += 1;
                    continue;
                }
                RowPlan::Unmatched => {
                    tracing::warn!(
                        file_id = %file.file_id,
                        processor_ref_id = %row.processor_ref_id,
                        merchant_id = %row.merchant_id,
                        amount = row.amount,
                        "unmatched settlement row"
                    );
                    result.unmatched_rows.push(row.clone());
                    continue;
                }
                RowPlan::Rejected(reason) => {
                    tracing::warn!(
                        file_id = %file.file_id,
                        processor_ref_id = %row.processor_ref_id,
                        reason = %reason,
                        "settlement row rejected"
                    );
                    result.rejected_rows.push(RejectedRow::new(row.clone(), reason));
                    continue;
                }
            };

            let Some(txn) = self.registry.get_mut(&transaction_id) else {
                continue;
            };
            if !txn.advance_from(TransactionStatus::Pending) {
                continue;
            }

            if row.amount != txn.amount || row.merchant_id != txn.merchant_id {
                tracing::warn!(
                    transaction_id = %txn.transaction_id,
                    authorized_amount = txn.amount,
                    settled_amount = row.amount,
                    authorized_merchant = %txn.merchant_id,
                    settled_merchant = %row.merchant_id,
                    "settlement row differs from authorization"
                );
            }

            txn.settlement_date = Some(file.date);
            self.log.append_pair(
                Movement {
                    transaction_id: &txn.transaction_id,
                    merchant_id: &txn.merchant_id,
                    debit: Account::Pending,
                    credit: Account::Settling,
                    amount: row.amount,
                    reference: REF_SETTLEMENT,
                },
                now,
            );
            result.matched += 1;
        }

        if let Some(previous) = self.settlements.record(&file.file_id, file.date, total) {
            tracing::warn!(
                date = %file.date,
                previous_total = previous,
                new_total = total,
                "expected settlement total replaced by a later file"
            );
        }

        tracing::info!(
            file_id = %file.file_id,
            date = %file.date,
            matched = result.matched,
            already_settled = result.already_settled,
            unmatched = result.unmatched(),
            rejected = result.rejected_rows.len(),
            expected_total = total,
            "settlement file processed"
        );

        Ok(result)
    }

    /// Classify every row and sum the file total without touching state
    ///
    /// A reference repeated within the file settles once; later rows for it
    /// count as already settled.
    fn plan_rows(&self, rows: &[SettlementRow]) -> Result<(Vec<RowPlan>, Amount), LedgerError> {
        let mut settling: HashSet<&str> = HashSet::new();
        let mut plans = Vec::with_capacity(rows.len());
        let mut total: Amount = 0;

        for row in rows {
            let plan = if row.processor_ref_id.trim().is_empty() {
                RowPlan::Rejected("processor_ref_id is required".to_string())
            } else {
                match self.registry.get_by_ref(&row.processor_ref_id) {
                    None => RowPlan::Unmatched,
                    Some(txn)
                        if txn.status != TransactionStatus::Pending
                            || settling.contains(txn.transaction_id.as_str()) =>
                    {
                        RowPlan::AlreadySettled
                    }
                    Some(_) if row.amount <= 0 => {
                        RowPlan::Rejected(format!("amount must be positive, got {}", row.amount))
                    }
                    Some(txn) => {
                        settling.insert(txn.transaction_id.as_str());
                        RowPlan::Settle(txn.transaction_id.clone())
                    }
                }
            };

            if !matches!(plan, RowPlan::Rejected(_)) {
                total = total
                    .checked_add(row.amount)
                    .ok_or_else(|| LedgerError::arithmetic_overflow("settlement total"))?;
            }
            plans.push(plan);
        }

        Ok((plans, total))
    }
}
