//! Payout engine
//!
//! Aggregates each merchant's Available transactions, asks the payout issuer
//! to disburse the total, and moves the merchant's transactions to Funded
//! when the issuer accepts.
//!
//! # Retries
//!
//! There is no internal retry or backoff. A declined payout leaves the
//! merchant's transactions Available, so the next batch picks them up again.
//! Merchants are independent: one merchant's failure never affects another.

use crate::core::engine::{Ledger, REF_PAYOUT};
use crate::core::entry_log::Movement;
use crate::core::traits::PayoutIssuer;
use crate::types::{
    Account, Amount, MerchantId, PayoutResult, TransactionId, TransactionStatus,
};
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A merchant's Available funds at the start of a batch
struct MerchantAggregate {
    amount: Amount,
    transaction_ids: Vec<TransactionId>,
}

impl<P: PayoutIssuer> Ledger<P> {
    /// Execute one payout batch
    ///
    /// Merchants are visited in merchant-id order, and each merchant's
    /// transactions in transaction-id order. The issuer is called at most
    /// once per merchant with a fresh reference.
    ///
    /// # Returns
    ///
    /// One result per merchant attempted. Issuer failures are reported in
    /// the result and never fail the batch.
    pub fn execute_payout_batch(&mut self) -> Vec<PayoutResult> {
        let mut results = Vec::new();

        for (merchant_id, aggregate) in self.available_by_merchant() {
            if aggregate.amount <= 0 {
                continue;
            }

            let reference = format!("payout-{}-{}", merchant_id, Uuid::new_v4());
            match self
                .issuer
                .issue_payout(&merchant_id, aggregate.amount, &reference)
            {
                Ok(()) => {
                    self.fund(&aggregate.transaction_ids);
                    tracing::info!(
                        merchant_id = %merchant_id,
                        amount = aggregate.amount,
                        transactions = aggregate.transaction_ids.len(),
                        reference = %reference,
                        "payout issued"
                    );
                    results.push(PayoutResult::succeeded(
                        merchant_id,
                        aggregate.amount,
                        reference,
                    ));
                }
                Err(error) => {
                    tracing::warn!(
                        merchant_id = %merchant_id,
                        amount = aggregate.amount,
                        reference = %reference,
                        error = %error,
                        "payout failed, funds remain available"
                    );
                    results.push(PayoutResult::failed(
                        merchant_id,
                        aggregate.amount,
                        reference,
                        error,
                    ));
                }
            }
        }

        results
    }

    /// Sum Available transactions per merchant
    ///
    /// A merchant whose sum would overflow is left out of the batch.
    fn available_by_merchant(&self) -> BTreeMap<MerchantId, MerchantAggregate> {
        let mut aggregates: BTreeMap<MerchantId, MerchantAggregate> = BTreeMap::new();
        let mut overflowed: Vec<MerchantId> = Vec::new();

        for txn in self
            .registry
            .iter()
            .filter(|txn| txn.status == TransactionStatus::Available)
        {
            let aggregate = aggregates
                .entry(txn.merchant_id.clone())
                .or_insert_with(|| MerchantAggregate {
                    amount: 0,
                    transaction_ids: Vec::new(),
                });
            match aggregate.amount.checked_add(txn.amount) {
                Some(amount) => {
                    aggregate.amount = amount;
                    aggregate.transaction_ids.push(txn.transaction_id.clone());
                }
                None => overflowed.push(txn.merchant_id.clone()),
            }
        }

        for merchant_id in overflowed {
            if aggregates.remove(&merchant_id).is_some() {
                tracing::error!(merchant_id = %merchant_id, "available balance overflows, payout skipped");
            }
        }

        aggregates
    }

    /// Move Available transactions to Funded, journaling each
    fn fund(&mut self, transaction_ids: &[TransactionId]) {
        let now = Utc::now();
        for transaction_id in transaction_ids {
            let Some(txn) = self.registry.get_mut(transaction_id) else {
                continue;
            };
            if !txn.advance_from(TransactionStatus::Available) {
                continue;
            }

            self.log.append_pair(
                Movement {
                    transaction_id: &txn.transaction_id,
                    merchant_id: &txn.merchant_id,
                    debit: Account::Available,
                    credit: Account::Funded,
                    amount: txn.amount,
                    reference: REF_PAYOUT,
                },
                now,
            );
        }
    }
}
