//! Transaction registry
//!
//! Maps transaction ids to transaction state, plus an index from processor
//! reference id to transaction id used to correlate settlement rows.
//!
//! Transactions are kept in a BTreeMap so every scan (reconciliation
//! candidates, payout aggregation) visits them in transaction-id order.
//! Transactions are never removed.

use crate::types::{LedgerError, Transaction, TransactionId, TransactionStatus};
use std::collections::{BTreeMap, HashMap};

/// Transaction registry
#[derive(Debug, Default)]
pub struct TransactionRegistry {
    /// Map of transaction id to transaction
    transactions: BTreeMap<TransactionId, Transaction>,

    /// Map of processor reference id to transaction id
    ref_index: HashMap<String, TransactionId>,
}

impl TransactionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        TransactionRegistry::default()
    }

    /// Check whether a transaction could be inserted without clashing
    ///
    /// # Errors
    ///
    /// - `DuplicateTransaction` if the transaction id is known
    /// - `DuplicateProcessorReference` if the reference is already indexed
    pub fn check_insert(&self, transaction_id: &str, processor_ref_id: &str) -> Result<(), LedgerError> {
        if self.transactions.contains_key(transaction_id) {
            return Err(LedgerError::duplicate_transaction(transaction_id));
        }
        if let Some(existing) = self.ref_index.get(processor_ref_id) {
            return Err(LedgerError::duplicate_processor_reference(
                processor_ref_id,
                existing,
            ));
        }
        Ok(())
    }

    /// Insert a new transaction and index it by processor reference
    ///
    /// # Errors
    ///
    /// Same as [`check_insert`](Self::check_insert); nothing is changed on error.
    pub fn insert(&mut self, transaction: Transaction) -> Result<&Transaction, LedgerError> {
        self.check_insert(&transaction.transaction_id, &transaction.processor_ref_id)?;

        self.ref_index.insert(
            transaction.processor_ref_id.clone(),
            transaction.transaction_id.clone(),
        );
        let transaction_id = transaction.transaction_id.clone();
        Ok(self
            .transactions
            .entry(transaction_id)
            .or_insert(transaction))
    }

    /// Get a transaction by id
    pub fn get(&self, transaction_id: &str) -> Option<&Transaction> {
        self.transactions.get(transaction_id)
    }

    /// Get a mutable transaction by id
    pub fn get_mut(&mut self, transaction_id: &str) -> Option<&mut Transaction> {
        self.transactions.get_mut(transaction_id)
    }

    /// Resolve a processor reference to its transaction id
    pub fn lookup_ref(&self, processor_ref_id: &str) -> Option<&TransactionId> {
        self.ref_index.get(processor_ref_id)
    }

    /// Get the transaction indexed under a processor reference
    pub fn get_by_ref(&self, processor_ref_id: &str) -> Option<&Transaction> {
        self.lookup_ref(processor_ref_id)
            .and_then(|transaction_id| self.transactions.get(transaction_id))
    }

    /// All transactions, ordered by transaction id
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    /// Ids of transactions currently in `status`, ordered by transaction id
    pub fn ids_with_status(&self, status: TransactionStatus) -> Vec<TransactionId> {
        self.transactions
            .values()
            .filter(|txn| txn.status == status)
            .map(|txn| txn.transaction_id.clone())
            .collect()
    }

    /// Number of transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
