//! Single-writer ledger worker
//!
//! The ledger engine holds no internal synchronization. For concurrent use,
//! [`LedgerWorker`] moves a [`Ledger`] onto a dedicated blocking task that
//! consumes a bounded queue of commands, one at a time, and replies over
//! oneshot channels. Any number of cloned [`LedgerHandle`]s can submit
//! operations; each operation still runs to completion before the next one
//! starts, so entries from different operations never interleave.
//!
//! # Architecture
//!
//! ```text
//! LedgerHandle ──┐
//! LedgerHandle ──┼──► mpsc queue ──► worker thread (owns Ledger) ──► oneshot replies
//! LedgerHandle ──┘
//! ```
//!
//! The payout issuer is called from the worker thread, so a slow issuer
//! delays every queued command behind it.

use crate::core::engine::Ledger;
use crate::core::traits::PayoutIssuer;
use crate::types::{
    Authorization, Balance, BankDeposit, LedgerEntry, LedgerError, MerchantId, PayoutResult,
    SettlementFile, SettlementFileResult,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Configuration for the ledger worker
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Number of commands that can wait in the queue before senders block
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { queue_capacity: 64 }
    }
}

impl WorkerConfig {
    /// Create a new WorkerConfig, falling back to defaults for invalid values
    pub fn new(queue_capacity: usize) -> Self {
        let default = Self::default();

        let queue_capacity = if queue_capacity == 0 {
            tracing::warn!(
                queue_capacity,
                default = default.queue_capacity,
                "invalid queue_capacity, using default"
            );
            default.queue_capacity
        } else {
            queue_capacity
        };

        Self { queue_capacity }
    }
}

enum Command {
    Authorize {
        authorization: Authorization,
        reply: oneshot::Sender<Result<(), LedgerError>>,
    },
    Settle {
        file: SettlementFile,
        reply: oneshot::Sender<Result<SettlementFileResult, LedgerError>>,
    },
    Reconcile {
        deposit: BankDeposit,
        reply: oneshot::Sender<Result<usize, LedgerError>>,
    },
    Payout {
        reply: oneshot::Sender<Vec<PayoutResult>>,
    },
    MerchantBalance {
        merchant_id: MerchantId,
        reply: oneshot::Sender<Result<Balance, LedgerError>>,
    },
    SystemBalance {
        reply: oneshot::Sender<Result<Balance, LedgerError>>,
    },
    MerchantBalances {
        reply: oneshot::Sender<Result<Vec<Balance>, LedgerError>>,
    },
    Entries {
        reply: oneshot::Sender<Vec<LedgerEntry>>,
    },
}

impl Command {
    /// Run the command against the ledger and send the reply
    ///
    /// A dropped receiver means the caller gave up waiting; the operation
    /// has still been applied.
    fn apply<P: PayoutIssuer>(self, ledger: &mut Ledger<P>) {
        match self {
            Command::Authorize {
                authorization,
                reply,
            } => {
                let _ = reply.send(ledger.record_authorization(authorization));
            }
            Command::Settle { file, reply } => {
                let _ = reply.send(ledger.process_settlement_file(&file));
            }
            Command::Reconcile { deposit, reply } => {
                let _ = reply.send(ledger.reconcile_bank_deposit(deposit));
            }
            Command::Payout { reply } => {
                let _ = reply.send(ledger.execute_payout_batch());
            }
            Command::MerchantBalance { merchant_id, reply } => {
                let _ = reply.send(ledger.merchant_balance(&merchant_id));
            }
            Command::SystemBalance { reply } => {
                let _ = reply.send(ledger.system_balance());
            }
            Command::MerchantBalances { reply } => {
                let _ = reply.send(ledger.merchant_balances());
            }
            Command::Entries { reply } => {
                let _ = reply.send(ledger.entries().to_vec());
            }
        }
    }
}

/// Cloneable handle that submits operations to a running worker
#[derive(Clone, Debug)]
pub struct LedgerHandle {
    sender: mpsc::Sender<Command>,
}

impl LedgerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, LedgerError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(make(reply))
            .await
            .map_err(|_| LedgerError::WorkerStopped)?;
        response.await.map_err(|_| LedgerError::WorkerStopped)
    }

    /// See [`Ledger::record_authorization`]
    pub async fn record_authorization(&self, authorization: Authorization) -> Result<(), LedgerError> {
        self.request(|reply| Command::Authorize {
            authorization,
            reply,
        })
        .await?
    }

    /// See [`Ledger::process_settlement_file`]
    pub async fn process_settlement_file(
        &self,
        file: SettlementFile,
    ) -> Result<SettlementFileResult, LedgerError> {
        self.request(|reply| Command::Settle { file, reply }).await?
    }

    /// See [`Ledger::reconcile_bank_deposit`]
    pub async fn reconcile_bank_deposit(&self, deposit: BankDeposit) -> Result<usize, LedgerError> {
        self.request(|reply| Command::Reconcile { deposit, reply })
            .await?
    }

    /// See [`Ledger::execute_payout_batch`]
    pub async fn execute_payout_batch(&self) -> Result<Vec<PayoutResult>, LedgerError> {
        self.request(|reply| Command::Payout { reply }).await
    }

    /// See [`Ledger::merchant_balance`]
    pub async fn merchant_balance(&self, merchant_id: impl Into<MerchantId>) -> Result<Balance, LedgerError> {
        let merchant_id = merchant_id.into();
        self.request(|reply| Command::MerchantBalance { merchant_id, reply })
            .await?
    }

    /// See [`Ledger::system_balance`]
    pub async fn system_balance(&self) -> Result<Balance, LedgerError> {
        self.request(|reply| Command::SystemBalance { reply }).await?
    }

    /// See [`Ledger::merchant_balances`]
    pub async fn merchant_balances(&self) -> Result<Vec<Balance>, LedgerError> {
        self.request(|reply| Command::MerchantBalances { reply })
            .await?
    }

    /// Snapshot of the entry log
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.request(|reply| Command::Entries { reply }).await
    }
}

/// A ledger running on its own blocking task
pub struct LedgerWorker<P> {
    handle: LedgerHandle,
    join: JoinHandle<Ledger<P>>,
}

impl<P> LedgerWorker<P>
where
    P: PayoutIssuer + Send + 'static,
{
    /// Move `ledger` onto a dedicated worker task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(ledger: Ledger<P>, config: WorkerConfig) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Command>(config.queue_capacity);

        let join = tokio::task::spawn_blocking(move || {
            let mut ledger = ledger;
            while let Some(command) = receiver.blocking_recv() {
                command.apply(&mut ledger);
            }
            tracing::debug!("ledger worker stopped");
            ledger
        });

        LedgerWorker {
            handle: LedgerHandle { sender },
            join,
        }
    }

    /// A new handle for submitting operations
    pub fn handle(&self) -> LedgerHandle {
        self.handle.clone()
    }

    /// Stop accepting commands and return the ledger
    ///
    /// Waits until every outstanding handle has been dropped and the queue
    /// has drained.
    pub async fn shutdown(self) -> Result<Ledger<P>, LedgerError> {
        drop(self.handle);
        self.join.await.map_err(|_| LedgerError::WorkerStopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::issuer::SimulatedIssuer;
    use crate::types::{SettlementRow, TransactionStatus};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[test]
    fn test_zero_capacity_falls_back_to_default() {
        assert_eq!(WorkerConfig::new(0).queue_capacity, 64);
        assert_eq!(WorkerConfig::new(8).queue_capacity, 8);
    }

    #[tokio::test]
    async fn test_worker_runs_full_pipeline() {
        let worker = LedgerWorker::spawn(Ledger::new(SimulatedIssuer::new()), WorkerConfig::default());
        let handle = worker.handle();

        handle
            .record_authorization(Authorization::new("txn-1", "m1", "ref-1", 1000))
            .await
            .unwrap();
        let result = handle
            .process_settlement_file(SettlementFile::new(
                "file-1",
                date(),
                vec![SettlementRow::new("ref-1", "m1", 1000)],
            ))
            .await
            .unwrap();
        assert_eq!(result.matched, 1);

        let moved = handle
            .reconcile_bank_deposit(BankDeposit::new(1000, date()))
            .await
            .unwrap();
        assert_eq!(moved, 1);

        let payouts = handle.execute_payout_batch().await.unwrap();
        assert_eq!(payouts.len(), 1);
        assert!(payouts[0].success);

        let balance = handle.merchant_balance("m1").await.unwrap();
        assert_eq!(balance.funded, 1000);
        assert_eq!(balance.outstanding(), Ok(0));

        drop(handle);
        let ledger = worker.shutdown().await.unwrap();
        assert_eq!(
            ledger.transaction("txn-1").unwrap().status,
            TransactionStatus::Funded
        );
        assert_eq!(ledger.issuer().issued().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_are_serialized() {
        let worker = LedgerWorker::spawn(Ledger::new(SimulatedIssuer::new()), WorkerConfig::new(4));

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let handle = worker.handle();
                tokio::spawn(async move {
                    handle
                        .record_authorization(Authorization::new(
                            format!("txn-{:02}", i),
                            format!("m{}", i % 3),
                            format!("ref-{}", i),
                            100,
                        ))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let handle = worker.handle();
        let entries = handle.entries().await.unwrap();
        assert_eq!(entries.len(), 100);
        // Each pair is contiguous: debit then credit of the same journal
        for pair in entries.chunks(2) {
            assert_eq!(pair[0].journal_id, pair[1].journal_id);
            assert_eq!(pair[0].transaction_id, pair[1].transaction_id);
        }
        assert_eq!(handle.system_balance().await.unwrap().pending, 5000);

        drop(handle);
        let ledger = worker.shutdown().await.unwrap();
        assert!(ledger.verify_journal().is_ok());
    }

    #[tokio::test]
    async fn test_errors_are_returned_to_caller() {
        let worker = LedgerWorker::spawn(Ledger::new(SimulatedIssuer::new()), WorkerConfig::default());
        let handle = worker.handle();

        let err = handle
            .reconcile_bank_deposit(BankDeposit::new(100, date()))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::SettlementNotFound { .. }));

        drop(handle);
        worker.shutdown().await.unwrap();
    }
}
