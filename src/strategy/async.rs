//! Asynchronous processing strategy
//!
//! Drives the ledger through a [`LedgerWorker`] on a tokio multi-threaded
//! runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── WorkerConfig (queue_capacity)
//!     ├── AsyncReader (batch CSV reading)
//!     └── LedgerWorker (single writer, owns the Ledger)
//!         └── LedgerHandle (command submission)
//! ```
//!
//! Each batch of authorizations is submitted concurrently; the worker's queue
//! is FIFO, so they are applied in file order. Settlement files, deposits and
//! payout rounds are awaited one at a time because each depends on the
//! previous one having been applied.

use crate::core::worker::{LedgerHandle, LedgerWorker, WorkerConfig};
use crate::core::Ledger;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::{
    group_settlement_lines, AuthorizationCsvRecord, CsvInput, DepositCsvRecord, SettlementCsvRecord,
};
use crate::io::open_error;
use crate::strategy::{log_payout_round, write_report, Pipeline, ProcessingStrategy};
use crate::types::LedgerError;
use futures::future::join_all;
use std::io::Write;
use std::path::Path;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

/// Asynchronous processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: WorkerConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }
}

async fn open<T: CsvInput + 'static>(
    path: &Path,
) -> Result<AsyncReader<Compat<tokio::fs::File>, T>, LedgerError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| open_error(path, e))?;

    // Wrap tokio file in a compatibility layer for csv-async
    Ok(AsyncReader::new(file.compat()))
}

impl AsyncProcessingStrategy {
    async fn authorize_all(&self, handle: &LedgerHandle, path: &Path) -> Result<(), LedgerError> {
        let mut reader = open::<AuthorizationCsvRecord>(path).await?;

        loop {
            let batch = reader.read_batch(self.config.queue_capacity).await;
            if batch.is_empty() {
                return Ok(());
            }

            let ids: Vec<_> = batch.iter().map(|a| a.transaction_id.clone()).collect();
            let results = join_all(batch.into_iter().map(|a| handle.record_authorization(a))).await;

            for (transaction_id, result) in ids.iter().zip(results) {
                match result {
                    Ok(()) => {}
                    Err(LedgerError::WorkerStopped) => return Err(LedgerError::WorkerStopped),
                    Err(e) => {
                        tracing::warn!(transaction_id = %transaction_id, error = %e, "authorization rejected")
                    }
                }
            }
        }
    }

    async fn run(&self, handle: &LedgerHandle, pipeline: &Pipeline) -> Result<(), LedgerError> {
        self.authorize_all(handle, &pipeline.authorizations).await?;

        if let Some(path) = &pipeline.settlements {
            let lines = open::<SettlementCsvRecord>(path).await?.read_all().await;
            for file in group_settlement_lines(lines) {
                let file_id = file.file_id.clone();
                match handle.process_settlement_file(file).await {
                    Ok(_) => {}
                    Err(LedgerError::WorkerStopped) => return Err(LedgerError::WorkerStopped),
                    Err(e) => tracing::warn!(file_id = %file_id, error = %e, "settlement file rejected"),
                }
            }
        }

        if let Some(path) = &pipeline.deposits {
            for deposit in open::<DepositCsvRecord>(path).await?.read_all().await {
                match handle.reconcile_bank_deposit(deposit).await {
                    Ok(_) => {}
                    Err(LedgerError::WorkerStopped) => return Err(LedgerError::WorkerStopped),
                    Err(e) => {
                        tracing::warn!(date = %deposit.settlement_date, error = %e, "deposit rejected")
                    }
                }
            }
        }

        for round in 1..=pipeline.payout_rounds {
            let results = handle.execute_payout_batch().await?;
            log_payout_round(round, &results);
        }

        Ok(())
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(&self, pipeline: &Pipeline, output: &mut dyn Write) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .build()
            .map_err(|e| LedgerError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let worker = LedgerWorker::spawn(Ledger::new(pipeline.issuer()), self.config.clone());
            let handle = worker.handle();

            let report = async {
                self.run(&handle, pipeline).await?;
                Ok::<_, LedgerError>((
                    handle.merchant_balances().await?,
                    handle.system_balance().await?,
                    handle.entries().await?,
                ))
            }
            .await;

            drop(handle);
            worker.shutdown().await?;

            let (balances, system, entries) = report?;
            write_report(pipeline, &balances, &system, &entries, output)
        })
    }
}
