//! Synchronous processing strategy
//!
//! Single-threaded pipeline that owns a `Ledger` directly. Inputs are
//! streamed through `SyncReader`; settlement lines are grouped into files
//! before processing since a file is applied as a unit.

use crate::core::Ledger;
use crate::io::csv_format::{
    group_settlement_lines, AuthorizationCsvRecord, CsvInput, DepositCsvRecord, SettlementCsvRecord,
};
use crate::io::sync_reader::SyncReader;
use crate::strategy::{log_payout_round, write_report, Pipeline, ProcessingStrategy};
use crate::types::LedgerError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use payfac_ledger::strategy::{Pipeline, ProcessingStrategy, SyncProcessingStrategy};
/// use std::io;
///
/// let pipeline = Pipeline::new("authorizations.csv");
/// let mut output = io::stdout();
///
/// SyncProcessingStrategy
///     .process(&pipeline, &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

/// Open `path` and yield its valid rows, logging and skipping the rest
fn valid_rows<T: CsvInput>(path: &Path) -> Result<impl Iterator<Item = T::Output>, LedgerError> {
    let reader = SyncReader::<File, T>::open(path)?;
    Ok(reader.filter_map(|result| match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "skipping invalid record");
            None
        }
    }))
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, pipeline: &Pipeline, output: &mut dyn Write) -> Result<(), LedgerError> {
        let mut ledger = Ledger::new(pipeline.issuer());

        for authorization in valid_rows::<AuthorizationCsvRecord>(&pipeline.authorizations)? {
            let transaction_id = authorization.transaction_id.clone();
            if let Err(e) = ledger.record_authorization(authorization) {
                tracing::warn!(transaction_id = %transaction_id, error = %e, "authorization rejected");
            }
        }

        if let Some(path) = &pipeline.settlements {
            for file in group_settlement_lines(valid_rows::<SettlementCsvRecord>(path)?) {
                if let Err(e) = ledger.process_settlement_file(&file) {
                    tracing::warn!(file_id = %file.file_id, error = %e, "settlement file rejected");
                }
            }
        }

        if let Some(path) = &pipeline.deposits {
            for deposit in valid_rows::<DepositCsvRecord>(path)? {
                if let Err(e) = ledger.reconcile_bank_deposit(deposit) {
                    tracing::warn!(date = %deposit.settlement_date, error = %e, "deposit rejected");
                }
            }
        }

        for round in 1..=pipeline.payout_rounds {
            let results = ledger.execute_payout_batch();
            log_payout_round(round, &results);
        }

        write_report(
            pipeline,
            &ledger.merchant_balances()?,
            &ledger.system_balance()?,
            ledger.entries(),
            output,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_authorizations_only() {
        let auth = create_temp_csv(
            "transaction_id,merchant_id,processor_ref_id,amount\n\
             txn-1,m1,ref-1,1000\n\
             txn-2,m2,ref-2,500\n",
        );

        let mut output = Vec::new();
        SyncProcessingStrategy
            .process(&Pipeline::new(auth.path()), &mut output)
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "merchant,pending,settling,available,funded\n\
             m1,1000,0,0,0\n\
             m2,500,0,0,0\n\
             *,1500,0,0,0\n"
        );
    }

    #[test]
    fn test_full_pipeline_with_journal() {
        let auth = create_temp_csv(
            "transaction_id,merchant_id,processor_ref_id,amount\n\
             txn-1,m1,ref-1,1000\n",
        );
        let settlements = create_temp_csv(
            "file_id,date,processor_ref_id,merchant_id,amount\n\
             file-1,2026-02-10,ref-1,m1,1000\n",
        );
        let deposits = create_temp_csv("date,amount\n2026-02-10,1000\n");
        let journal = NamedTempFile::new().unwrap();

        let pipeline = Pipeline {
            settlements: Some(settlements.path().to_path_buf()),
            deposits: Some(deposits.path().to_path_buf()),
            journal: Some(journal.path().to_path_buf()),
            ..Pipeline::new(auth.path())
        };

        let mut output = Vec::new();
        SyncProcessingStrategy.process(&pipeline, &mut output).unwrap();

        let report = String::from_utf8(output).unwrap();
        assert!(report.contains("m1,0,0,0,1000\n"));

        let journal_text = std::fs::read_to_string(journal.path()).unwrap();
        // header plus 4 journals of 2 entries
        assert_eq!(journal_text.lines().count(), 9);
    }

    #[test]
    fn test_missing_authorizations_is_fatal() {
        let mut output = Vec::new();
        let err = SyncProcessingStrategy
            .process(&Pipeline::new("nonexistent.csv"), &mut output)
            .unwrap_err();

        assert!(matches!(err, LedgerError::FileNotFound { .. }));
        assert!(output.is_empty());
    }

    #[test]
    fn test_missing_optional_input_is_fatal() {
        let auth = create_temp_csv("transaction_id,merchant_id,processor_ref_id,amount\n");
        let pipeline = Pipeline {
            deposits: Some("nonexistent.csv".into()),
            ..Pipeline::new(auth.path())
        };

        let mut output = Vec::new();
        assert!(SyncProcessingStrategy.process(&pipeline, &mut output).is_err());
    }
}
