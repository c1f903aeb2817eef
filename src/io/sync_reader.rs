//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over any [`CsvInput`] row type. Delegates
//! CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding `Result<T::Output, LedgerError>`
//! for each CSV row:
//!
//! ```no_run
//! use payfac_ledger::io::csv_format::AuthorizationCsvRecord;
//! use payfac_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::<_, AuthorizationCsvRecord>::open(Path::new("authorizations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(authorization) => println!("{:?}", authorization),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found) are returned from `open()`
//! - Individual row errors are yielded as Err variants in the iterator,
//!   carrying the line number

use crate::io::csv_format::CsvInput;
use crate::io::open_error;
use crate::types::LedgerError;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;

/// Synchronous CSV reader over rows of type `T`
#[derive(Debug)]
pub struct SyncReader<R, T> {
    reader: csv::Reader<R>,
    line_num: u64,
    _row: PhantomData<fn() -> T>,
}

impl<T: CsvInput> SyncReader<File, T> {
    /// Open a CSV file for streaming iteration
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the path does not exist and `IoError` for
    /// any other open failure.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        Ok(Self::new(file))
    }
}

impl<R: Read, T: CsvInput> SyncReader<R, T> {
    /// Wrap any reader
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (for optional trailing columns)
    /// - Use an 8KB buffer
    pub fn new(reader: R) -> Self {
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(reader);

        Self {
            reader,
            line_num: 1,
            _row: PhantomData,
        }
    }
}

impl<R: Read, T: CsvInput> Iterator for SyncReader<R, T> {
    type Item = Result<T::Output, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<T>();
        let result = deserializer.next()?;
        self.line_num += 1;
        let line = self.line_num;

        Some(match result {
            Ok(record) => record.convert().map_err(|e| LedgerError::ParseError {
                line: Some(line),
                message: e.to_string(),
            }),
            Err(e) => Err(LedgerError::from(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_format::{AuthorizationCsvRecord, DepositCsvRecord, SettlementCsvRecord};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn reader<T: CsvInput>(csv: &str) -> SyncReader<&[u8], T> {
        SyncReader::new(csv.as_bytes())
    }

    #[test]
    fn test_reads_authorizations() {
        let csv = "transaction_id,merchant_id,processor_ref_id,amount,card_number\n\
                   txn-1,m1,ref-1,1000,4242-tok\n\
                   txn-2,m2,ref-2,500\n";

        let records: Vec<_> = reader::<AuthorizationCsvRecord>(csv).collect();

        assert_eq!(records.len(), 2);
        let first = records[0].as_ref().unwrap();
        assert_eq!(first.amount, 1000);
        assert_eq!(first.card_number.as_deref(), Some("4242-tok"));
        assert_eq!(records[1].as_ref().unwrap().card_number, None);
    }

    #[test]
    fn test_bad_row_does_not_stop_iteration() {
        let csv = "date,amount\n\
                   2026-02-10,abc\n\
                   2026-02-11,300\n";

        let records: Vec<_> = reader::<DepositCsvRecord>(csv).collect();

        assert_eq!(records.len(), 2);
        match &records[0] {
            Err(LedgerError::ParseError { line, message }) => {
                assert_eq!(*line, Some(2));
                assert!(message.contains("amount"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        assert_eq!(records[1].as_ref().unwrap().amount, 300);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let csv = "file_id,date,processor_ref_id,merchant_id,amount\n\
                   \x20file-1 , 2026-02-10 , ref-1 , m1 , 100 \n";

        let line = reader::<SettlementCsvRecord>(csv).next().unwrap().unwrap();

        assert_eq!(line.file_id, "file-1");
        assert_eq!(line.row.processor_ref_id, "ref-1");
        assert_eq!(line.row.amount, 100);
    }

    #[test]
    fn test_open_missing_file() {
        let err = SyncReader::<File, DepositCsvRecord>::open(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, LedgerError::FileNotFound { .. }));
    }

    #[test]
    fn test_open_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "date,amount\n2026-02-10,100\n").unwrap();
        file.flush().unwrap();

        let deposits: Vec<_> = SyncReader::<File, DepositCsvRecord>::open(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(deposits.len(), 1);
    }
}
