//! I/O module
//!
//! Handles CSV parsing of ledger inputs and CSV output of balances and the journal.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, output serialization)
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    group_settlement_lines, write_balances_csv, write_entries_csv, AuthorizationCsvRecord,
    CsvInput, DepositCsvRecord, SettlementCsvRecord, SettlementLine,
};
pub use sync_reader::SyncReader;

use crate::types::LedgerError;
use std::path::Path;

/// Map an open failure to `FileNotFound` when the file is missing
pub(crate) fn open_error(path: &Path, error: std::io::Error) -> LedgerError {
    match error.kind() {
        std::io::ErrorKind::NotFound => LedgerError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LedgerError::from(error),
    }
}
