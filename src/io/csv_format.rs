//! CSV format handling for ledger inputs and outputs
//!
//! This module centralizes all CSV format concerns, providing:
//! - Record structures for deserializing authorizations, settlement lines and deposits
//! - Conversion from CSV records to domain types
//! - Grouping of settlement lines into settlement files
//! - Balance and journal output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{
    Amount, Authorization, Balance, BankDeposit, FileId, LedgerEntry, LedgerError, SettlementFile,
    SettlementRow,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Write;

/// Date format used by settlement and deposit files
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A CSV row type that converts into a domain value
///
/// Readers are generic over this trait so one reader implementation serves
/// every input file.
pub trait CsvInput: DeserializeOwned {
    /// Domain value produced by a valid row
    type Output;

    /// Convert the raw row, rejecting unparseable fields
    fn convert(self) -> Result<Self::Output, LedgerError>;
}

/// Row of the authorizations file
///
/// Columns: transaction_id, merchant_id, processor_ref_id, amount, card_number.
/// The card number column is optional.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AuthorizationCsvRecord {
    pub transaction_id: String,
    pub merchant_id: String,
    pub processor_ref_id: String,
    pub amount: String,
    #[serde(default)]
    pub card_number: Option<String>,
}

impl CsvInput for AuthorizationCsvRecord {
    type Output = Authorization;

    fn convert(self) -> Result<Authorization, LedgerError> {
        let amount = parse_amount(&self.amount)?;
        let authorization = Authorization::new(
            self.transaction_id,
            self.merchant_id,
            self.processor_ref_id,
            amount,
        );

        Ok(match self.card_number {
            Some(card) if !card.trim().is_empty() => authorization.with_card_number(card),
            _ => authorization,
        })
    }
}

/// Row of the settlements file
///
/// Columns: file_id, date, processor_ref_id, merchant_id, amount.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SettlementCsvRecord {
    pub file_id: String,
    pub date: String,
    pub processor_ref_id: String,
    pub merchant_id: String,
    pub amount: String,
}

/// One settlement row tagged with the file it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementLine {
    pub file_id: FileId,
    pub date: NaiveDate,
    pub row: SettlementRow,
}

impl CsvInput for SettlementCsvRecord {
    type Output = SettlementLine;

    fn convert(self) -> Result<SettlementLine, LedgerError> {
        if self.file_id.trim().is_empty() {
            return Err(LedgerError::missing_field("file_id"));
        }
        if self.processor_ref_id.trim().is_empty() {
            return Err(LedgerError::missing_field("processor_ref_id"));
        }

        Ok(SettlementLine {
            date: parse_date(&self.date)?,
            row: SettlementRow::new(self.processor_ref_id, self.merchant_id, parse_amount(&self.amount)?),
            file_id: self.file_id,
        })
    }
}

/// Row of the deposits file
///
/// Columns: date, amount.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DepositCsvRecord {
    pub date: String,
    pub amount: String,
}

impl CsvInput for DepositCsvRecord {
    type Output = BankDeposit;

    fn convert(self) -> Result<BankDeposit, LedgerError> {
        Ok(BankDeposit::new(parse_amount(&self.amount)?, parse_date(&self.date)?))
    }
}

/// Parse an integer amount in minor units
///
/// Sign is not checked here; the engine owns amount rules.
fn parse_amount(raw: &str) -> Result<Amount, LedgerError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(LedgerError::missing_field("amount"));
    }
    raw.parse::<Amount>().map_err(|_| {
        LedgerError::validation("amount", &format!("'{}' is not an integer amount", raw))
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, LedgerError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        LedgerError::validation("date", &format!("'{}' is not a YYYY-MM-DD date", raw))
    })
}

/// Group settlement lines into files
///
/// Consecutive lines sharing a file id and date form one file. A file id
/// that shows up again later becomes a separate file, which the engine
/// then treats as a replay.
pub fn group_settlement_lines(lines: impl IntoIterator<Item = SettlementLine>) -> Vec<SettlementFile> {
    let mut files: Vec<SettlementFile> = Vec::new();

    for line in lines {
        match files.last_mut() {
            Some(file) if file.file_id == line.file_id && file.date == line.date => {
                file.rows.push(line.row);
            }
            _ => files.push(SettlementFile::new(line.file_id, line.date, vec![line.row])),
        }
    }

    files
}

/// Marker used in place of a merchant id for the system-wide balance row
pub const SYSTEM_ROW: &str = "*";

/// Write balances to CSV format
///
/// Writes one row per merchant with columns: merchant, pending, settling,
/// available, funded. Merchants are sorted by id for deterministic output,
/// and the system-wide balance follows as a final `*` row.
pub fn write_balances_csv(
    balances: &[Balance],
    system: &Balance,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["merchant", "pending", "settling", "available", "funded"])?;

    let mut sorted: Vec<&Balance> = balances.iter().collect();
    sorted.sort_by(|a, b| a.merchant_id.cmp(&b.merchant_id));

    for balance in sorted.into_iter().chain(std::iter::once(system)) {
        let merchant = balance.merchant_id.as_deref().unwrap_or(SYSTEM_ROW);
        writer.write_record(&[
            merchant.to_string(),
            balance.pending.to_string(),
            balance.settling.to_string(),
            balance.available.to_string(),
            balance.funded.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the entry log to CSV format, one entry per row in log order
pub fn write_entries_csv(entries: &[LedgerEntry], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    if entries.is_empty() {
        writer.write_record([
            "entry_id",
            "journal_id",
            "transaction_id",
            "merchant_id",
            "account",
            "entry_type",
            "amount",
            "timestamp",
            "reference",
        ])?;
    }
    for entry in entries {
        writer.serialize(entry)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Account, EntryType};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn auth_record(amount: &str, card: Option<&str>) -> AuthorizationCsvRecord {
        AuthorizationCsvRecord {
            transaction_id: "txn-1".to_string(),
            merchant_id: "m1".to_string(),
            processor_ref_id: "ref-1".to_string(),
            amount: amount.to_string(),
            card_number: card.map(|s| s.to_string()),
        }
    }

    #[rstest]
    #[case::plain("1000", None, 1000, None)]
    #[case::whitespace("  250 ", None, 250, None)]
    #[case::with_card("1000", Some("4242-tok"), 1000, Some("4242-tok"))]
    #[case::blank_card("1000", Some("  "), 1000, None)]
    fn test_convert_authorization(
        #[case] amount: &str,
        #[case] card: Option<&str>,
        #[case] expected_amount: Amount,
        #[case] expected_card: Option<&str>,
    ) {
        let authorization = auth_record(amount, card).convert().unwrap();

        assert_eq!(authorization.transaction_id, "txn-1");
        assert_eq!(authorization.amount, expected_amount);
        assert_eq!(authorization.card_number.as_deref(), expected_card);
    }

    #[rstest]
    #[case::decimal("10.50", "not an integer")]
    #[case::text("ten", "not an integer")]
    #[case::empty("", "required")]
    fn test_convert_authorization_errors(#[case] amount: &str, #[case] expected_error: &str) {
        let err = auth_record(amount, None).convert().unwrap_err();
        assert!(
            err.to_string().contains(expected_error),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_negative_amount_is_left_to_engine() {
        assert_eq!(auth_record("-5", None).convert().unwrap().amount, -5);
    }

    #[rstest]
    #[case::valid("2026-02-10", true)]
    #[case::slashes("2026/02/10", false)]
    #[case::impossible("2026-02-30", false)]
    fn test_convert_settlement_date(#[case] date: &str, #[case] ok: bool) {
        let record = SettlementCsvRecord {
            file_id: "file-1".to_string(),
            date: date.to_string(),
            processor_ref_id: "ref-1".to_string(),
            merchant_id: "m1".to_string(),
            amount: "100".to_string(),
        };
        assert_eq!(record.convert().is_ok(), ok);
    }

    #[test]
    fn test_settlement_requires_processor_reference() {
        let record = SettlementCsvRecord {
            file_id: "file-1".to_string(),
            date: "2026-02-10".to_string(),
            processor_ref_id: " ".to_string(),
            merchant_id: "m1".to_string(),
            amount: "50".to_string(),
        };

        let err = record.convert().unwrap_err();
        assert!(err.to_string().contains("processor_ref_id"));
    }

    #[test]
    fn test_convert_deposit() {
        let deposit = DepositCsvRecord {
            date: "2026-02-10".to_string(),
            amount: "3000".to_string(),
        }
        .convert()
        .unwrap();

        assert_eq!(deposit.amount, 3000);
        assert_eq!(
            deposit.settlement_date,
            NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
        );
    }

    fn line(file_id: &str, day: u32, reference: &str) -> SettlementLine {
        SettlementLine {
            file_id: file_id.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            row: SettlementRow::new(reference, "m1", 100),
        }
    }

    #[test]
    fn test_group_consecutive_lines() {
        let files = group_settlement_lines(vec![
            line("file-1", 10, "ref-1"),
            line("file-1", 10, "ref-2"),
            line("file-2", 11, "ref-3"),
            line("file-1", 10, "ref-4"),
        ]);

        assert_eq!(files.len(), 3);
        assert_eq!(files[0].file_id, "file-1");
        assert_eq!(files[0].rows.len(), 2);
        assert_eq!(files[1].file_id, "file-2");
        // A later group reusing a file id stays separate
        assert_eq!(files[2].file_id, "file-1");
        assert_eq!(files[2].rows[0].processor_ref_id, "ref-4");
    }

    #[test]
    fn test_group_splits_on_date_change() {
        let files = group_settlement_lines(vec![line("file-1", 10, "ref-1"), line("file-1", 11, "ref-2")]);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_write_balances_sorted_with_system_row() {
        let mut m2 = Balance::for_merchant("m2");
        m2.pending = 500;
        let mut m1 = Balance::for_merchant("m1");
        m1.funded = 1000;
        let mut system = Balance::system();
        system.pending = 500;
        system.funded = 1000;

        let mut output = Vec::new();
        write_balances_csv(&[m2, m1], &system, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "merchant,pending,settling,available,funded\n\
             m1,0,0,0,1000\n\
             m2,500,0,0,0\n\
             *,500,0,0,1000\n"
        );
    }

    #[test]
    fn test_write_entries() {
        let entry = LedgerEntry {
            entry_id: 1,
            journal_id: 1,
            transaction_id: "txn-1".to_string(),
            merchant_id: "m1".to_string(),
            account: Account::CardProcessor,
            entry_type: EntryType::Debit,
            amount: 1000,
            timestamp: Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap(),
            reference: "authorization".to_string(),
        };

        let mut output = Vec::new();
        write_entries_csv(&[entry], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("entry_id,journal_id,transaction_id,merchant_id,account,entry_type,amount,timestamp,reference")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,1,txn-1,m1,card_processor,debit,1000,2026-02-10T12:00:00"));
        assert!(row.ends_with(",authorization"));
    }

    #[test]
    fn test_write_entries_empty_has_header() {
        let mut output = Vec::new();
        write_entries_csv(&[], &mut output).unwrap();
        assert!(String::from_utf8(output).unwrap().starts_with("entry_id,"));
    }
}
