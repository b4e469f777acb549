//! Parse card-statement CSV exports into normalized records.
//!
//! Exports open with a short preamble (export date, account holder) before
//! the header row:
//! Transaction Date,Posting Date,Description,Amount,Original Amount,Currency,Status,Memo,Reference,Account

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

use crate::types::{fallback_identifier, StatementRecord, StatementStatus};

/// Parse a card CSV file, returning all valid rows.
/// Skips the preamble and header automatically.
pub fn parse_card_csv(path: impl AsRef<Path>) -> Result<Vec<StatementRecord>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    parse_card_reader(file)
}

/// Same as [`parse_card_csv`] over any reader.
pub fn parse_card_reader<R: std::io::Read>(reader: R) -> Result<Vec<StatementRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut header_found = false;

    for result in rdr.records() {
        let record = result?;
        // Skip until the header row shows up.
        if !header_found {
            if record.get(0).map(|s| s.trim()) == Some("Transaction Date") {
                header_found = true;
            }
            continue;
        }

        let date_str = record.get(0).unwrap_or("").trim();
        if date_str.is_empty() {
            continue;
        }
        let trans_date = match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => continue, // skip unparseable rows
        };

        let post_date =
            NaiveDate::parse_from_str(record.get(1).unwrap_or("").trim(), "%Y-%m-%d").ok();
        let description = record.get(2).unwrap_or("").trim().to_string();
        let amount: f64 = record
            .get(3)
            .unwrap_or("0")
            .trim()
            .replace(',', "")
            .parse()
            .unwrap_or(0.0);
        let original_amount: f64 = record
            .get(4)
            .unwrap_or("")
            .trim()
            .replace(',', "")
            .parse()
            .unwrap_or(amount);
        let currency = match record.get(5).map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => "ILS".to_string(),
        };
        let status = match record.get(6).map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("pending") => StatementStatus::Pending,
            _ => StatementStatus::Completed,
        };
        let memo = record.get(7).unwrap_or("").trim().to_string();
        let reference = record.get(8).unwrap_or("").trim();
        let account = record.get(9).unwrap_or("").trim().to_string();

        let identifier = if reference.is_empty() {
            fallback_identifier(trans_date, &description, amount)
        } else {
            reference.to_string()
        };

        records.push(StatementRecord {
            trans_date,
            post_date,
            description,
            amount,
            original_amount,
            currency,
            status,
            memo,
            identifier,
            account,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Card statement export,,,,,,,,,
Account holder:,A. Example,,,,,,,,
,,,,,,,,,
Transaction Date,Posting Date,Description,Amount,Original Amount,Currency,Status,Memo,Reference,Account
2026-07-30,2026-08-02,WOLT TEL AVIV,64.00,64.00,ILS,Completed,,ref-001,1234
2026-08-01,,SUPERMARKET HAIFA,\"1,204.50\",\"1,204.50\",ILS,Pending,groceries run,,1234
2026-08-03,2026-08-03,AMAZON MKTP,89.90,24.99,USD,Completed,,ref-003,1234
not-a-date,,junk row,1.00,,,,,,,
";

    #[test]
    fn parses_rows_after_the_preamble() {
        let records = parse_card_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.trans_date, NaiveDate::from_ymd_opt(2026, 7, 30).unwrap());
        assert_eq!(first.post_date, NaiveDate::from_ymd_opt(2026, 8, 2));
        assert_eq!(first.description, "WOLT TEL AVIV");
        assert_eq!(first.amount, 64.0);
        assert_eq!(first.identifier, "ref-001");
        assert_eq!(first.status, StatementStatus::Completed);
    }

    #[test]
    fn handles_thousands_separators_and_pending_status() {
        let records = parse_card_reader(SAMPLE.as_bytes()).unwrap();
        let second = &records[1];
        assert_eq!(second.amount, 1204.5);
        assert_eq!(second.status, StatementStatus::Pending);
        assert_eq!(second.memo, "groceries run");
        assert!(second.post_date.is_none());
    }

    #[test]
    fn missing_reference_gets_the_fallback_identifier() {
        let records = parse_card_reader(SAMPLE.as_bytes()).unwrap();
        let second = &records[1];
        assert_eq!(
            second.identifier,
            fallback_identifier(second.trans_date, &second.description, second.amount)
        );
    }

    #[test]
    fn foreign_currency_keeps_the_original_amount() {
        let records = parse_card_reader(SAMPLE.as_bytes()).unwrap();
        let third = &records[2];
        assert_eq!(third.amount, 89.9);
        assert_eq!(third.original_amount, 24.99);
        assert_eq!(third.currency, "USD");
    }

    #[test]
    fn unparseable_dates_are_skipped() {
        let records = parse_card_reader(SAMPLE.as_bytes()).unwrap();
        assert!(records.iter().all(|r| r.description != "junk row"));
    }

    #[test]
    fn input_without_a_header_yields_nothing() {
        let records = parse_card_reader("just,some,noise\n1,2,3\n".as_bytes()).unwrap();
        assert!(records.is_empty());
    }
}
