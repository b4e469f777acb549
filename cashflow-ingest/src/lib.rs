//! cashflow-ingest: card-statement ingestion (CSV exports) normalized into
//! ledger transactions.

pub mod parsers;
pub mod types;

pub use parsers::card_csv::{parse_card_csv, parse_card_reader};
pub use types::{StatementRecord, StatementStatus};

use std::collections::HashSet;

/// Keep only records whose identifier is not already in the ledger.
/// The store itself stays append-only; dedup happens here, before the write.
pub fn filter_new(
    records: Vec<StatementRecord>,
    existing: &HashSet<String>,
) -> Vec<StatementRecord> {
    records
        .into_iter()
        .filter(|r| !existing.contains(&r.identifier))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str) -> StatementRecord {
        StatementRecord {
            trans_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            post_date: None,
            description: "SUPERMARKET".to_string(),
            amount: 100.0,
            original_amount: 100.0,
            currency: "ILS".to_string(),
            status: StatementStatus::Completed,
            memo: String::new(),
            identifier: id.to_string(),
            account: "1234".to_string(),
        }
    }

    #[test]
    fn filter_new_drops_known_identifiers() {
        let existing: HashSet<String> = ["a".to_string(), "b".to_string()].into();
        let fresh = filter_new(vec![record("a"), record("c")], &existing);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].identifier, "c");
    }
}
