//! Interfaces to the external transaction store, plus an in-memory stand-in.

use anyhow::Result;
use chrono::NaiveDate;

use crate::transaction::{Source, Transaction};

/// Read access to the transaction store. Implementations hand back records
/// already deduplicated.
pub trait TransactionSource {
    fn list_scraped(&self) -> Result<Vec<Transaction>>;
    fn list_manual(&self) -> Result<Vec<Transaction>>;
}

/// Append access for the manual-entry and disambiguation paths.
///
/// A failed append must leave the store unchanged; the caller never sees a
/// half-recorded transaction.
pub trait TransactionSink {
    fn append_manual(
        &mut self,
        date: NaiveDate,
        description: &str,
        amount: f64,
        category: &str,
        note: Option<&str>,
    ) -> Result<()>;
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub scraped: Vec<Transaction>,
    pub manual: Vec<Transaction>,
}

impl TransactionSource for MemoryStore {
    fn list_scraped(&self) -> Result<Vec<Transaction>> {
        Ok(self.scraped.clone())
    }

    fn list_manual(&self) -> Result<Vec<Transaction>> {
        Ok(self.manual.clone())
    }
}

impl TransactionSink for MemoryStore {
    fn append_manual(
        &mut self,
        date: NaiveDate,
        description: &str,
        amount: f64,
        category: &str,
        note: Option<&str>,
    ) -> Result<()> {
        self.manual.push(Transaction {
            date,
            amount,
            description: description.to_string(),
            category: category.to_string(),
            is_refund: false,
            source: Source::Manual,
            note: note.map(str::to_string),
            identifier: None,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_appends_manual_rows() {
        let mut store = MemoryStore::default();
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        store
            .append_manual(date, "pizza", 50.0, "Dining Out", Some("late night"))
            .unwrap();

        let manual = store.list_manual().unwrap();
        assert_eq!(manual.len(), 1);
        assert_eq!(manual[0].source, Source::Manual);
        assert_eq!(manual[0].note.as_deref(), Some("late night"));
        assert!(store.list_scraped().unwrap().is_empty());
    }
}
