//! Normalized statement row (issuer-agnostic) and its ledger conversion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cashflow_core::{RuleSet, Source, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementStatus {
    Completed,
    Pending,
}

/// One row of a card-statement export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRecord {
    pub trans_date: NaiveDate,
    /// Charge-posting date; issuers omit it for in-flight rows.
    pub post_date: Option<NaiveDate>,
    pub description: String,
    /// Positive = charge, negative = credit/refund.
    pub amount: f64,
    /// Pre-conversion amount for foreign-currency charges.
    pub original_amount: f64,
    pub currency: String,
    pub status: StatementStatus,
    pub memo: String,
    pub identifier: String,
    pub account: String,
}

impl StatementRecord {
    /// Charge-posting date preferred over the transaction date.
    pub fn charge_date(&self) -> NaiveDate {
        self.post_date.unwrap_or(self.trans_date)
    }

    /// Ledger transaction with the category assigned at ingest.
    /// Credits arrive as refund-flagged rows so they never count toward
    /// the budget.
    pub fn to_transaction(&self, rules: &RuleSet) -> Transaction {
        Transaction {
            date: self.charge_date(),
            amount: self.amount.abs(),
            description: self.description.clone(),
            category: rules.categorize(&self.description).to_string(),
            is_refund: self.amount < 0.0,
            source: Source::Scraped,
            note: if self.memo.is_empty() {
                None
            } else {
                Some(self.memo.clone())
            },
            identifier: Some(self.identifier.clone()),
        }
    }
}

/// Identifier for exports that carry no reference column.
pub fn fallback_identifier(date: NaiveDate, description: &str, amount: f64) -> String {
    format!("{date}_{description}_{amount}")
}
