//! Transaction record shared by the scraped and manual entry paths.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "scraped")]
    Scraped,
    #[serde(rename = "manual")]
    Manual,
}

/// A single spend.
///
/// Records are never deleted; keeping a row out of the budget is logical
/// (the refund flag and the exclusion patterns), not physical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Charge-posting date when the issuer provides one, transaction date otherwise.
    pub date: NaiveDate,
    /// Positive, in whole currency units.
    pub amount: f64,
    pub description: String,
    /// Empty until assigned. Mutable only while it is empty or the fallback label.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_refund: bool,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Issuer identifier, used to dedup scraped rows across syncs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl Transaction {
    /// A manually entered expense.
    pub fn manual(
        date: NaiveDate,
        amount: f64,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            description: description.into(),
            category: category.into(),
            is_refund: false,
            source: Source::Manual,
            note: None,
            identifier: None,
        }
    }

    /// A scraped statement row.
    pub fn scraped(
        date: NaiveDate,
        amount: f64,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            description: description.into(),
            category: category.into(),
            is_refund: false,
            source: Source::Scraped,
            note: None,
            identifier: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn as_refund(mut self) -> Self {
        self.is_refund = true;
        self
    }
}
