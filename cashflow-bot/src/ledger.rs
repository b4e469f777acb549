//! JSON-file ledger implementing the core's transaction source/sink.
//!
//! Every mutation serializes the whole updated file first and only then
//! commits to memory, so a failed write never leaves a half-recorded state.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use cashflow_core::{RuleSet, Source, Transaction, TransactionSink, TransactionSource};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    scraped: Vec<Transaction>,
    #[serde(default)]
    manual: Vec<Transaction>,
}

pub struct JsonLedger {
    path: PathBuf,
    data: LedgerFile,
}

impl JsonLedger {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?
        } else {
            LedgerFile::default()
        };
        Ok(Self { path, data })
    }

    /// Identifiers of every stored scraped row, for sync dedup.
    pub fn identifiers(&self) -> HashSet<String> {
        self.data
            .scraped
            .iter()
            .filter_map(|t| t.identifier.clone())
            .collect()
    }

    /// Append a batch of scraped rows. The whole batch lands or none of it.
    pub fn append_scraped(&mut self, batch: Vec<Transaction>) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        let added = batch.len();
        let mut next = self.data.clone();
        next.scraped.extend(batch);
        self.persist(&next)?;
        self.data = next;
        Ok(added)
    }

    /// Re-run improved rules over stored scraped rows; only empty/fallback
    /// categories may change. Returns how many rows changed.
    pub fn recategorize(&mut self, rules: &RuleSet) -> Result<usize> {
        let mut next = self.data.clone();
        let changed = rules.recategorize(&mut next.scraped);
        if changed > 0 {
            self.persist(&next)?;
            self.data = next;
        }
        Ok(changed)
    }

    fn persist(&self, data: &LedgerFile) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(data).context("serialize ledger")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

impl TransactionSource for JsonLedger {
    fn list_scraped(&self) -> Result<Vec<Transaction>> {
        Ok(self.data.scraped.clone())
    }

    fn list_manual(&self) -> Result<Vec<Transaction>> {
        Ok(self.data.manual.clone())
    }
}

impl TransactionSink for JsonLedger {
    fn append_manual(
        &mut self,
        date: NaiveDate,
        description: &str,
        amount: f64,
        category: &str,
        note: Option<&str>,
    ) -> Result<()> {
        let mut next = self.data.clone();
        next.manual.push(Transaction {
            date,
            amount,
            description: description.to_string(),
            category: category.to_string(),
            is_refund: false,
            source: Source::Manual,
            note: note.map(str::to_string),
            identifier: None,
        });
        self.persist(&next)?;
        self.data = next;
        Ok(())
    }
}
