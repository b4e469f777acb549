//! Month-grouped and trailing-week summaries.

use std::collections::HashMap;

use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate};

use crate::budget::CategoryTotal;
use crate::rules::{ExclusionFilter, FALLBACK_CATEGORY};
use crate::time::{days_left_in_month, month_key};
use crate::transaction::Transaction;

/// One row of the all-months overview, newest month first.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    /// `YYYY-MM`.
    pub month: String,
    pub total: f64,
    pub budget: f64,
    pub remaining: f64,
    pub on_budget: bool,
}

/// Group every transaction by calendar month.
///
/// This is the raw ledger view: refunds and exclusion patterns are kept in,
/// matching the historical overview rather than the live budget paths.
pub fn summarize_months(
    scraped: &[Transaction],
    manual: &[Transaction],
    budget: f64,
) -> Vec<MonthSummary> {
    let mut months: HashMap<String, f64> = HashMap::new();
    for txn in scraped.iter().chain(manual.iter()) {
        if txn.amount <= 0.0 {
            continue;
        }
        *months.entry(month_key(txn.date)).or_insert(0.0) += txn.amount;
    }

    let mut out: Vec<MonthSummary> = months
        .into_iter()
        .map(|(month, raw_total)| {
            let total = raw_total.round();
            let remaining = budget - total;
            MonthSummary {
                month,
                total,
                budget,
                remaining,
                on_budget: remaining >= 0.0,
            }
        })
        .collect();
    out.sort_by(|a, b| b.month.cmp(&a.month));
    out
}

/// Current month plus a trailing-7-day window.
#[derive(Debug, Clone)]
pub struct WeeklySummary {
    pub week_total: f64,
    pub week_count: usize,
    pub month_total: f64,
    pub remaining: f64,
    pub usage_percent: i64,
    pub days_left: i64,
    pub daily_budget: f64,
    pub top_categories: Vec<CategoryTotal>,
}

/// Aggregate the current month and its last seven days in one pass,
/// under the same scope rules as the live budget status.
pub fn compute_weekly(
    filter: &ExclusionFilter,
    scraped: &[Transaction],
    manual: &[Transaction],
    budget: f64,
    today: NaiveDate,
) -> Result<WeeklySummary> {
    if budget <= 0.0 {
        bail!("monthly budget ceiling must be positive (got {budget})");
    }

    let current_month = month_key(today);
    let week_ago = today - Duration::days(7);

    let mut week_total = 0.0;
    let mut week_count = 0;
    let mut category_totals: HashMap<String, f64> = HashMap::new();

    for txn in scraped.iter().chain(manual.iter()) {
        if txn.is_refund
            || filter.is_excluded(&txn.description)
            || txn.amount <= 0.0
            || month_key(txn.date) != current_month
        {
            continue;
        }
        let category = if txn.category.is_empty() {
            FALLBACK_CATEGORY
        } else {
            txn.category.as_str()
        };
        *category_totals.entry(category.to_string()).or_insert(0.0) += txn.amount;
        if txn.date >= week_ago {
            week_total += txn.amount;
            week_count += 1;
        }
    }

    let mut top_categories: Vec<CategoryTotal> = category_totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category, amount })
        .collect();
    top_categories.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });

    let month_total: f64 = top_categories.iter().map(|c| c.amount).sum();
    let remaining = budget - month_total.round();
    let usage_percent = (month_total / budget * 100.0).round() as i64;
    let days_left = days_left_in_month(today) as i64;
    let daily_budget = if remaining > 0.0 {
        (remaining / days_left.max(1) as f64).round()
    } else {
        0.0
    };

    Ok(WeeklySummary {
        week_total,
        week_count,
        month_total,
        remaining,
        usage_percent,
        days_left,
        daily_budget,
        top_categories,
    })
}
