//! Monthly budget aggregation: totals, remaining, projection, category breakdown.

use std::collections::HashMap;

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::rules::{ExclusionFilter, FALLBACK_CATEGORY};
use crate::time::{days_left_in_month, month_key};
use crate::transaction::Transaction;

/// One category bucket of the month's spending.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// Ephemeral snapshot of the current month against the ceiling.
/// Recomputed on every request, never persisted.
#[derive(Debug, Clone)]
pub struct BudgetStatus {
    /// Sum of in-scope amounts, unrounded. Equals the sum of
    /// `top_categories` amounts by construction.
    pub total: f64,
    pub budget: f64,
    /// `budget - round(total)`; negative once over the ceiling.
    pub remaining: f64,
    pub usage_percent: i64,
    pub days_left: i64,
    /// Suggested spend per remaining day; zero once over budget.
    pub daily_budget: f64,
    /// Category sums, largest first.
    pub top_categories: Vec<CategoryTotal>,
}

/// Aggregate the current calendar month.
///
/// Skips refund-flagged rows, exclusion-pattern matches, non-positive
/// amounts, and anything dated outside `today`'s month. Rounding happens
/// only at the presentation fields, not during accumulation.
pub fn compute_status(
    filter: &ExclusionFilter,
    scraped: &[Transaction],
    manual: &[Transaction],
    budget: f64,
    today: NaiveDate,
) -> Result<BudgetStatus> {
    if budget <= 0.0 {
        bail!("monthly budget ceiling must be positive (got {budget})");
    }

    let current_month = month_key(today);
    let mut category_totals: HashMap<String, f64> = HashMap::new();

    for txn in scraped.iter().chain(manual.iter()) {
        if !in_scope(filter, txn, &current_month) {
            continue;
        }
        let category = if txn.category.is_empty() {
            FALLBACK_CATEGORY
        } else {
            txn.category.as_str()
        };
        *category_totals.entry(category.to_string()).or_insert(0.0) += txn.amount;
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

    // Total is the sum of the sorted buckets, so the breakdown always
    // partitions it exactly, float order included.
    let total: f64 = top_categories.iter().map(|c| c.amount).sum();

    let remaining = budget - total.round();
    let usage_percent = (total / budget * 100.0).round() as i64;
    let days_left = days_left_in_month(today) as i64;
    let daily_budget = if remaining > 0.0 {
        (remaining / days_left.max(1) as f64).round()
    } else {
        0.0
    };

    Ok(BudgetStatus {
        total,
        budget,
        remaining,
        usage_percent,
        days_left,
        daily_budget,
        top_categories,
    })
}

fn in_scope(filter: &ExclusionFilter, txn: &Transaction, current_month: &str) -> bool {
    !txn.is_refund
        && !filter.is_excluded(&txn.description)
        && txn.amount > 0.0
        && month_key(txn.date) == current_month
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ExclusionFilter {
        ExclusionFilter::builtin().unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sums_current_month_only() {
        let today = d(2026, 8, 7);
        let scraped = vec![
            Transaction::scraped(d(2026, 8, 1), 100.0, "WOLT", "Dining Out"),
            Transaction::scraped(d(2026, 7, 31), 999.0, "WOLT", "Dining Out"),
        ];
        let manual = vec![Transaction::manual(d(2026, 8, 5), 50.0, "pizza", "Dining Out")];
        let status = compute_status(&filter(), &scraped, &manual, 3000.0, today).unwrap();
        assert_eq!(status.total, 150.0);
    }

    #[test]
    fn skips_refunds_exclusions_and_nonpositive_amounts() {
        let today = d(2026, 8, 7);
        let scraped = vec![
            Transaction::scraped(d(2026, 8, 1), 100.0, "WOLT", "Dining Out"),
            Transaction::scraped(d(2026, 8, 2), 80.0, "WOLT", "Dining Out").as_refund(),
            Transaction::scraped(d(2026, 8, 3), 30.0, "Annual card fee", "Fees"),
            Transaction::scraped(d(2026, 8, 4), 0.0, "SUPERMARKET", "Groceries"),
            Transaction::scraped(d(2026, 8, 4), -20.0, "SUPERMARKET", "Groceries"),
        ];
        let status = compute_status(&filter(), &scraped, &[], 3000.0, today).unwrap();
        assert_eq!(status.total, 100.0);
        assert_eq!(status.top_categories.len(), 1);
    }

    #[test]
    fn total_partitions_into_category_sums() {
        let today = d(2026, 8, 7);
        let scraped = vec![
            Transaction::scraped(d(2026, 8, 1), 10.5, "WOLT", "Dining Out"),
            Transaction::scraped(d(2026, 8, 2), 0.25, "SUPERMARKET", "Groceries"),
            Transaction::scraped(d(2026, 8, 3), 33.3, "GETT", "Transport"),
            Transaction::scraped(d(2026, 8, 4), 0.45, "mystery", ""),
        ];
        let status = compute_status(&filter(), &scraped, &[], 3000.0, today).unwrap();
        let sum: f64 = status.top_categories.iter().map(|c| c.amount).sum();
        assert_eq!(status.total, sum);
    }

    #[test]
    fn uncategorized_rows_count_under_fallback() {
        let today = d(2026, 8, 7);
        let scraped = vec![Transaction::scraped(d(2026, 8, 1), 60.0, "mystery shop", "")];
        let status = compute_status(&filter(), &scraped, &[], 3000.0, today).unwrap();
        assert_eq!(status.top_categories[0].category, FALLBACK_CATEGORY);
        assert_eq!(status.top_categories[0].amount, 60.0);
    }

    #[test]
    fn top_categories_sorted_descending() {
        let today = d(2026, 8, 7);
        let scraped = vec![
            Transaction::scraped(d(2026, 8, 1), 100.0, "WOLT", "Dining Out"),
            Transaction::scraped(d(2026, 8, 2), 300.0, "SUPERMARKET", "Groceries"),
            Transaction::scraped(d(2026, 8, 3), 200.0, "GETT", "Transport"),
        ];
        let status = compute_status(&filter(), &scraped, &[], 3000.0, today).unwrap();
        let order: Vec<&str> = status
            .top_categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(order, ["Groceries", "Transport", "Dining Out"]);
    }

    #[test]
    fn remaining_usage_and_daily_budget() {
        let today = d(2026, 8, 21); // 10 days left in August
        let scraped = vec![Transaction::scraped(d(2026, 8, 1), 1000.4, "WOLT", "Dining Out")];
        let status = compute_status(&filter(), &scraped, &[], 3000.0, today).unwrap();
        assert_eq!(status.remaining, 2000.0);
        assert_eq!(status.usage_percent, 33);
        assert_eq!(status.days_left, 10);
        assert_eq!(status.daily_budget, 200.0);
    }

    #[test]
    fn daily_budget_zero_when_over_budget() {
        let today = d(2026, 8, 7);
        let scraped = vec![Transaction::scraped(d(2026, 8, 1), 3500.0, "WOLT", "Dining Out")];
        let status = compute_status(&filter(), &scraped, &[], 3000.0, today).unwrap();
        assert!(status.remaining < 0.0);
        assert_eq!(status.daily_budget, 0.0);
        assert_eq!(status.usage_percent, 117);
    }

    #[test]
    fn daily_budget_divides_by_at_least_one_day() {
        let today = d(2026, 8, 31);
        let scraped = vec![Transaction::scraped(d(2026, 8, 1), 1000.0, "WOLT", "Dining Out")];
        let status = compute_status(&filter(), &scraped, &[], 3000.0, today).unwrap();
        assert_eq!(status.days_left, 0);
        assert_eq!(status.daily_budget, 2000.0);
    }

    #[test]
    fn zero_or_negative_ceiling_is_a_configuration_error() {
        let today = d(2026, 8, 7);
        assert!(compute_status(&filter(), &[], &[], 0.0, today).is_err());
        assert!(compute_status(&filter(), &[], &[], -100.0, today).is_err());
    }

    #[test]
    fn empty_month_yields_zero_status() {
        let today = d(2026, 8, 7);
        let status = compute_status(&filter(), &[], &[], 3000.0, today).unwrap();
        assert_eq!(status.total, 0.0);
        assert_eq!(status.usage_percent, 0);
        assert!(status.top_categories.is_empty());
    }
}
