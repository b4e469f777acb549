//! Free-text expense parser for the manual entry path.
//!
//! Understands "50 pizza", "pizza 50", "groceries 120.50" and bare "200".

use regex::Regex;

use crate::rules::{RuleSet, FALLBACK_CATEGORY, TRANSFER_CATEGORY};

/// Description recorded when the message carries an amount only.
pub const MANUAL_EXPENSE_LABEL: &str = "Manual expense";

/// Upper bound for a single manual entry; anything above is a typo.
pub const MAX_EXPENSE_AMOUNT: f64 = 50_000.0;

const AMOUNT_FIRST: &str = r"^(\d+(?:\.\d+)?)\s+(.+)$";
const AMOUNT_LAST: &str = r"^(.+?)\s+(\d+(?:\.\d+)?)$";
const AMOUNT_ONLY: &str = r"^\d+(?:\.\d+)?$";

/// Peer-payment services whose names say "transfer", not "expense".
const TRANSFER_SERVICES: &str = r"(?i)\bbit\b|paybox|venmo|zelle|cash ?app|revolut";

/// A successfully parsed manual expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpense {
    pub amount: f64,
    pub description: String,
    pub category: String,
    /// Transfer-flavored entries must not be recorded until the user picks a bucket.
    pub is_ambiguous: bool,
}

/// Extract an amount and description from a short chat message.
///
/// Three positional grammars are tried in order, first success wins:
/// amount-first, amount-last, amount-only. Returns `None` when no amount is
/// found or the amount is outside `(0, MAX_EXPENSE_AMOUNT]`; the caller asks
/// the user to rephrase.
pub fn parse_expense_message(rules: &RuleSet, text: &str) -> Option<ParsedExpense> {
    let trimmed = text.trim();
    let (amount, description) = extract_amount(trimmed)?;

    if amount <= 0.0 || amount > MAX_EXPENSE_AMOUNT {
        return None;
    }

    let category = if description.is_empty() {
        FALLBACK_CATEGORY.to_string()
    } else {
        rules.categorize(&description).to_string()
    };

    let transfer_services = Regex::new(TRANSFER_SERVICES).ok()?;
    let is_ambiguous =
        category == TRANSFER_CATEGORY || transfer_services.is_match(&description);

    let description = if description.is_empty() {
        MANUAL_EXPENSE_LABEL.to_string()
    } else {
        description
    };

    Some(ParsedExpense {
        amount,
        description,
        category,
        is_ambiguous,
    })
}

fn extract_amount(trimmed: &str) -> Option<(f64, String)> {
    let amount_first = Regex::new(AMOUNT_FIRST).ok()?;
    if let Some(caps) = amount_first.captures(trimmed) {
        let amount: f64 = caps[1].parse().ok()?;
        return Some((amount, caps[2].trim().to_string()));
    }

    let amount_last = Regex::new(AMOUNT_LAST).ok()?;
    if let Some(caps) = amount_last.captures(trimmed) {
        let amount: f64 = caps[2].parse().ok()?;
        return Some((amount, caps[1].trim().to_string()));
    }

    let amount_only = Regex::new(AMOUNT_ONLY).ok()?;
    if amount_only.is_match(trimmed) {
        let amount: f64 = trimmed.parse().ok()?;
        return Some((amount, String::new()));
    }

    None
}
