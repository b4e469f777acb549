//! Merchant-pattern categorization and budget exclusion.
//!
//! The rule table is an ordered list of (pattern, label) pairs; the first
//! matching rule wins. No LLM needed — substring/regex rules cover the
//! overwhelming majority of card descriptions.

use anyhow::{Context, Result};
use regex::RegexBuilder;

use crate::transaction::Transaction;

/// Label assigned when no rule matches.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Label that marks a money transfer rather than a real expense.
pub const TRANSFER_CATEGORY: &str = "Transfers";

/// Built-in rule table. Order is significant: the first match wins, so the
/// more specific merchant patterns sit above the broad catch-alls.
const DEFAULT_RULES: &[(&str, &str)] = &[
    // Groceries
    (
        r"supermarket|grocer|shufersal|rami levy|yohananof|fresh market|victory|tiv taam|osher ad",
        "Groceries",
    ),
    (r"bakery|\bbread\b|patisserie", "Groceries"),
    (r"greengrocer|fruit & veg|organic|farm box|vegan", "Groceries"),
    // Eating out
    (
        r"aroma|cofix|nespresso bar|greg cafe|coffee|cafe|espresso",
        "Dining Out",
    ),
    (
        r"wolt|ten bis|deliveroo|uber eats|japanika|restaurant|pizza|burger|bistro",
        "Dining Out",
    ),
    (
        r"mcdonald|\bkfc\b|domino|shawarma|falafel|hummus|sushi",
        "Dining Out",
    ),
    // Transport
    (r"rav.?kav|\bbird\b|\blime\b|\bgett\b|taxi|\buber\b", "Transport"),
    (r"\bfuel\b|\bpaz\b|sonol|dor.?alon|petrol|gas station", "Transport"),
    (r"railways|\btrain\b|\begged\b|metropoline|\bbus\b", "Transport"),
    (r"parking", "Transport"),
    // Shopping
    (
        r"h&m|zara|\bfox\b|\bmall\b|footwear|clothing|shein|aliexpress|amazon|\btemu\b",
        "Shopping",
    ),
    (r"ikea|\bace\b|home center|furniture|kitchenware", "Shopping"),
    (r"ebay|wish\.com", "Shopping"),
    // Bills and housing
    (r"electric co|power grid|\biec\b", "Bills"),
    (r"water corp|mekorot", "Bills"),
    (r"municipalit|city tax|arnona", "Bills"),
    (r"supergas|amisragas|gas supply", "Bills"),
    (
        r"bezeq|\bhot\b|\byes\b|partner|cellcom|golan telecom|\b01[239]\b",
        "Bills",
    ),
    (r"\brent\b|landlord|mortgage|house committee", "Housing"),
    // Health
    (
        r"super.?pharm|pharmacy|clinic|maccabi|clalit|meuhedet|leumit",
        "Health",
    ),
    (r"dentist|dental|optic|eye care", "Health"),
    // Tech and subscriptions
    (
        r"openai|claude|spotify|netflix|apple|google|microsoft|\bgpt\b",
        "Tech",
    ),
    (r"youtube|disney|\bhbo\b|dazn|app.?store|play store", "Tech"),
    // Sport
    (r"\bgym\b|fitness|yoga|pilates|holmes place", "Sport"),
    // Transfers and banking
    (r"transfer|\bbit\b|paybox|venmo|zelle|cash ?app|revolut", "Transfers"),
    (r"card fee|commission|interest charge", "Fees"),
    (r"cashback|refund|reimburs", "Refunds"),
    // Education
    (
        r"universit|college|course|tuition|bookstore|udemy|coursera",
        "Education",
    ),
    // Leisure and travel
    (
        r"cinema|movie|theatre|theater|concert|museum|\bclub\b|yes planet",
        "Leisure",
    ),
    (r"hotel|booking\.com|airbnb|flight|\btrip\b", "Travel"),
    // Insurance
    (r"insurance|phoenix|harel|migdal|\baig\b", "Insurance"),
    // Pets
    (r"veterinar|\bvet\b|\bpet\b", "Pets"),
    // Broad catch-alls
    (r"pending", "Other"),
];

/// Description patterns that keep a row out of every budget total, whatever
/// its category: fees the card reimburses and refund-style credits.
const EXCLUDED_PATTERNS: &[&str] = &[r"card fee", r"cashback", r"refund|reimburs"];

/// One (pattern, label) pair of the ordered rule table.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pattern: regex::Regex,
    category: String,
}

impl CategoryRule {
    pub fn new(pattern: &str, category: impl Into<String>) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("invalid category pattern: {pattern}"))?;
        Ok(Self {
            pattern,
            category: category.into(),
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn matches(&self, description: &str) -> bool {
        self.pattern.is_match(description)
    }
}

/// Ordered first-match-wins rule table.
///
/// Kept data-driven so the table can be replaced from user config without
/// touching code; evaluation itself is a pure function of (description, rules).
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
}

impl RuleSet {
    /// The built-in table.
    pub fn builtin() -> Result<Self> {
        Self::from_pairs(DEFAULT_RULES.iter().copied())
    }

    /// Compile an ordered (pattern, label) list, e.g. loaded from a user file.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let rules = pairs
            .into_iter()
            .map(|(pattern, category)| CategoryRule::new(pattern, category))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Map a description to a category label. Walks the table in declaration
    /// order and returns the first match; empty input and no-match both yield
    /// the fallback label.
    pub fn categorize(&self, description: &str) -> &str {
        if description.trim().is_empty() {
            return FALLBACK_CATEGORY;
        }
        for rule in &self.rules {
            if rule.matches(description) {
                return rule.category();
            }
        }
        FALLBACK_CATEGORY
    }

    /// Re-run the (presumably improved) table over stored transactions.
    ///
    /// Only rows whose category is empty or the fallback label are touched;
    /// anything else is a prior assignment — possibly a manual correction —
    /// and is never overwritten. Returns how many rows changed.
    pub fn recategorize(&self, transactions: &mut [Transaction]) -> usize {
        let mut changed = 0;
        for txn in transactions {
            if !txn.category.is_empty() && txn.category != FALLBACK_CATEGORY {
                continue;
            }
            let fresh = self.categorize(&txn.description);
            if fresh != txn.category {
                txn.category = fresh.to_string();
                changed += 1;
            }
        }
        changed
    }
}

/// Budget exclusion check, applied before and independently of
/// categorization in every aggregation path.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    patterns: Vec<regex::Regex>,
}

impl ExclusionFilter {
    pub fn builtin() -> Result<Self> {
        let patterns = EXCLUDED_PATTERNS
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("invalid exclusion pattern: {p}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_excluded(&self, description: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(description))
    }
}
