//! End-to-end conversational paths: free-text entry, transfer
//! disambiguation, and the status the user sees afterwards.

use chrono::{Duration, TimeZone, Utc};
use chrono::NaiveDate;

use cashflow_core::{
    compute_status, get_insight_with, is_anomaly, parse_expense_message, ExclusionFilter,
    MemoryStore, PendingStore, Resolution, RuleSet, TransactionSink, TransactionSource,
    TRANSFER_OPTIONS,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 7, 18, 30, 0).unwrap()
}

#[test]
fn plain_expense_is_recorded_and_shows_up_in_status() {
    let rules = RuleSet::builtin().unwrap();
    let filter = ExclusionFilter::builtin().unwrap();
    let mut store = MemoryStore::default();

    let parsed = parse_expense_message(&rules, "50 pizza").unwrap();
    assert!(!parsed.is_ambiguous);

    store
        .append_manual(today(), &parsed.description, parsed.amount, &parsed.category, None)
        .unwrap();

    let status = compute_status(
        &filter,
        &store.list_scraped().unwrap(),
        &store.list_manual().unwrap(),
        3000.0,
        today(),
    )
    .unwrap();

    assert_eq!(status.total, 50.0);
    assert_eq!(status.top_categories[0].category, "Dining Out");

    // 50 of 3000 is ordinary; an insight may come from the category pool only.
    assert!(!is_anomaly(parsed.amount, 3000.0));
    let insight = get_insight_with(&parsed.category, status.usage_percent, |_| 0).unwrap();
    assert!(insight.contains("🍕") || insight.contains("🍔") || insight.contains("😅"));
}

#[test]
fn ambiguous_transfer_waits_for_a_choice_before_recording() {
    let rules = RuleSet::builtin().unwrap();
    let mut store = MemoryStore::default();
    let mut pending = PendingStore::with_default_ttl();

    let parsed = parse_expense_message(&rules, "300 bit to Dana").unwrap();
    assert!(parsed.is_ambiguous);

    // Nothing recorded yet; the entry is parked instead.
    pending.start("chat-77", parsed.amount, &parsed.description, now());
    assert!(store.list_manual().unwrap().is_empty());

    // The fixed option set always carries the ignore escape hatch.
    assert!(TRANSFER_OPTIONS.iter().any(|o| o.value == "ignore"));

    match pending.resolve("chat-77", "gift", now() + Duration::minutes(1)) {
        Resolution::Record {
            amount,
            description,
            category,
            note,
        } => {
            store
                .append_manual(today(), &description, amount, &category, Some(&note))
                .unwrap();
        }
        other => panic!("expected Record, got {other:?}"),
    }

    let manual = store.list_manual().unwrap();
    assert_eq!(manual.len(), 1);
    assert_eq!(manual[0].category, "Gifts");
    assert_eq!(manual[0].note.as_deref(), Some("classified as gift"));

    // A stray second tap must not double-record.
    assert_eq!(
        pending.resolve("chat-77", "gift", now() + Duration::minutes(2)),
        Resolution::Stale
    );
    assert_eq!(store.list_manual().unwrap().len(), 1);
}

#[test]
fn ignored_transfer_leaves_no_trace_in_the_ledger() {
    let rules = RuleSet::builtin().unwrap();
    let filter = ExclusionFilter::builtin().unwrap();
    let store = MemoryStore::default();
    let mut pending = PendingStore::with_default_ttl();

    let parsed = parse_expense_message(&rules, "1200 venmo rent split").unwrap();
    assert!(parsed.is_ambiguous);
    pending.start("chat-77", parsed.amount, &parsed.description, now());

    assert_eq!(pending.resolve("chat-77", "ignore", now()), Resolution::Ignored);

    let status = compute_status(&filter, &[], &store.list_manual().unwrap(), 3000.0, today()).unwrap();
    assert_eq!(status.total, 0.0);
}

#[test]
fn unparseable_message_records_nothing() {
    let rules = RuleSet::builtin().unwrap();
    let store = MemoryStore::default();

    assert!(parse_expense_message(&rules, "what did I spend?").is_none());
    assert!(store.list_manual().unwrap().is_empty());
}
