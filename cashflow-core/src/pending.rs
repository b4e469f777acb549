//! Transfer disambiguation: per-conversation pending entries with a TTL.
//!
//! One entry per conversation: NONE -> AWAITING_CHOICE -> RESOLVED. A second
//! ambiguous message before resolution overwrites the first (last write
//! wins); `start` hands the dropped entry back so the caller can log it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::rules::TRANSFER_CATEGORY;

/// One button of the fixed choice set presented with a pending transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOption {
    pub label: &'static str,
    pub value: &'static str,
}

/// The fixed, mutually exclusive choice set.
pub const TRANSFER_OPTIONS: &[TransferOption] = &[
    TransferOption { label: "💸 Expense", value: "expense" },
    TransferOption { label: "🎁 Gift", value: "gift" },
    TransferOption { label: "💰 Savings", value: "savings" },
    TransferOption { label: "🚫 Don't count", value: "ignore" },
];

/// Category recorded for a choice; unmapped values fall back to the
/// generic transfer category.
pub fn choice_category(choice: &str) -> &'static str {
    match choice {
        "gift" => "Gifts",
        "savings" => "Savings",
        _ => TRANSFER_CATEGORY,
    }
}

/// An ambiguous expense awaiting the user's bucket choice.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransfer {
    pub amount: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a choice callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Record a transaction with the category mapped from the choice.
    Record {
        amount: f64,
        description: String,
        category: String,
        note: String,
    },
    /// The user picked "ignore": acknowledged, nothing recorded.
    Ignored,
    /// No live pending entry: unknown key, double-tap, or expired.
    Stale,
}

pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// Store of unresolved disambiguations, keyed by conversation id.
///
/// Callers pass `now` explicitly, which keeps expiry deterministic under
/// test. Expired entries are evicted when touched; there is no sweeper.
/// `&mut self` on the mutating calls makes check-then-consume atomic per
/// store, so a double-tapped choice button cannot record twice.
#[derive(Debug)]
pub struct PendingStore {
    entries: HashMap<String, PendingTransfer>,
    ttl: Duration,
}

impl PendingStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    /// Park an ambiguous expense for `conversation`. Returns the previous
    /// entry when one was still awaiting a choice (the documented
    /// last-write-wins overwrite).
    pub fn start(
        &mut self,
        conversation: &str,
        amount: f64,
        description: &str,
        now: DateTime<Utc>,
    ) -> Option<PendingTransfer> {
        self.entries
            .insert(
                conversation.to_string(),
                PendingTransfer {
                    amount,
                    description: description.to_string(),
                    created_at: now,
                },
            )
            .filter(|prior| !self.expired(prior, now))
    }

    /// Consume the pending entry for `conversation` with the user's choice.
    pub fn resolve(&mut self, conversation: &str, choice: &str, now: DateTime<Utc>) -> Resolution {
        let Some(entry) = self.entries.remove(conversation) else {
            return Resolution::Stale;
        };
        if self.expired(&entry, now) {
            return Resolution::Stale;
        }
        if choice == "ignore" {
            return Resolution::Ignored;
        }
        Resolution::Record {
            amount: entry.amount,
            description: entry.description,
            category: choice_category(choice).to_string(),
            note: format!("classified as {choice}"),
        }
    }

    /// Live entry for `conversation`, evicting it first if it expired.
    pub fn pending(&mut self, conversation: &str, now: DateTime<Utc>) -> Option<&PendingTransfer> {
        let expired = match self.entries.get(conversation) {
            Some(entry) => self.expired(entry, now),
            None => return None,
        };
        if expired {
            self.entries.remove(conversation);
            return None;
        }
        self.entries.get(conversation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn expired(&self, entry: &PendingTransfer, now: DateTime<Utc>) -> bool {
        now - entry.created_at > self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap()
    }

    #[test]
    fn resolve_maps_choice_to_category_and_note() {
        let mut store = PendingStore::with_default_ttl();
        store.start("chat-1", 300.0, "bit to Dana", now());
        let res = store.resolve("chat-1", "gift", now());
        assert_eq!(
            res,
            Resolution::Record {
                amount: 300.0,
                description: "bit to Dana".to_string(),
                category: "Gifts".to_string(),
                note: "classified as gift".to_string(),
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn unmapped_choice_falls_back_to_transfer_category() {
        let mut store = PendingStore::with_default_ttl();
        store.start("chat-1", 50.0, "paybox", now());
        match store.resolve("chat-1", "expense", now()) {
            Resolution::Record { category, .. } => assert_eq!(category, TRANSFER_CATEGORY),
            other => panic!("expected Record, got {other:?}"),
        }

        store.start("chat-1", 50.0, "paybox", now());
        match store.resolve("chat-1", "something-new", now()) {
            Resolution::Record { category, .. } => assert_eq!(category, TRANSFER_CATEGORY),
            other => panic!("expected Record, got {other:?}"),
        }
    }

    #[test]
    fn ignore_consumes_without_recording() {
        let mut store = PendingStore::with_default_ttl();
        store.start("chat-1", 120.0, "venmo", now());
        assert_eq!(store.resolve("chat-1", "ignore", now()), Resolution::Ignored);
        assert!(store.is_empty());
    }

    #[test]
    fn double_resolution_is_stale() {
        let mut store = PendingStore::with_default_ttl();
        store.start("chat-1", 120.0, "venmo", now());
        assert!(matches!(store.resolve("chat-1", "savings", now()), Resolution::Record { .. }));
        // The double-tap: entry already consumed.
        assert_eq!(store.resolve("chat-1", "savings", now()), Resolution::Stale);
    }

    #[test]
    fn unknown_conversation_is_stale() {
        let mut store = PendingStore::with_default_ttl();
        assert_eq!(store.resolve("nobody", "gift", now()), Resolution::Stale);
    }

    #[test]
    fn reentry_overwrites_and_returns_the_dropped_entry() {
        let mut store = PendingStore::with_default_ttl();
        assert!(store.start("chat-1", 100.0, "bit to Dana", now()).is_none());
        let dropped = store.start("chat-1", 200.0, "bit to Yoav", now()).unwrap();
        assert_eq!(dropped.amount, 100.0);
        assert_eq!(store.len(), 1);

        match store.resolve("chat-1", "expense", now()) {
            Resolution::Record { amount, .. } => assert_eq!(amount, 200.0),
            other => panic!("expected Record, got {other:?}"),
        }
    }

    #[test]
    fn conversations_do_not_share_entries() {
        let mut store = PendingStore::with_default_ttl();
        store.start("chat-1", 100.0, "bit", now());
        store.start("chat-2", 200.0, "paybox", now());
        assert!(matches!(store.resolve("chat-1", "gift", now()), Resolution::Record { .. }));
        assert_eq!(store.len(), 1);
        assert!(matches!(store.resolve("chat-2", "gift", now()), Resolution::Record { .. }));
    }

    #[test]
    fn expired_entry_resolves_stale_and_is_evicted() {
        let mut store = PendingStore::new(Duration::minutes(30));
        store.start("chat-1", 100.0, "bit", now());
        let later = now() + Duration::minutes(31);
        assert_eq!(store.resolve("chat-1", "gift", later), Resolution::Stale);
        assert!(store.is_empty());
    }

    #[test]
    fn entry_at_exact_ttl_is_still_live() {
        let mut store = PendingStore::new(Duration::minutes(30));
        store.start("chat-1", 100.0, "bit", now());
        let at_ttl = now() + Duration::minutes(30);
        assert!(matches!(store.resolve("chat-1", "gift", at_ttl), Resolution::Record { .. }));
    }

    #[test]
    fn pending_peek_evicts_expired_entries() {
        let mut store = PendingStore::new(Duration::minutes(30));
        store.start("chat-1", 100.0, "bit", now());
        assert!(store.pending("chat-1", now()).is_some());
        assert!(store.pending("chat-1", now() + Duration::hours(1)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn overwriting_an_expired_entry_returns_none() {
        let mut store = PendingStore::new(Duration::minutes(30));
        store.start("chat-1", 100.0, "bit", now());
        let later = now() + Duration::hours(2);
        // The stale entry is replaced, not reported as dropped.
        assert!(store.start("chat-1", 200.0, "paybox", later).is_none());
    }
}
