//! cashflow-core: expense classification and budget reasoning for the CashFlow companion

pub mod budget;
pub mod insight;
pub mod messages;
pub mod parser;
pub mod pending;
pub mod rules;
pub mod store;
pub mod summary;
pub mod time;
pub mod transaction;

pub use budget::{compute_status, BudgetStatus, CategoryTotal};
pub use insight::{get_insight, get_insight_with, is_anomaly};
pub use messages::{
    build_anomaly_note, build_expense_confirmation, build_reminder_message, build_status_message,
    build_sync_message, build_top_categories_message, build_transfer_prompt,
    build_transfer_recorded, build_weekly_message, fmt_amount,
};
pub use parser::{parse_expense_message, ParsedExpense, MANUAL_EXPENSE_LABEL, MAX_EXPENSE_AMOUNT};
pub use pending::{
    choice_category, PendingStore, PendingTransfer, Resolution, TransferOption, TRANSFER_OPTIONS,
};
pub use rules::{CategoryRule, ExclusionFilter, RuleSet, FALLBACK_CATEGORY, TRANSFER_CATEGORY};
pub use store::{MemoryStore, TransactionSink, TransactionSource};
pub use summary::{compute_weekly, summarize_months, MonthSummary, WeeklySummary};
pub use time::{days_left_in_month, last_day_of_month, month_key, today_in_tz};
pub use transaction::{Source, Transaction};
