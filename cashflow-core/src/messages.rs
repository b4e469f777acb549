//! User-facing message content: thresholds, ordering and wording.
//!
//! Builders return Telegram-flavored HTML strings; delivery, retries and
//! keyboards belong to the transport layer.

use crate::budget::{BudgetStatus, CategoryTotal};
use crate::parser::ParsedExpense;
use crate::summary::WeeklySummary;
use crate::transaction::Transaction;

pub const MSG_NOT_UNDERSTOOD: &str =
    "🤔 I didn't get that. Send an amount plus a description, e.g. \"50 pizza\"";
pub const MSG_CHOICE_EXPIRED: &str = "⏰ That one expired, send it again";
pub const MSG_TRANSFER_IGNORED: &str = "🚫 Not counting that one.";
pub const MSG_NO_EXPENSES_YET: &str = "No expenses yet this month 🎉";
pub const MSG_STORE_ERROR: &str = "❌ Couldn't load the data. Try again.";
pub const MSG_SAVE_FAILED: &str = "❌ Couldn't save that. Try again.";

/// Whole-unit amount with thousands separators.
pub fn fmt_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let sign = if rounded < 0 { "-" } else { "" };
    let digits = rounded.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{sign}{out}")
}

fn usage_emoji(usage_percent: i64) -> &'static str {
    if usage_percent <= 70 {
        "🟢"
    } else if usage_percent <= 90 {
        "🟡"
    } else if usage_percent <= 100 {
        "🟠"
    } else {
        "🔴"
    }
}

/// The /status block.
pub fn build_status_message(status: &BudgetStatus) -> String {
    let mut msg = format!("{} <b>Budget status:</b>\n\n", usage_emoji(status.usage_percent));
    msg.push_str(&format!(
        "💰 Spent: <b>₪{}</b> / ₪{}\n",
        fmt_amount(status.total),
        fmt_amount(status.budget)
    ));
    msg.push_str(&format!("📊 Usage: <b>{}%</b>\n", status.usage_percent));
    msg.push_str(&format!("💵 Remaining: ₪{}\n", fmt_amount(status.remaining)));
    msg.push_str(&format!("📅 Days left this month: {}\n", status.days_left));

    if status.daily_budget > 0.0 {
        msg.push_str(&format!(
            "\n🎯 <b>Suggested daily budget: ₪{}</b>",
            fmt_amount(status.daily_budget)
        ));
    }

    msg
}

/// The /top block: ten-cell usage bars for the top categories.
pub fn build_top_categories_message(categories: &[CategoryTotal]) -> String {
    if categories.is_empty() {
        return MSG_NO_EXPENSES_YET.to_string();
    }

    let total: f64 = categories.iter().map(|c| c.amount).sum();
    let mut msg = String::from("📊 <b>Spending by category:</b>\n\n");

    for bucket in categories.iter().take(8) {
        let pct = (bucket.amount / total * 100.0).round() as i64;
        let filled = ((pct as f64 / 10.0).round() as usize).max(1);
        let bar: String = "█".repeat(filled.min(10)) + &"░".repeat(10usize.saturating_sub(filled));
        msg.push_str(&format!(
            "{bar} {}: ₪{} ({pct}%)\n",
            bucket.category,
            fmt_amount(bucket.amount)
        ));
    }

    msg
}

/// Confirmation for a directly recorded expense.
pub fn build_expense_confirmation(expense: &ParsedExpense, insight: Option<&str>) -> String {
    let mut msg = String::from("✅ <b>Recorded!</b>\n\n");
    msg.push_str(&format!("📝 {}\n", expense.description));
    msg.push_str(&format!("💰 ₪{}\n", fmt_amount(expense.amount)));
    msg.push_str(&format!("🏷️ {}", expense.category));

    if let Some(insight) = insight {
        msg.push_str(&format!("\n\n💡 {insight}"));
    }

    msg
}

/// Footnote for an unusually large single expense.
pub fn build_anomaly_note(amount: f64, budget: f64) -> String {
    let share = (amount / budget * 100.0).round() as i64;
    format!("\n\n⚡ Big one! That's {share}% of the monthly budget")
}

/// Prompt shown with the transfer choice keyboard.
pub fn build_transfer_prompt(amount: f64, description: &str) -> String {
    format!(
        "🔄 A transfer of <b>₪{}</b> — {description}\n\nWhat kind of expense is this?",
        fmt_amount(amount)
    )
}

/// Replacement text once a transfer choice has been recorded.
pub fn build_transfer_recorded(description: &str, amount: f64, category: &str) -> String {
    format!(
        "✅ Recorded: {description} — ₪{} ({category})",
        fmt_amount(amount)
    )
}

/// Post-sync report: new charges first, then the month status.
pub fn build_sync_message(new_transactions: &[Transaction], status: &BudgetStatus) -> String {
    let mut msg = String::new();

    if !new_transactions.is_empty() {
        msg.push_str(&format!(
            "💳 <b>{} new charges:</b>\n\n",
            new_transactions.len()
        ));
        for txn in new_transactions.iter().take(8) {
            msg.push_str(&format!(
                "• {} — ₪{}\n",
                txn.description,
                fmt_amount(txn.amount)
            ));
        }
        if new_transactions.len() > 8 {
            msg.push_str(&format!("   ...and {} more\n", new_transactions.len() - 8));
        }
        msg.push('\n');
    }

    msg.push_str(&format!(
        "{} <b>This month:</b>\n",
        usage_emoji(status.usage_percent)
    ));
    msg.push_str(&format!("   Spent: <b>₪{}</b>\n", fmt_amount(status.total)));
    msg.push_str(&format!("   Target: ₪{}\n", fmt_amount(status.budget)));
    msg.push_str(&format!("   Remaining: ₪{}\n", fmt_amount(status.remaining)));
    msg.push_str(&format!("   Usage: {}%", status.usage_percent));

    if status.usage_percent >= 100 {
        msg.push_str("\n\n🚨 <b>Over budget!</b>");
    } else if status.usage_percent >= 90 {
        msg.push_str("\n\n⚠️ <b>Heads up!</b> Closing in on the budget limit!");
    }

    msg
}

/// The weekly digest.
pub fn build_weekly_message(week: &WeeklySummary) -> String {
    let mut msg = String::from("📊 <b>Weekly summary</b>\n\n");
    msg.push_str(&format!(
        "💰 Spent this week: <b>₪{}</b>\n",
        fmt_amount(week.week_total)
    ));
    msg.push_str(&format!(
        "📅 Spent this month: <b>₪{}</b>\n",
        fmt_amount(week.month_total)
    ));
    msg.push_str(&format!("🎯 Remaining: ₪{}\n", fmt_amount(week.remaining)));
    msg.push_str(&format!("📝 {} charges this week\n\n", week.week_count));

    if !week.top_categories.is_empty() {
        msg.push_str("<b>Top categories:</b>\n");
        for bucket in week.top_categories.iter().take(5) {
            msg.push_str(&format!(
                "   {}: ₪{}\n",
                bucket.category,
                fmt_amount(bucket.amount)
            ));
        }
    }

    msg.push_str(&format!(
        "\n💡 <b>{} days left this month</b>",
        week.days_left
    ));
    if week.daily_budget > 0.0 {
        msg.push_str(&format!(
            "\n   Suggested daily budget: ₪{}",
            fmt_amount(week.daily_budget)
        ));
    }

    msg
}

/// The evening nudge asking about cash spending.
pub fn build_reminder_message(status: &BudgetStatus) -> String {
    let mut msg = String::from("🌙 <b>Good evening!</b>\n\n");
    msg.push_str("Any cash spending today?\n");
    msg.push_str("Just tell me, e.g. \"50 pizza\"\n\n");
    msg.push_str(&format!(
        "📊 So far: ₪{} / ₪{} ({}%)",
        fmt_amount(status.total),
        fmt_amount(status.budget),
        status.usage_percent
    ));

    if status.daily_budget > 0.0 {
        msg.push_str(&format!(
            "\n🎯 Daily budget: ₪{}",
            fmt_amount(status.daily_budget)
        ));
    }

    msg
}
