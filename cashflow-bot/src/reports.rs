//! One-shot report commands: weekly digest, evening reminder, terminal status.
//! Cron (or the operator) invokes these; scheduling itself lives outside.

use anyhow::Result;
use tracing::info;

use cashflow_core::{
    build_reminder_message, build_weekly_message, compute_weekly, fmt_amount, today_in_tz,
    BudgetStatus, ExclusionFilter, TransactionSource,
};

use crate::config::Config;
use crate::ledger::JsonLedger;
use crate::telegram::TelegramClient;

pub async fn run_weekly(config: &Config) -> Result<()> {
    config.validate_for_telegram()?;
    let filter = ExclusionFilter::builtin()?;
    let ledger = JsonLedger::open(config.ledger_path()?)?;

    let today = today_in_tz(&config.budget.timezone)?;
    let week = compute_weekly(
        &filter,
        &ledger.list_scraped()?,
        &ledger.list_manual()?,
        config.budget.monthly,
        today,
    )?;

    let tg = TelegramClient::new(&config.telegram.bot_token)?;
    tg.send_message(config.chat_id()?, &build_weekly_message(&week))
        .await?;
    info!("weekly summary sent");
    Ok(())
}

pub async fn run_remind(config: &Config) -> Result<()> {
    config.validate_for_telegram()?;
    let status = load_status(config)?;

    let tg = TelegramClient::new(&config.telegram.bot_token)?;
    tg.send_message(config.chat_id()?, &build_reminder_message(&status))
        .await?;
    info!("evening reminder sent");
    Ok(())
}

pub fn print_status(config: &Config) -> Result<()> {
    let status = load_status(config)?;

    println!(
        "This month: ₪{} / ₪{} ({}%)",
        fmt_amount(status.total),
        fmt_amount(status.budget),
        status.usage_percent
    );
    println!("Remaining:  ₪{}", fmt_amount(status.remaining));
    println!("Days left:  {}", status.days_left);
    if status.daily_budget > 0.0 {
        println!("Daily:      ₪{}", fmt_amount(status.daily_budget));
    }
    if !status.top_categories.is_empty() {
        println!("\nBy category:");
        for bucket in &status.top_categories {
            println!("  {:<12} ₪{}", bucket.category, fmt_amount(bucket.amount));
        }
    }
    Ok(())
}

fn load_status(config: &Config) -> Result<BudgetStatus> {
    config.validate()?;
    let filter = ExclusionFilter::builtin()?;
    let ledger = JsonLedger::open(config.ledger_path()?)?;
    let today = today_in_tz(&config.budget.timezone)?;
    cashflow_core::compute_status(
        &filter,
        &ledger.list_scraped()?,
        &ledger.list_manual()?,
        config.budget.monthly,
        today,
    )
}
