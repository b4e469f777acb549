//! Statement sync: ingest a card CSV, dedup, categorize, persist, report.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use cashflow_core::{
    build_sync_message, compute_status, summarize_months, today_in_tz, ExclusionFilter,
    Transaction, TransactionSource,
};
use cashflow_ingest::{filter_new, parse_card_csv};

use crate::config::Config;
use crate::ledger::JsonLedger;
use crate::telegram::TelegramClient;

pub async fn run_sync(config: &Config, csv_path: &Path, notify: bool) -> Result<()> {
    config.validate()?;
    if notify {
        config.validate_for_telegram()?;
    }

    let rules = crate::config::load_rules()?;
    let filter = ExclusionFilter::builtin()?;
    let mut ledger = JsonLedger::open(config.ledger_path()?)?;

    info!("parsing {}", csv_path.display());
    let records =
        parse_card_csv(csv_path).with_context(|| format!("parsing {}", csv_path.display()))?;
    let parsed = records.len();

    let fresh = filter_new(records, &ledger.identifiers());
    let new_transactions: Vec<Transaction> =
        fresh.iter().map(|r| r.to_transaction(&rules)).collect();
    let added = ledger.append_scraped(new_transactions.clone())?;
    info!(added, skipped = parsed - added, "statement rows appended");

    let recategorized = ledger.recategorize(&rules)?;
    if recategorized > 0 {
        info!(recategorized, "stored rows picked up improved rules");
    }

    let today = today_in_tz(&config.budget.timezone)?;
    let scraped = ledger.list_scraped()?;
    let manual = ledger.list_manual()?;
    let status = compute_status(&filter, &scraped, &manual, config.budget.monthly, today)?;

    println!(
        "Added {added} new transactions ({} already existed)",
        parsed - added
    );
    println!("\nMonth overview:");
    for row in summarize_months(&scraped, &manual, config.budget.monthly) {
        println!(
            "  {} | spent {:>8} | remaining {:>8} | {}",
            row.month,
            row.total,
            row.remaining,
            if row.on_budget { "on budget" } else { "over" }
        );
    }

    if notify {
        let tg = TelegramClient::new(&config.telegram.bot_token)?;
        tg.send_message(config.chat_id()?, &build_sync_message(&new_transactions, &status))
            .await?;
        info!("sync report sent");
    }

    Ok(())
}
