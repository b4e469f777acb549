//! Update dispatch: commands, free-text expense entry, transfer callbacks.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};

use cashflow_core::{
    build_anomaly_note, build_expense_confirmation, build_status_message,
    build_top_categories_message, build_transfer_prompt, build_transfer_recorded, compute_status,
    get_insight, is_anomaly, messages, parse_expense_message, today_in_tz, BudgetStatus,
    ExclusionFilter, PendingStore, Resolution, RuleSet, TransactionSink, TransactionSource,
    TRANSFER_OPTIONS,
};

use crate::config::Config;
use crate::ledger::JsonLedger;
use crate::telegram::{
    CallbackQuery, InlineKeyboardButton, Message, ReplyMarkup, TelegramClient, Update,
};

const START_TEXT: &str = "🚀 <b>CashFlow is live!</b>\n\n\
I'm your budget companion. Here's what I can do:\n\n\
💬 <b>Add an expense:</b> just type \"50 pizza\" or \"supermarket 120\"\n\
📊 /status — budget status\n\
🏷️ /top — spending by category\n\
📅 /month — monthly summary\n\
❓ /help — help";

const HELP_TEXT: &str = "📖 <b>How to use:</b>\n\n\
<b>Add a manual expense:</b>\n\
• \"50 pizza\" — adds ₪50, category: Dining Out\n\
• \"supermarket 120\" — adds ₪120, category: Groceries\n\
• \"200\" — adds ₪200, category: Other\n\n\
<b>Commands:</b>\n\
/status — how much did I spend? what's left?\n\
/top — breakdown by category\n\
/month — full current-month summary\n\
/help — this message\n\n\
💡 Peer transfers get an automatic clarification question";

/// The interactive bot: one long-poll loop, one authorized chat.
pub struct Bot {
    tg: TelegramClient,
    config: Config,
    ledger: JsonLedger,
    pending: PendingStore,
    rules: RuleSet,
    filter: ExclusionFilter,
    chat_id: i64,
}

impl Bot {
    pub fn new(config: Config) -> Result<Self> {
        config.validate_for_telegram()?;
        let tg = TelegramClient::new(&config.telegram.bot_token)?;
        let ledger = JsonLedger::open(config.ledger_path()?)?;
        let chat_id = config.chat_id()?;
        Ok(Self {
            tg,
            ledger,
            pending: PendingStore::with_default_ttl(),
            rules: crate::config::load_rules()?,
            filter: ExclusionFilter::builtin()?,
            chat_id,
            config,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        info!("bot running (long polling)");
        let mut offset = 0i64;
        loop {
            let updates = match self.tg.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("getUpdates failed: {e:#}");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    continue;
                }
            };
            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Err(e) = self.dispatch(update).await {
                    error!("update handling failed: {e:#}");
                }
            }
        }
    }

    async fn dispatch(&mut self, update: Update) -> Result<()> {
        if let Some(message) = update.message {
            if let Some(text) = message.text.clone() {
                return self.on_text(&message, text.trim()).await;
            }
            return Ok(());
        }
        if let Some(callback) = update.callback_query {
            return self.on_callback(callback).await;
        }
        Ok(())
    }

    fn authorized(&self, chat_id: i64) -> bool {
        chat_id == self.chat_id
    }

    async fn on_text(&mut self, message: &Message, text: &str) -> Result<()> {
        if !self.authorized(message.chat.id) {
            return Ok(());
        }

        match text {
            "/start" => {
                self.tg.send_message(self.chat_id, START_TEXT).await?;
            }
            "/help" => {
                self.tg.send_message(self.chat_id, HELP_TEXT).await?;
            }
            "/status" => {
                if let Some(status) = self.status_or_apologize().await? {
                    self.tg
                        .send_message(self.chat_id, &build_status_message(&status))
                        .await?;
                }
            }
            "/top" => {
                if let Some(status) = self.status_or_apologize().await? {
                    self.tg
                        .send_message(
                            self.chat_id,
                            &build_top_categories_message(&status.top_categories),
                        )
                        .await?;
                }
            }
            "/month" => {
                if let Some(status) = self.status_or_apologize().await? {
                    let mut msg = build_status_message(&status);
                    msg.push_str("\n\n");
                    msg.push_str(&build_top_categories_message(&status.top_categories));
                    self.tg.send_message(self.chat_id, &msg).await?;
                }
            }
            t if t.starts_with('/') => {
                self.tg
                    .send_message(self.chat_id, "Unknown command. Try /help")
                    .await?;
            }
            t => {
                self.on_expense_text(t).await?;
            }
        }
        Ok(())
    }

    /// Free-text path: parse, then either ask for clarification or record.
    async fn on_expense_text(&mut self, text: &str) -> Result<()> {
        let Some(parsed) = parse_expense_message(&self.rules, text) else {
            self.tg
                .send_message(self.chat_id, messages::MSG_NOT_UNDERSTOOD)
                .await?;
            return Ok(());
        };

        if parsed.is_ambiguous {
            let conversation = self.chat_id.to_string();
            if let Some(dropped) =
                self.pending
                    .start(&conversation, parsed.amount, &parsed.description, Utc::now())
            {
                warn!(
                    description = %dropped.description,
                    "pending transfer overwritten before resolution"
                );
            }
            self.tg
                .send_message_with_keyboard(
                    self.chat_id,
                    &build_transfer_prompt(parsed.amount, &parsed.description),
                    transfer_keyboard(),
                )
                .await?;
            return Ok(());
        }

        let today = today_in_tz(&self.config.budget.timezone)?;
        if let Err(e) = self.ledger.append_manual(
            today,
            &parsed.description,
            parsed.amount,
            &parsed.category,
            None,
        ) {
            error!("append failed: {e:#}");
            self.tg
                .send_message(self.chat_id, messages::MSG_SAVE_FAILED)
                .await?;
            return Ok(());
        }
        info!(amount = parsed.amount, category = %parsed.category, "manual expense recorded");

        // Status drives the insight; if it fails, the expense is already safe.
        let mut reply = match self.budget_status() {
            Ok(status) => {
                let insight = get_insight(&parsed.category, status.usage_percent);
                build_expense_confirmation(&parsed, insight.as_deref())
            }
            Err(e) => {
                warn!("status after append failed: {e:#}");
                build_expense_confirmation(&parsed, None)
            }
        };
        if is_anomaly(parsed.amount, self.config.budget.monthly) {
            reply.push_str(&build_anomaly_note(parsed.amount, self.config.budget.monthly));
        }
        self.tg.send_message(self.chat_id, &reply).await?;
        Ok(())
    }

    /// Transfer choice buttons.
    async fn on_callback(&mut self, callback: CallbackQuery) -> Result<()> {
        let chat_id = match callback.message.as_ref() {
            Some(message) => message.chat.id,
            None => {
                self.tg.answer_callback(&callback.id, None).await?;
                return Ok(());
            }
        };
        if !self.authorized(chat_id) {
            self.tg.answer_callback(&callback.id, None).await?;
            return Ok(());
        }

        let Some(choice) = callback
            .data
            .as_deref()
            .and_then(|d| d.strip_prefix("transfer_"))
        else {
            self.tg.answer_callback(&callback.id, None).await?;
            return Ok(());
        };

        let conversation = chat_id.to_string();
        match self.pending.resolve(&conversation, choice, Utc::now()) {
            Resolution::Stale => {
                self.tg
                    .answer_callback(&callback.id, Some(messages::MSG_CHOICE_EXPIRED))
                    .await?;
            }
            Resolution::Ignored => {
                self.tg.answer_callback(&callback.id, None).await?;
                self.replace_or_send(&callback, messages::MSG_TRANSFER_IGNORED)
                    .await?;
            }
            Resolution::Record {
                amount,
                description,
                category,
                note,
            } => {
                self.tg.answer_callback(&callback.id, None).await?;
                let today = today_in_tz(&self.config.budget.timezone)?;
                match self
                    .ledger
                    .append_manual(today, &description, amount, &category, Some(&note))
                {
                    Ok(()) => {
                        info!(amount, category = %category, "transfer resolved");
                        self.replace_or_send(
                            &callback,
                            &build_transfer_recorded(&description, amount, &category),
                        )
                        .await?;
                    }
                    Err(e) => {
                        error!("transfer save failed: {e:#}");
                        self.replace_or_send(&callback, messages::MSG_SAVE_FAILED)
                            .await?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Edit the prompt in place when possible, else send a fresh message.
    async fn replace_or_send(&self, callback: &CallbackQuery, text: &str) -> Result<()> {
        match callback.message.as_ref() {
            Some(message) => {
                self.tg
                    .edit_message_text(message.chat.id, message.message_id, text)
                    .await
            }
            None => self.tg.send_message(self.chat_id, text).await.map(|_| ()),
        }
    }

    fn budget_status(&self) -> Result<BudgetStatus> {
        let today = today_in_tz(&self.config.budget.timezone)?;
        let scraped = self.ledger.list_scraped().context("list scraped")?;
        let manual = self.ledger.list_manual().context("list manual")?;
        compute_status(
            &self.filter,
            &scraped,
            &manual,
            self.config.budget.monthly,
            today,
        )
    }

    async fn status_or_apologize(&mut self) -> Result<Option<BudgetStatus>> {
        match self.budget_status() {
            Ok(status) => Ok(Some(status)),
            Err(e) => {
                error!("status failed: {e:#}");
                self.tg
                    .send_message(self.chat_id, messages::MSG_STORE_ERROR)
                    .await?;
                Ok(None)
            }
        }
    }
}

/// Two-column inline keyboard over the fixed transfer choice set.
pub fn transfer_keyboard() -> ReplyMarkup {
    let inline_keyboard = TRANSFER_OPTIONS
        .chunks(2)
        .map(|row| {
            row.iter()
                .map(|option| InlineKeyboardButton {
                    text: option.label.to_string(),
                    callback_data: format!("transfer_{}", option.value),
                })
                .collect()
        })
        .collect();
    ReplyMarkup { inline_keyboard }
}
