//! Thin Telegram Bot API client: long polling, messages, inline keyboards.
//!
//! Only the handful of methods the bot needs; delivery retries and
//! webhooks are out of scope.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Long-poll wait passed to getUpdates, seconds.
const POLL_TIMEOUT_SECS: u64 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    client: reqwest::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Result<Self> {
        // The client must outlive the long-poll wait.
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(POLL_TIMEOUT_SECS + 20))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base: format!("{TELEGRAM_API}/bot{bot_token}"),
        })
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        #[derive(Serialize)]
        struct Req {
            offset: i64,
            timeout: u64,
            allowed_updates: &'static [&'static str],
        }

        self.call(
            "getUpdates",
            &Req {
                offset,
                timeout: POLL_TIMEOUT_SECS,
                allowed_updates: &["message", "callback_query"],
            },
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        self.send(chat_id, text, None).await
    }

    pub async fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: ReplyMarkup,
    ) -> Result<Message> {
        self.send(chat_id, text, Some(keyboard)).await
    }

    async fn send(&self, chat_id: i64, text: &str, markup: Option<ReplyMarkup>) -> Result<Message> {
        #[derive(Serialize)]
        struct Req<'a> {
            chat_id: i64,
            text: &'a str,
            parse_mode: &'static str,
            disable_web_page_preview: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            reply_markup: Option<ReplyMarkup>,
        }

        self.call(
            "sendMessage",
            &Req {
                chat_id,
                text,
                parse_mode: "HTML",
                disable_web_page_preview: true,
                reply_markup: markup,
            },
        )
        .await
    }

    pub async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        #[derive(Serialize)]
        struct Req<'a> {
            chat_id: i64,
            message_id: i64,
            text: &'a str,
            parse_mode: &'static str,
        }

        // Telegram returns the edited message; the caller never needs it.
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &Req {
                    chat_id,
                    message_id,
                    text,
                    parse_mode: "HTML",
                },
            )
            .await?;
        Ok(())
    }

    pub async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        #[derive(Serialize)]
        struct Req<'a> {
            callback_query_id: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            text: Option<&'a str>,
        }

        let _: bool = self
            .call(
                "answerCallbackQuery",
                &Req {
                    callback_query_id: callback_id,
                    text,
                },
            )
            .await?;
        Ok(())
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: for<'de> Deserialize<'de>,
    {
        let resp = self
            .client
            .post(format!("{}/{}", self.base, method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("telegram {method}"))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("telegram {method}: {status} {txt}");
        }

        let out: ApiResponse<T> = resp
            .json()
            .await
            .with_context(|| format!("parse telegram {method} response"))?;
        if !out.ok {
            bail!(
                "telegram {method}: {}",
                out.description.unwrap_or_else(|| "unknown error".to_string())
            );
        }
        out.result
            .ok_or_else(|| anyhow::anyhow!("telegram {method}: empty result"))
    }
}
