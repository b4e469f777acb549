//! Bot configuration: `~/.cashflow/config.toml` with env overrides for
//! secrets. A non-positive budget ceiling is a startup error, never a
//! default the aggregation would mask.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_cashflow_home;

pub const ENV_BOT_TOKEN: &str = "CASHFLOW_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "CASHFLOW_CHAT_ID";
pub const ENV_MONTHLY_BUDGET: &str = "CASHFLOW_MONTHLY_BUDGET";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub telegram: TelegramSection,
    pub budget: BudgetSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramSection {
    /// Usually left empty here and supplied via CASHFLOW_BOT_TOKEN.
    #[serde(default)]
    pub bot_token: String,
    /// The single authorized chat.
    #[serde(default)]
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSection {
    /// Monthly ceiling in whole currency units.
    pub monthly: f64,
    /// IANA timezone used to resolve "today".
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageSection {
    /// Ledger file; defaults to `~/.cashflow/ledger.json`.
    pub ledger: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramSection::default(),
            budget: BudgetSection {
                monthly: 3000.0,
                timezone: "Asia/Jerusalem".to_string(),
            },
            storage: StorageSection::default(),
        }
    }
}

impl Config {
    pub fn ledger_path(&self) -> Result<PathBuf> {
        match &self.storage.ledger {
            Some(path) => Ok(path.clone()),
            None => Ok(ensure_cashflow_home()?.join("ledger.json")),
        }
    }

    pub fn chat_id(&self) -> Result<i64> {
        self.telegram
            .chat_id
            .parse()
            .with_context(|| format!("telegram.chat_id must be numeric, got '{}'", self.telegram.chat_id))
    }

    /// The ceiling and timezone every command needs.
    pub fn validate(&self) -> Result<()> {
        if self.budget.monthly <= 0.0 {
            bail!(
                "budget.monthly must be positive (got {}); fix {} or {}",
                self.budget.monthly,
                config_path()?.display(),
                ENV_MONTHLY_BUDGET
            );
        }
        cashflow_core::today_in_tz(&self.budget.timezone)
            .with_context(|| format!("budget.timezone '{}' is not a valid IANA zone", self.budget.timezone))?;
        Ok(())
    }

    /// Everything the Telegram-facing commands need on top of `validate`.
    pub fn validate_for_telegram(&self) -> Result<()> {
        self.validate()?;
        let mut missing = Vec::new();
        if self.telegram.bot_token.is_empty() {
            missing.push(format!("telegram.bot_token (or {ENV_BOT_TOKEN})"));
        }
        if self.telegram.chat_id.is_empty() {
            missing.push(format!("telegram.chat_id (or {ENV_CHAT_ID})"));
        }
        if !missing.is_empty() {
            bail!("missing configuration: {}", missing.join(", "));
        }
        self.chat_id()?;
        Ok(())
    }

    /// Env vars win over the file so tokens can stay out of it.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(token) = std::env::var(ENV_BOT_TOKEN) {
            self.telegram.bot_token = token;
        }
        if let Ok(chat_id) = std::env::var(ENV_CHAT_ID) {
            self.telegram.chat_id = chat_id;
        }
        if let Ok(budget) = std::env::var(ENV_MONTHLY_BUDGET) {
            self.budget.monthly = budget
                .parse()
                .with_context(|| format!("{ENV_MONTHLY_BUDGET} must be a number, got '{budget}'"))?;
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_cashflow_home()?.join("config.toml"))
}

/// Category rules, user-tunable: `~/.cashflow/rules.json` holds an ordered
/// array of `[pattern, category]` pairs and replaces the built-in table
/// wholesale when present.
pub fn load_rules() -> Result<cashflow_core::RuleSet> {
    let path = ensure_cashflow_home()?.join("rules.json");
    if !path.exists() {
        return cashflow_core::RuleSet::builtin();
    }
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let pairs: Vec<(String, String)> =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    cashflow_core::RuleSet::from_pairs(pairs.iter().map(|(p, c)| (p.as_str(), c.as_str())))
}

pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    let mut config = if path.exists() {
        let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str(&raw).context("parse config.toml")?
    } else {
        Config::default()
    };
    config.apply_env_overrides()?;
    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path()?;
    let raw = toml::to_string_pretty(config).context("serialize config")?;
    fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let path = config_path()?;
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", path.display());
    println!("Set {ENV_BOT_TOKEN} and telegram.chat_id before running the bot.");
    Ok(())
}
