//! Bot configuration loaded from environment variables (call `dotenvy::dotenv()` first).

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://topicbot.db";
pub const DEFAULT_LOG_FILE: &str = "logs/topicbot.log";
pub const DEFAULT_MAX_CONCURRENT_HANDLERS: usize = 10;
pub const DEFAULT_POLL_TIMEOUT_SECS: u32 = 30;

/// Margin between the long-poll timeout and the HTTP client timeout.
const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 10;

pub struct BotConfig {
    pub bot_token: String,
    /// Optional Telegram Bot API base URL (`TELEGRAM_API_URL` or `TELOXIDE_API_URL`);
    /// points the bot at a local Bot API server or a mock server in tests.
    pub telegram_api_url: Option<String>,
    pub database_url: String,
    pub log_file: String,
    /// Bot owner, treated as admin in every chat.
    pub admin_user_id: Option<i64>,
    pub max_concurrent_handlers: usize,
    pub poll_timeout_secs: u32,
}

/// `DATABASE_URL`, or the default SQLite file.
pub fn database_url_from_env() -> String {
    env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} is set but not valid: {}", name, value)),
        Err(_) => Ok(None),
    }
}

impl BotConfig {
    /// Loads config from the environment. `token` overrides `BOT_TOKEN`.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").context("BOT_TOKEN not set")?,
        };
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

        Ok(Self {
            bot_token,
            telegram_api_url,
            database_url: database_url_from_env(),
            log_file,
            admin_user_id: parse_var("ADMIN_USER_ID")?,
            max_concurrent_handlers: parse_var("MAX_CONCURRENT_HANDLERS")?
                .unwrap_or(DEFAULT_MAX_CONCURRENT_HANDLERS),
            poll_timeout_secs: parse_var("POLL_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if self.max_concurrent_handlers == 0 {
            bail!("MAX_CONCURRENT_HANDLERS must be greater than 0");
        }
        Ok(())
    }

    pub fn api_url(&self) -> Result<Option<reqwest::Url>> {
        self.telegram_api_url
            .as_deref()
            .map(|url| reqwest::Url::parse(url).with_context(|| format!("invalid API URL: {}", url)))
            .transpose()
    }

    /// HTTP timeout for Bot API calls; outlasts one long-poll round.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_timeout_secs) + REQUEST_TIMEOUT_MARGIN_SECS)
    }
}
