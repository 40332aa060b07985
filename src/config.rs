//! Process configuration read from the environment

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
const DEFAULT_LOOKUP_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Smallest catalog that yields a full four-choice round
pub const DEFAULT_MIN_CATALOG_SIZE: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("VOCAB_BOT_TOKEN is not set")]
    MissingToken,
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Reserved command keywords. Matched verbatim against incoming text in
/// every session phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keywords {
    pub add_word: String,
    pub delete_word: String,
    pub next: String,
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            add_word: "Добавить слово ➕".to_string(),
            delete_word: "Удалить слово🔙".to_string(),
            next: "Дальше ⏭".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub telegram_api: String,
    pub db_path: PathBuf,
    pub lookup_url: String,
    pub store_timeout: Duration,
    pub lookup_timeout: Duration,
    pub poll_timeout: Duration,
    pub min_catalog_size: usize,
    pub keywords: Keywords,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = var("VOCAB_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let db_path = var("VOCAB_DB_PATH").map_or_else(
            || {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".vocab-trainer").join("vocab.db")
            },
            PathBuf::from,
        );

        let defaults = Keywords::default();
        let keywords = Keywords {
            add_word: var("VOCAB_KEYWORD_ADD").unwrap_or(defaults.add_word),
            delete_word: var("VOCAB_KEYWORD_DELETE").unwrap_or(defaults.delete_word),
            next: var("VOCAB_KEYWORD_NEXT").unwrap_or(defaults.next),
        };

        let min_catalog_size = parse_number(&var, "VOCAB_MIN_CATALOG_SIZE")?
            .map_or(DEFAULT_MIN_CATALOG_SIZE, |n| usize::try_from(n).unwrap_or(usize::MAX))
            .max(1);

        Ok(Self {
            bot_token,
            telegram_api: var("VOCAB_TELEGRAM_API").unwrap_or_else(|| DEFAULT_TELEGRAM_API.to_string()),
            db_path,
            lookup_url: var("VOCAB_LOOKUP_URL").unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string()),
            store_timeout: Duration::from_millis(
                parse_number(&var, "VOCAB_STORE_TIMEOUT_MS")?.unwrap_or(DEFAULT_STORE_TIMEOUT_MS),
            ),
            lookup_timeout: Duration::from_millis(
                parse_number(&var, "VOCAB_LOOKUP_TIMEOUT_MS")?.unwrap_or(DEFAULT_LOOKUP_TIMEOUT_MS),
            ),
            poll_timeout: Duration::from_secs(
                parse_number(&var, "VOCAB_POLL_TIMEOUT_SECS")?.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
            ),
            min_catalog_size,
            keywords,
        })
    }
}

fn parse_number(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match var(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var: name, value }),
    }
}
