use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub recency: RecencyConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    /// Write logs here instead of stderr.
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub url: String,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

fn default_keywords() -> Vec<String> {
    [
        "gen ai",
        "generative ai",
        "artificial intelligence",
        "machine learning",
        "data scientist",
        "ai engineer",
        "ml engineer",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecencyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_recency_markers")]
    pub markers: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_recency_markers() -> Vec<String> {
    ["hour ago", "hours ago", "today", "just now", "yesterday", "1 day ago"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            markers: default_recency_markers(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_source_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
    /// Tried in order; the first selector that matches any card wins.
    #[serde(default = "default_card_selectors")]
    pub card_selectors: Vec<String>,
    #[serde(default = "default_title_selector")]
    pub title_selector: String,
    #[serde(default = "default_age_selector")]
    pub age_selector: String,
}

fn default_source_timeout() -> u64 { 30_000 }

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_card_selectors() -> Vec<String> {
    ["article.jobTuple", "div.jobTuple", "div.cust-job-tuple"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_title_selector() -> String {
    "a.title".to_string()
}

fn default_age_selector() -> String {
    "span.job-post-day".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_source_timeout(),
            user_agents: default_user_agents(),
            card_selectors: default_card_selectors(),
            title_selector: default_title_selector(),
            age_selector: default_age_selector(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("sent_jobs.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self { api_base: default_telegram_api() }
    }
}

/// Randomized delays between outbound actions. Zero bounds disable pacing.
#[derive(Debug, Deserialize, Clone)]
pub struct PacingConfig {
    #[serde(default = "default_send_min")]
    pub send_min_ms: u64,
    #[serde(default = "default_send_max")]
    pub send_max_ms: u64,
    #[serde(default = "default_fetch_min")]
    pub fetch_min_ms: u64,
    #[serde(default = "default_fetch_max")]
    pub fetch_max_ms: u64,
}

fn default_send_min() -> u64 { 1000 }
fn default_send_max() -> u64 { 3000 }
fn default_fetch_min() -> u64 { 3000 }
fn default_fetch_max() -> u64 { 7000 }

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            send_min_ms: default_send_min(),
            send_max_ms: default_send_max(),
            fetch_min_ms: default_fetch_min(),
            fetch_max_ms: default_fetch_max(),
        }
    }
}

impl PacingConfig {
    /// No delays at all. Used by tests and dry runs.
    pub fn none() -> Self {
        Self {
            send_min_ms: 0,
            send_max_ms: 0,
            fetch_min_ms: 0,
            fetch_max_ms: 0,
        }
    }
}

/// Credentials for the Telegram bot that delivers alerts.
#[derive(Debug, Clone)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.search.url.trim().is_empty() {
            anyhow::bail!("search.url cannot be empty");
        }
        if self.search.keywords.iter().any(|k| k.trim().is_empty()) {
            anyhow::bail!("search.keywords cannot contain blank entries (they would match every title)");
        }
        if self.recency.markers.iter().any(|m| m.trim().is_empty()) {
            anyhow::bail!("recency.markers cannot contain blank entries (they would mark every listing recent)");
        }
        if self.source.card_selectors.is_empty() {
            anyhow::bail!("source.card_selectors needs at least one selector");
        }
        if self.pacing.send_min_ms > self.pacing.send_max_ms
            || self.pacing.fetch_min_ms > self.pacing.fetch_max_ms
        {
            anyhow::bail!("pacing minimums must not exceed maximums");
        }
        Ok(())
    }

    /// Pull the Telegram credentials out of .env. Real env vars take precedence
    /// and any other keys in the file are ignored.
    pub fn load_env_file() {
        let content = match std::fs::read_to_string(ENV_FILE) {
            Ok(c) => c,
            Err(_) => return,
        };
        for (key, value) in credential_entries(&content) {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// Bot token and chat id come from environment variables, or prompted at startup.
    /// Prompted values are saved to .env for future runs.
    pub fn telegram_credentials() -> Result<TelegramCredentials> {
        Ok(TelegramCredentials {
            bot_token: Self::telegram_bot_token()?,
            chat_id: credential_or_prompt(CHAT_ID_VAR, "Telegram chat id")?,
        })
    }

    pub fn telegram_bot_token() -> Result<String> {
        credential_or_prompt(BOT_TOKEN_VAR, "Telegram bot token (from BotFather)")
    }
}

const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";
const CREDENTIAL_VARS: [&str; 2] = [BOT_TOKEN_VAR, CHAT_ID_VAR];

/// Credential assignments found in .env content, in file order.
fn credential_entries(content: &str) -> Vec<(&'static str, String)> {
    content
        .lines()
        .filter_map(|line| {
            let (key, value) = clean_credential(line).split_once('=')?;
            let key = CREDENTIAL_VARS.iter().find(|v| **v == key.trim())?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            Some((*key, value.to_string()))
        })
        .collect()
}

/// Drop BOMs, zero-width spaces and CRs that editors and copy-paste leave behind.
fn clean_credential(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}' || c == '\u{200b}')
}

fn credential_or_prompt(var: &str, label: &str) -> Result<String> {
    if let Ok(value) = std::env::var(var) {
        let value = clean_credential(&value);
        if !value.is_empty() {
            return Ok(value.to_string());
        }
    }

    print!("  {} > ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let value = clean_credential(&input).to_string();
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty ({} not set)", label, var);
    }

    std::env::set_var(var, &value);
    let existing = std::fs::read_to_string(ENV_FILE).unwrap_or_default();
    if let Err(e) = std::fs::write(ENV_FILE, upsert_env_line(&existing, var, &value)) {
        tracing::warn!(error = %e, "could not persist {} to .env", var);
    }
    Ok(value)
}

/// Set `key=value` in .env content, replacing an earlier assignment of the same key.
fn upsert_env_line(contents: &str, key: &str, value: &str) -> String {
    let mut out: String = contents
        .lines()
        .filter(|line| {
            clean_credential(line)
                .split_once('=')
                .map_or(true, |(k, _)| k.trim() != key)
        })
        .flat_map(|line| [line, "\n"])
        .collect();
    out.push_str(&format!("{}={}\n", key, value));
    out
}
