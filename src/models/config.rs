//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Refresh cadence and freshness rules
    #[serde(default)]
    pub sync: SyncConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Remote structured source (spreadsheet-style API)
    #[serde(default)]
    pub sheet: SheetConfig,

    /// Announcement feed source
    #[serde(default)]
    pub feed: FeedConfig,

    /// Text-understanding extraction service
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Static fallback file
    #[serde(default)]
    pub fallback: FallbackConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.sync.ttl_minutes == 0 {
            return Err(AppError::validation("sync.ttl_minutes must be > 0"));
        }
        if self.sync.interval_minutes == 0 {
            return Err(AppError::validation("sync.interval_minutes must be > 0"));
        }
        if !(-12..=14).contains(&self.sync.utc_offset_hours) {
            return Err(AppError::validation(
                "sync.utc_offset_hours must be between -12 and 14",
            ));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.feed.username.trim().is_empty() {
            return Err(AppError::validation("feed.username is empty"));
        }
        if self.feed.max_results == 0 {
            return Err(AppError::validation("feed.max_results must be > 0"));
        }
        if self.extractor.model.trim().is_empty() {
            return Err(AppError::validation("extractor.model is empty"));
        }
        if self.fallback.path.trim().is_empty() {
            return Err(AppError::validation("fallback.path is empty"));
        }
        Ok(())
    }
}

/// Refresh cadence and freshness rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Freshness cache time-to-live in minutes
    #[serde(default = "defaults::ttl_minutes")]
    pub ttl_minutes: u64,

    /// Scheduled refresh interval in minutes
    #[serde(default = "defaults::interval_minutes")]
    pub interval_minutes: u64,

    /// UTC offset of the shop's local day (JST = 9)
    #[serde(default = "defaults::utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: defaults::ttl_minutes(),
            interval_minutes: defaults::interval_minutes(),
            utc_offset_hours: defaults::utc_offset_hours(),
        }
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Remote structured source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Base URL of the values API
    #[serde(default = "defaults::sheet_api_base")]
    pub api_base: String,

    /// Spreadsheet identifier
    #[serde(default)]
    pub sheet_id: String,

    /// Cell range holding the menu rows
    #[serde(default = "defaults::sheet_range")]
    pub range: String,

    /// Environment variable holding the API key
    #[serde(default = "defaults::sheet_api_key_env")]
    pub api_key_env: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::sheet_api_base(),
            sheet_id: String::new(),
            range: defaults::sheet_range(),
            api_key_env: defaults::sheet_api_key_env(),
        }
    }
}

/// Announcement feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the feed API
    #[serde(default = "defaults::feed_api_base")]
    pub api_base: String,

    /// Account to read announcements from
    #[serde(default = "defaults::feed_username")]
    pub username: String,

    /// Marker a same-day post must contain to count as today's menu
    #[serde(default = "defaults::today_marker")]
    pub today_marker: String,

    /// How many recent posts to consider
    #[serde(default = "defaults::max_results")]
    pub max_results: u32,

    /// Environment variable holding the bearer token
    #[serde(default = "defaults::feed_token_env")]
    pub bearer_token_env: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::feed_api_base(),
            username: defaults::feed_username(),
            today_marker: defaults::today_marker(),
            max_results: defaults::max_results(),
            bearer_token_env: defaults::feed_token_env(),
        }
    }
}

/// Text-understanding extraction service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Base URL of the chat-completions API
    #[serde(default = "defaults::extractor_api_base")]
    pub api_base: String,

    /// Model identifier
    #[serde(default = "defaults::extractor_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "defaults::extractor_temperature")]
    pub temperature: f32,

    /// Response token cap
    #[serde(default = "defaults::extractor_max_tokens")]
    pub max_tokens: u32,

    /// Environment variable holding the API key
    #[serde(default = "defaults::extractor_api_key_env")]
    pub api_key_env: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::extractor_api_base(),
            model: defaults::extractor_model(),
            temperature: defaults::extractor_temperature(),
            max_tokens: defaults::extractor_max_tokens(),
            api_key_env: defaults::extractor_api_key_env(),
        }
    }
}

/// Static fallback file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Path to the flattened menu JSON file
    #[serde(default = "defaults::fallback_path")]
    pub path: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            path: defaults::fallback_path(),
        }
    }
}

mod defaults {
    // Sync defaults
    pub fn ttl_minutes() -> u64 {
        30
    }
    pub fn interval_minutes() -> u64 {
        30
    }
    pub fn utc_offset_hours() -> i32 {
        9
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; menu-sync/1.0)".into()
    }
    pub fn timeout() -> u64 {
        10
    }

    // Sheet defaults
    pub fn sheet_api_base() -> String {
        "https://sheets.googleapis.com/v4/spreadsheets".into()
    }
    pub fn sheet_range() -> String {
        "Sheet1!A1:J10".into()
    }
    pub fn sheet_api_key_env() -> String {
        "SHEETS_API_KEY".into()
    }

    // Feed defaults
    pub fn feed_api_base() -> String {
        "https://api.twitter.com/2".into()
    }
    pub fn feed_username() -> String {
        "okazunoharmony".into()
    }
    pub fn today_marker() -> String {
        "本日".into()
    }
    pub fn max_results() -> u32 {
        5
    }
    pub fn feed_token_env() -> String {
        "TWITTER_BEARER_TOKEN".into()
    }

    // Extractor defaults
    pub fn extractor_api_base() -> String {
        "https://api.openai.com/v1".into()
    }
    pub fn extractor_model() -> String {
        "gpt-4o-mini".into()
    }
    pub fn extractor_temperature() -> f32 {
        0.3
    }
    pub fn extractor_max_tokens() -> u32 {
        500
    }
    pub fn extractor_api_key_env() -> String {
        "OPENAI_API_KEY".into()
    }

    // Fallback defaults
    pub fn fallback_path() -> String {
        "menu-data.json".into()
    }
}
