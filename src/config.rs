// src/config.rs

//! Configuration loading utilities.
//!
//! The config file is TOML; credentials never live in it. Each source
//! names the environment variable holding its secret.

use crate::models::Config;

/// Secrets resolved from the environment at startup.
///
/// A missing variable is logged and left empty; the affected source then
/// fails at fetch time and the chain falls through to the next one, so a
/// partially configured deployment still serves the fallback file.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub sheet_api_key: String,
    pub feed_bearer_token: String,
    pub extractor_api_key: String,
}

impl Secrets {
    /// Read the variables named by the config.
    pub fn from_env(config: &Config) -> Self {
        Self {
            sheet_api_key: read_var(&config.sheet.api_key_env),
            feed_bearer_token: read_var(&config.feed.bearer_token_env),
            extractor_api_key: read_var(&config.extractor.api_key_env),
        }
    }
}

fn read_var(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            log::warn!("Environment variable {name} is not set; dependent source will fail");
            String::new()
        }
    }
}
