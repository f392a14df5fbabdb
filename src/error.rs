// src/error.rs

//! Unified error handling for the menu sync application.
//!
//! Per-concern error types (`FetchError`, `ExtractionError`, `StoreError`)
//! are consumed inside the pipeline; `AppError` is the outward-facing type
//! for configuration and CLI paths.

use thiserror::Error;

/// Result type alias for menu-sync operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of a single menu source.
///
/// These never escape the fallback chain; the orchestrator logs them and
/// moves on to the next source.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed or timed out
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream responded but the body did not match the expected shape
    #[error("Malformed response from {source_name}: {message}")]
    Malformed { source_name: String, message: String },

    /// The structured source has no row for today's date
    #[error("No menu row for {date}")]
    NoRowForToday { date: String },

    /// The announcement feed returned no posts at all
    #[error("No posts available for @{username}")]
    NoPosts { username: String },

    /// Fallback file missing or unreadable
    #[error("Fallback file error: {0}")]
    File(#[from] std::io::Error),

    /// Text extraction on the chosen announcement failed
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}

impl FetchError {
    /// Create a malformed-response error with the source name as context.
    pub fn malformed(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Malformed {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }
}

/// Failure of the text-understanding extraction step.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Extraction service unreachable or timed out
    #[error("Extraction service error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service replied but not in the three-slot schema
    #[error("Extraction response did not match the menu schema: {0}")]
    Schema(String),

    /// Service replied with a schema-shaped but entirely empty result
    #[error("Extraction produced no usable menu fields")]
    Empty,
}

/// Failure of the durable snapshot store.
///
/// Fatal for writes; reads degrade to "no data" at the orchestrator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored snapshot could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Source fetch failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Menu extraction failed
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Snapshot persistence failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP client construction or request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
