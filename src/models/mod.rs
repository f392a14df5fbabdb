// src/models/mod.rs

//! Domain models for the menu sync application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod menu;

// Re-export all public types
pub use config::{
    Config, ExtractorConfig, FallbackConfig, FeedConfig, HttpConfig, SheetConfig, SyncConfig,
};
pub use menu::{parse_price, MenuItem, MenuOrigin, MenuPayload, MenuSnapshot, PayloadItem, Slot};
