// src/lib.rs

//! Menu Sync Library
//!
//! Keeps the daily bento menu display synchronized with upstream
//! announcements: structured spreadsheet rows, free-text feed posts run
//! through an extractor, and a static fallback file, with a freshness
//! cache and a durable last-known-good store in between.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
