//! Service layer for the menu sync application.
//!
//! This module contains the business logic for:
//! - Menu extraction from announcement text (`MenuExtractor`)
//! - The structured spreadsheet source (`SheetSource`)
//! - The announcement feed source (`FeedSource`)
//! - The static file fallback (`FileSource`)

mod extractor;
mod feed;
mod file;
mod sheet;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{MenuOrigin, MenuSnapshot};

pub use extractor::MenuExtractor;
pub use feed::FeedSource;
pub use file::FileSource;
pub use sheet::SheetSource;

/// A single origin capable of producing a menu snapshot.
///
/// Implementations are idempotent and bounded by the HTTP timeout; they
/// never call each other. The orchestrator owns the fallback chain and
/// tries sources strictly in priority order.
#[async_trait]
pub trait MenuSource: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Origin tag stamped on snapshots this source produces.
    fn origin(&self) -> MenuOrigin;

    /// Attempt to produce today's menu snapshot.
    async fn fetch(&self) -> Result<MenuSnapshot, FetchError>;
}
