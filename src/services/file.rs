// src/services/file.rs

//! Static fallback file menu source.
//!
//! Reads a flattened menu JSON file (`date` + the three slots) from a
//! known location. Lowest priority in the chain; used when every remote
//! source is down.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FetchError;
use crate::models::{MenuOrigin, MenuPayload, MenuSnapshot};
use crate::services::MenuSource;
use crate::utils::local_midnight;

/// File-backed menu source.
pub struct FileSource {
    path: PathBuf,
    utc_offset_hours: i32,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, utc_offset_hours: i32) -> Self {
        Self {
            path: path.into(),
            utc_offset_hours,
        }
    }
}

#[async_trait]
impl MenuSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    fn origin(&self) -> MenuOrigin {
        MenuOrigin::LocalFile
    }

    async fn fetch(&self) -> Result<MenuSnapshot, FetchError> {
        let bytes = tokio::fs::read(&self.path).await?;

        let payload: MenuPayload = serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::malformed(self.name(), e))?;
        if payload.is_empty() {
            return Err(FetchError::malformed(
                self.name(),
                format!("{} has no usable slots", self.path.display()),
            ));
        }

        let fetched_at = Utc::now();
        let captured_at = payload
            .date
            .as_deref()
            .and_then(|date| parse_file_date(date, self.utc_offset_hours))
            .unwrap_or(fetched_at);

        Ok(payload.to_snapshot(captured_at, fetched_at, MenuOrigin::LocalFile, None))
    }
}

/// The file's date field may be a full RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` day.
fn parse_file_date(date: &str, utc_offset_hours: i32) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| local_midnight(date, utc_offset_hours))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FILE_BODY: &str = r#"{
        "date": "2025-06-02",
        "menuA": {"name": "豚肉の生姜焼き弁当", "description": "", "price": "550"},
        "menuB": {"name": "鶏の唐揚げ弁当", "description": "", "price": "600"},
        "menuC": {"name": "鯖の塩焼き弁当", "description": "", "price": "650"}
    }"#;

    fn write_file(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("menu-data.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn reads_valid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = FileSource::new(write_file(&dir, FILE_BODY), 9);

        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.origin, MenuOrigin::LocalFile);
        assert_eq!(snapshot.items[0].price, Some(550));
        // Captured at JST midnight of the file's date
        assert_eq!(
            snapshot.captured_at,
            local_midnight("2025-06-02", 9).unwrap()
        );
    }

    #[tokio::test]
    async fn missing_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = FileSource::new(dir.path().join("nope.json"), 9);
        assert!(matches!(
            source.fetch().await.unwrap_err(),
            FetchError::File(_)
        ));
    }

    #[tokio::test]
    async fn invalid_json_fails_validation() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = FileSource::new(write_file(&dir, "not json"), 9);
        assert!(matches!(
            source.fetch().await.unwrap_err(),
            FetchError::Malformed { .. }
        ));
    }

    #[tokio::test]
    async fn empty_slots_fail_validation() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = FileSource::new(write_file(&dir, r#"{"date": "2025-06-02"}"#), 9);
        assert!(matches!(
            source.fetch().await.unwrap_err(),
            FetchError::Malformed { .. }
        ));
    }

    #[test]
    fn file_date_accepts_both_formats() {
        assert!(parse_file_date("2025-06-02", 9).is_some());
        assert!(parse_file_date("2025-06-02T07:30:00+09:00", 9).is_some());
        assert!(parse_file_date("junk", 9).is_none());
    }
}
