// src/services/sheet.rs

//! Remote structured menu source.
//!
//! Queries a spreadsheet-style values API for the row matching today's
//! date. Row layout: date, then name/description/price for each of the
//! three slots (10 cells total).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::models::{MenuOrigin, MenuPayload, MenuSnapshot, PayloadItem, SheetConfig};
use crate::services::MenuSource;
use crate::utils::{local_midnight, today_string};

/// Spreadsheet-backed menu source. Highest priority in the chain.
pub struct SheetSource {
    client: Client,
    config: SheetConfig,
    api_key: String,
    utc_offset_hours: i32,
}

#[derive(Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetSource {
    pub fn new(
        client: Client,
        config: SheetConfig,
        api_key: String,
        utc_offset_hours: i32,
    ) -> Self {
        Self {
            client,
            config,
            api_key,
            utc_offset_hours,
        }
    }

    fn values_url(&self) -> String {
        format!(
            "{}/{}/values/{}",
            self.config.api_base, self.config.sheet_id, self.config.range
        )
    }
}

#[async_trait]
impl MenuSource for SheetSource {
    fn name(&self) -> &'static str {
        "sheet"
    }

    fn origin(&self) -> MenuOrigin {
        MenuOrigin::RemoteStructured
    }

    async fn fetch(&self) -> Result<MenuSnapshot, FetchError> {
        if self.config.sheet_id.trim().is_empty() {
            return Err(FetchError::malformed(self.name(), "sheet_id not configured"));
        }

        let response: ValuesResponse = self
            .client
            .get(self.values_url())
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let today = today_string(Utc::now(), self.utc_offset_hours);
        let row = response
            .values
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(today.as_str()))
            .ok_or(FetchError::NoRowForToday { date: today.clone() })?;

        let payload = row_to_payload(row);
        if payload.is_empty() {
            return Err(FetchError::malformed(
                self.name(),
                format!("row for {today} has no usable cells"),
            ));
        }

        let fetched_at = Utc::now();
        // The row carries no time of day; use local midnight.
        let captured_at =
            local_midnight(&today, self.utc_offset_hours).unwrap_or(fetched_at);

        Ok(payload.to_snapshot(captured_at, fetched_at, MenuOrigin::RemoteStructured, None))
    }
}

/// Map a 10-cell row (date + 3×(name, description, price)) to the payload.
/// Short rows leave trailing slots unknown.
fn row_to_payload(row: &[String]) -> MenuPayload {
    let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
    let slot = |base: usize| PayloadItem {
        name: cell(base),
        description: cell(base + 1),
        price: cell(base + 2),
    };

    MenuPayload {
        date: row.first().cloned(),
        menu_a: Some(slot(1)),
        menu_b: Some(slot(4)),
        menu_c: Some(slot(7)),
    }
}
