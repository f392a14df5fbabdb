// src/services/extractor.rs

//! Menu extraction from free-text announcements.
//!
//! Sends the announcement to a chat-completions API with an instruction to
//! return the fixed three-slot schema, then parses the JSON reply into a
//! `MenuSnapshot`. Extraction failures are recoverable; the orchestrator
//! treats them as one more failed source.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::models::{ExtractorConfig, MenuOrigin, MenuPayload, MenuSnapshot};

const SYSTEM_PROMPT: &str =
    "あなたは日本語のツイートからお弁当メニュー情報を正確に抽出するアシスタントです。\n\
     以下のルールに従ってください:\n\
     1. メニューA、B、Cの3種類を識別\n\
     2. それぞれの名前、価格を抽出\n\
     3. 副菜や説明があれば含める\n\
     4. 価格は数字のみ（円マークなし）\n\
     5. 必ずJSON形式で返す";

/// Service that turns one announcement text into a structured snapshot.
pub struct MenuExtractor {
    client: Client,
    config: ExtractorConfig,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

impl MenuExtractor {
    /// Create a new extractor backed by the shared HTTP client.
    pub fn new(client: Client, config: ExtractorConfig, api_key: String) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    /// Extract the three-slot menu from announcement text.
    ///
    /// `captured_at` is the announcement's own timestamp when the caller
    /// knows it; otherwise the fetch time is used for both.
    pub async fn extract(
        &self,
        text: &str,
        captured_at: Option<DateTime<Utc>>,
    ) -> Result<MenuSnapshot, ExtractionError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(text),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response: ChatResponse = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ExtractionError::Schema("response has no choices".into()))?;

        let payload = parse_payload(content)?;

        let fetched_at = Utc::now();
        Ok(payload.to_snapshot(
            captured_at.unwrap_or(fetched_at),
            fetched_at,
            MenuOrigin::AnnouncementExtracted,
            Some(text.to_string()),
        ))
    }
}

/// Instruction sent with the announcement text.
fn user_prompt(text: &str) -> String {
    format!(
        "以下のツイートから本日のお弁当メニューを抽出してください:\n\n{text}\n\n\
         JSON形式で返してください:\n\
         {{\n\
           \"menuA\": {{\"name\": \"メニュー名\", \"description\": \"説明\", \"price\": \"550\"}},\n\
           \"menuB\": {{\"name\": \"メニュー名\", \"description\": \"説明\", \"price\": \"600\"}},\n\
           \"menuC\": {{\"name\": \"メニュー名\", \"description\": \"説明\", \"price\": \"650\"}}\n\
         }}"
    )
}

/// Parse the service reply into the three-slot payload.
///
/// Rejects replies that are not the schema or that carry zero usable
/// fields; partially filled replies are accepted (missing slots become
/// placeholders downstream).
pub fn parse_payload(content: &str) -> Result<MenuPayload, ExtractionError> {
    let payload: MenuPayload =
        serde_json::from_str(content).map_err(|e| ExtractionError::Schema(e.to_string()))?;
    if payload.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(payload)
}
