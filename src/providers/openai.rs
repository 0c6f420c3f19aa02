//! Adapter for the OpenAI-compatible chat-completions endpoint.
//!
//! Retries up to 5 times on fallbackable errors with a linear backoff
//! (`delay = base * 1.5 * attempt`, base 2s, capped at 60s), honoring
//! cancellation between attempts.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ClassificationError, Stage};
use crate::prompt::{build_prompt, ModelProfile};
use crate::providers::{AdapterKind, Classifier};
use crate::response;
use crate::taxonomy::{ClassificationResult, DocumentMetadata};

const MAX_ATTEMPTS: u32 = 5;
const BACKOFF_BASE_SECS: f64 = 2.0;
const BACKOFF_MULTIPLIER: f64 = 1.5;
const BACKOFF_CAP_SECS: f64 = 60.0;

pub struct OpenAiAdapter {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiAdapter {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build OpenAI HTTP client");

        Self {
            client,
            base_url,
            model,
            api_key,
        }
    }

    /// Dynamic `max_text` computation: baseline 8000, scaled up for
    /// medium/large/many-page documents.
    fn dynamic_max_text(metadata: &DocumentMetadata) -> usize {
        let mut max_text = 8_000usize;
        if metadata.word_count >= 500 && metadata.word_count < 2_000 {
            max_text += 2_000;
        }
        if metadata.word_count > 10_000 {
            max_text += 4_000;
        }
        if metadata.page_count > 20 {
            max_text += 3_000;
        }
        max_text
    }

    fn backoff_delay(attempt: u32) -> Duration {
        let secs = (BACKOFF_BASE_SECS * BACKOFF_MULTIPLIER * attempt as f64).min(BACKOFF_CAP_SECS);
        Duration::from_secs_f64(secs)
    }

    async fn send_once(&self, prompt: &str, cancel: &CancellationToken) -> Result<String, ClassificationError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.1,
            max_tokens: 1500,
        };

        let send = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send();

        let response = tokio::select! {
            result = send => result.map_err(|e| {
                ClassificationError::stage_with_cause(Stage::OpenAiRequest, format!("network_error: {e}"), e.into())
            })?,
            _ = cancel.cancelled() => {
                return Err(ClassificationError::stage(Stage::OpenAiRequest, "network_error: request cancelled"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationError::stage(
                Stage::OpenAiRequest,
                format!("status {}: {}", status.as_u16(), body),
            ));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::stage_with_cause(Stage::OpenAiRequest, format!("json: {e}"), e.into()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClassificationError::stage(Stage::OpenAiRequest, "json: empty choices array"))
    }
}

#[async_trait]
impl Classifier for OpenAiAdapter {
    fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.model.is_empty() && self.api_key.is_some()
    }

    async fn classify(
        &self,
        text: &str,
        metadata: &DocumentMetadata,
        cancel: CancellationToken,
    ) -> Result<ClassificationResult, ClassificationError> {
        if !self.is_configured() {
            return Err(ClassificationError::NoProviderConfigured);
        }

        let max_text = Self::dynamic_max_text(metadata);
        let truncated: String = text.chars().take(max_text).collect();
        let prompt = build_prompt(&truncated, metadata, ModelProfile::OpenAi);

        let mut last_err = None;
        for attempt in 1..=MAX_ATTEMPTS {
            if cancel.is_cancelled() {
                return Err(ClassificationError::stage(Stage::OpenAiRequest, "network_error: cancelled"));
            }

            match self.send_once(&prompt, &cancel).await {
                Ok(raw) => {
                    return response::parse(&raw, AdapterKind::OpenAi, Utc::now());
                }
                Err(e) => {
                    let retryable = e.is_fallbackable();
                    warn!(attempt, retryable, "openai request failed: {e}");
                    last_err = Some(e);
                    if !retryable || attempt == MAX_ATTEMPTS {
                        break;
                    }
                    let delay = Self::backoff_delay(attempt);
                    debug!(?delay, "backing off before next openai attempt");
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {},
                        _ = cancel.cancelled() => break,
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ClassificationError::stage(Stage::OpenAiRequest, "unknown_error: exhausted retries")
        }))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn meta(word_count: u32, page_count: u32) -> DocumentMetadata {
        DocumentMetadata {
            file_name: "x.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            size: 100,
            word_count,
            page_count,
            source_system: None,
            properties: HashMap::new(),
        }
    }

    #[test]
    fn baseline_max_text_for_small_document() {
        assert_eq!(OpenAiAdapter::dynamic_max_text(&meta(100, 2)), 8_000);
    }

    #[test]
    fn medium_document_gets_extra_budget() {
        assert_eq!(OpenAiAdapter::dynamic_max_text(&meta(1_000, 2)), 10_000);
    }

    #[test]
    fn large_document_gets_largest_bump() {
        assert_eq!(OpenAiAdapter::dynamic_max_text(&meta(15_000, 2)), 12_000);
    }

    #[test]
    fn many_page_document_adds_budget() {
        assert_eq!(OpenAiAdapter::dynamic_max_text(&meta(100, 25)), 11_000);
    }

    #[test]
    fn backoff_delay_is_linear_and_capped() {
        assert_eq!(OpenAiAdapter::backoff_delay(1), Duration::from_secs_f64(3.0));
        assert_eq!(OpenAiAdapter::backoff_delay(2), Duration::from_secs_f64(6.0));
        assert_eq!(OpenAiAdapter::backoff_delay(100), Duration::from_secs_f64(60.0));
    }

    #[test]
    fn not_configured_without_api_key() {
        let adapter = OpenAiAdapter::new("http://localhost".to_string(), "gpt-4".to_string(), None);
        assert!(!adapter.is_configured());
    }
}
