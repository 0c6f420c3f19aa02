//! Adapter for the Claude messages endpoint. No adapter-level retries —
//! retries happen only at the Failover Coordinator layer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{ClassificationError, Stage};
use crate::prompt::{build_prompt, ModelProfile};
use crate::providers::{AdapterKind, Classifier};
use crate::response;
use crate::taxonomy::{ClassificationResult, DocumentMetadata};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeAdapter {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ClaudeAdapter {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build Claude HTTP client");

        Self {
            client,
            base_url,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl Classifier for ClaudeAdapter {
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

        let prompt = build_prompt(text, metadata, ModelProfile::Claude);
        let url = format!("{}/v1/messages", self.base_url);
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: 1500,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let send = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send();

        let response = tokio::select! {
            result = send => result.map_err(|e| {
                ClassificationError::stage_with_cause(Stage::ClaudeRequest, format!("network_error: {e}"), e.into())
            })?,
            _ = cancel.cancelled() => {
                return Err(ClassificationError::stage(Stage::ClaudeRequest, "network_error: request cancelled"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationError::stage(
                Stage::ClaudeRequest,
                format!("status {}: {}", status.as_u16(), body),
            ));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::stage_with_cause(Stage::ClaudeRequest, format!("json: {e}"), e.into()))?;

        let raw = parsed
            .content
            .into_iter()
            .find(|b| b.block_type == "text")
            .map(|b| b.text)
            .ok_or_else(|| ClassificationError::stage(Stage::ClaudeRequest, "json: no text content block"))?;

        response::parse(&raw, AdapterKind::Claude, Utc::now())
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}
