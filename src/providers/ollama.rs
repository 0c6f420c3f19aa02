//! Adapter for a local Ollama `/api/generate` endpoint. No API key; a
//! longer timeout accommodates slower local inference.

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

pub struct OllamaAdapter {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaAdapter {
    pub fn new(base_url: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build Ollama HTTP client");

        Self {
            client,
            base_url,
            model,
        }
    }
}

#[async_trait]
impl Classifier for OllamaAdapter {
    fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.model.is_empty()
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

        let prompt = build_prompt(text, metadata, ModelProfile::Ollama);
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };

        let send = self.client.post(&url).json(&request).send();

        let response = tokio::select! {
            result = send => result.map_err(|e| {
                ClassificationError::stage_with_cause(Stage::OllamaRequest, format!("network_error: {e}"), e.into())
            })?,
            _ = cancel.cancelled() => {
                return Err(ClassificationError::stage(Stage::OllamaRequest, "network_error: request cancelled"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationError::stage(
                Stage::OllamaRequest,
                format!("status {}: {}", status.as_u16(), body),
            ));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::stage_with_cause(Stage::OllamaRequest, format!("json: {e}"), e.into()))?;

        if let Some(err) = parsed.error {
            return Err(ClassificationError::stage(Stage::OllamaRequest, err));
        }

        response::parse(&parsed.response, AdapterKind::Ollama, Utc::now())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    #[allow(dead_code)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}
