//! Thin HTTP client for the batch-mode external API (spec.md §6):
//! cursor-paginated document listing, batch job submission/polling,
//! raw file download, and the per-document categorise endpoint.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentListing {
    pub path: String,
    pub size: u64,
    pub last_modified: String,
    pub file_type: String,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
struct CountEnvelope {
    data: CountData,
}

#[derive(Debug, Deserialize)]
struct CountData {
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    data: DocumentPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentPage {
    pub documents: Vec<DocumentListing>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
    #[serde(default)]
    pub total_returned: u64,
    #[serde(default)]
    pub total_estimated: u64,
}

#[derive(Debug, Serialize)]
struct SubmitBatchRequest<'a> {
    document_paths: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SubmitEnvelope {
    data: SubmitBatchResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitBatchResponse {
    pub job_id: String,
    #[allow(dead_code)]
    pub status: String,
    #[allow(dead_code)]
    pub total_documents: u64,
    #[allow(dead_code)]
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    data: BatchStatusResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchStatusResponse {
    #[allow(dead_code)]
    pub id: String,
    pub status: String,
    pub progress: BatchProgress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchProgress {
    #[allow(dead_code)]
    pub total_documents: u64,
    pub processed_count: u64,
    #[allow(dead_code)]
    pub success_count: u64,
    #[allow(dead_code)]
    pub error_count: u64,
    #[serde(default)]
    #[allow(dead_code)]
    pub skipped_count: u64,
    #[serde(default)]
    #[allow(dead_code)]
    pub indexed_count: u64,
    #[serde(default)]
    #[allow(dead_code)]
    pub index_error_count: u64,
    #[allow(dead_code)]
    pub percent_complete: f32,
    #[serde(default)]
    #[allow(dead_code)]
    pub estimated_duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriseResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl BatchStatusResponse {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed" | "cancelled")
    }
}

pub struct BatchApiClient {
    client: Client,
    base_url: String,
}

impl BatchApiClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build batch API HTTP client");

        Self { client, base_url }
    }

    pub async fn count_documents(&self) -> Result<u64> {
        let url = format!("{}/api/v1/storage/documents/count", self.base_url);
        let response = self.client.get(&url).send().await.context("counting documents")?;
        if !response.status().is_success() {
            bail!("document count request failed: {}", response.status());
        }
        let envelope: CountEnvelope = response.json().await.context("parsing document count")?;
        Ok(envelope.data.total_count)
    }

    pub async fn list_documents(&self, limit: usize, cursor: Option<&str>) -> Result<DocumentPage> {
        let url = format!("{}/api/v1/storage/documents", self.base_url);
        let mut request = self.client.get(&url).query(&[("limit", limit.to_string())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await.context("listing documents")?;
        if !response.status().is_success() {
            bail!("document listing failed: {}", response.status());
        }
        let envelope: ListEnvelope = response.json().await.context("parsing document listing")?;
        Ok(envelope.data)
    }

    pub async fn submit_batch(&self, document_paths: &[String]) -> Result<SubmitBatchResponse> {
        let url = format!("{}/api/v1/batch/classify", self.base_url);
        let body = SubmitBatchRequest { document_paths };

        let response = self.client.post(&url).json(&body).send().await.context("submitting batch job")?;
        let status = response.status();
        if status.as_u16() != 202 {
            let body = response.text().await.unwrap_or_default();
            bail!("batch submission rejected with status {}: {}", status, body);
        }
        let envelope: SubmitEnvelope = response.json().await.context("parsing batch submission response")?;
        Ok(envelope.data)
    }

    pub async fn poll_status(&self, job_id: &str) -> Result<BatchStatusResponse> {
        let url = format!("{}/api/v1/batch/{}/status", self.base_url, job_id);
        let response = self.client.get(&url).send().await.context("polling batch job status")?;
        if !response.status().is_success() {
            bail!("status poll failed: {}", response.status());
        }
        let envelope: StatusEnvelope = response.json().await.context("parsing batch status")?;
        Ok(envelope.data)
    }

    pub async fn download_file(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/api/v1/files/{}", self.base_url, path);
        let response = self.client.get(&url).send().await.context("downloading document")?;
        if !response.status().is_success() {
            bail!("download failed: {}", response.status());
        }
        Ok(response.bytes().await.context("reading downloaded bytes")?.to_vec())
    }

    pub async fn categorise(&self, filename: &str, bytes: Vec<u8>) -> Result<CategoriseResponse> {
        let url = format!("{}/api/v1/categorise", self.base_url);
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new()
            .part("file", part)
            .text("extract_text", "true")
            .text("classify_doc", "true")
            .text("index_document", "true")
            .text("store_document", "true");

        let response = self.client.post(&url).multipart(form).send().await.context("submitting categorise request")?;
        let status = response.status();
        if status.is_server_error() {
            bail!("categorise endpoint returned server error: {}", status);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("categorise request rejected with status {}: {}", status, body);
        }
        response.json().await.context("parsing categorise response")
    }
}
