//! Shared contract for the three interchangeable provider adapters.

pub mod claude;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ClassificationError;
use crate::taxonomy::{ClassificationResult, DocumentMetadata};

pub use claude::ClaudeAdapter;
pub use ollama::OllamaAdapter;
pub use openai::OpenAiAdapter;

/// The kind of adapter a raw provider response came from, used by the
/// Response Parser to apply adapter-specific defaults and coercion
/// factors (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    OpenAi,
    Claude,
    Ollama,
}

impl AdapterKind {
    pub fn default_confidence(self) -> f32 {
        match self {
            AdapterKind::OpenAi | AdapterKind::Claude => 0.5,
            AdapterKind::Ollama => 0.3,
        }
    }

    pub fn coercion_penalty(self) -> f32 {
        match self {
            AdapterKind::OpenAi | AdapterKind::Claude => 0.8,
            AdapterKind::Ollama => 0.7,
        }
    }

    pub fn subject_word_limit(self) -> usize {
        match self {
            AdapterKind::OpenAi | AdapterKind::Claude => 12,
            AdapterKind::Ollama => 10,
        }
    }
}

/// Shared contract every provider adapter implements. Requests are
/// cancellable via the supplied token; implementations must check it
/// between retry attempts and at the transport call itself.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// An endpoint and model identifier must be configured before use.
    fn is_configured(&self) -> bool;

    async fn classify(
        &self,
        text: &str,
        metadata: &DocumentMetadata,
        cancel: CancellationToken,
    ) -> Result<ClassificationResult, ClassificationError>;
}
