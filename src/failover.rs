//! Wraps zero or more provider adapters and presents the same
//! `Classifier` contract, trying providers in cost-ascending order
//! (Ollama → Claude → OpenAI) and falling back on fallbackable errors.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ClassificationError;
use crate::providers::{ClaudeAdapter, Classifier, OllamaAdapter, OpenAiAdapter};
use crate::taxonomy::{ClassificationResult, DocumentMetadata};

const EXPENSIVE_FALLBACK_MARKER: &str = "[EXPENSIVE FALLBACK] ";
const EXPENSIVE_FALLBACK_CONFIDENCE_SCALE: f32 = 0.9;

pub struct FailoverConfig {
    pub enable_fallback: bool,
    pub retry_delay: Duration,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            enable_fallback: true,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Cost-ascending chain: any subset of the three adapters may be
/// present. Construction fails if none are configured.
pub struct FailoverCoordinator {
    ollama: Option<OllamaAdapter>,
    claude: Option<ClaudeAdapter>,
    openai: Option<OpenAiAdapter>,
    config: FailoverConfig,
}

impl FailoverCoordinator {
    pub fn new(
        ollama: Option<OllamaAdapter>,
        claude: Option<ClaudeAdapter>,
        openai: Option<OpenAiAdapter>,
        config: FailoverConfig,
    ) -> Result<Self, ClassificationError> {
        let any_configured = ollama.as_ref().is_some_and(Classifier::is_configured)
            || claude.as_ref().is_some_and(Classifier::is_configured)
            || openai.as_ref().is_some_and(Classifier::is_configured);

        if !any_configured {
            return Err(ClassificationError::NoProviderConfigured);
        }

        Ok(Self {
            ollama,
            claude,
            openai,
            config,
        })
    }

    fn chain(&self) -> Vec<(&'static str, &dyn Classifier, bool)> {
        // bool marks "is the most expensive provider in this call" — only
        // meaningful for the last entry, evaluated at call time.
        let mut chain: Vec<(&'static str, &dyn Classifier)> = Vec::new();
        if let Some(o) = &self.ollama {
            if o.is_configured() {
                chain.push(("ollama", o));
            }
        }
        if let Some(c) = &self.claude {
            if c.is_configured() {
                chain.push(("claude", c));
            }
        }
        if let Some(oa) = &self.openai {
            if oa.is_configured() {
                chain.push(("openai", oa));
            }
        }
        let len = chain.len();
        chain
            .into_iter()
            .enumerate()
            .map(|(i, (name, c))| (name, c, i == len - 1 && name == "openai" && len > 1))
            .collect()
    }

    pub async fn classify(
        &self,
        text: &str,
        metadata: &DocumentMetadata,
        cancel: CancellationToken,
    ) -> Result<ClassificationResult, ClassificationError> {
        let chain = self.chain();
        let mut last_err: Option<ClassificationError> = None;

        for (name, adapter, is_last_resort_openai) in chain {
            if cancel.is_cancelled() {
                return Err(last_err.unwrap_or(ClassificationError::NoProviderConfigured));
            }

            match adapter.classify(text, metadata, cancel.clone()).await {
                Ok(mut result) => {
                    if is_last_resort_openai {
                        result.summary = format!("{EXPENSIVE_FALLBACK_MARKER}{}", result.summary);
                        result.confidence *= EXPENSIVE_FALLBACK_CONFIDENCE_SCALE;
                    }
                    info!(provider = name, "classification succeeded");
                    return Ok(result);
                }
                Err(e) => {
                    let category = e.category();
                    warn!(provider = name, ?category, "provider failed: {e}");

                    if !self.config.enable_fallback || !e.is_fallbackable() {
                        return Err(e);
                    }

                    last_err = Some(e);
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.retry_delay) => {},
                        _ = cancel.cancelled() => break,
                    }
                }
            }
        }

        Err(ClassificationError::AllProvidersFailed(
            last_err.map(|e| e.to_string()).unwrap_or_else(|| "no providers configured".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_fails_with_no_providers_configured() {
        let ollama = OllamaAdapter::new(String::new(), String::new());
        let result = FailoverCoordinator::new(Some(ollama), None, None, FailoverConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn construction_succeeds_with_one_configured_provider() {
        let ollama = OllamaAdapter::new("http://localhost:11434".to_string(), "llama3".to_string());
        let result = FailoverCoordinator::new(Some(ollama), None, None, FailoverConfig::default());
        assert!(result.is_ok());
    }

    #[test]
    fn chain_orders_ollama_before_claude_before_openai() {
        let ollama = OllamaAdapter::new("http://localhost:11434".to_string(), "llama3".to_string());
        let claude = ClaudeAdapter::new("http://localhost".to_string(), "claude-3".to_string(), Some("k".to_string()));
        let openai = OpenAiAdapter::new("http://localhost".to_string(), "gpt-4".to_string(), Some("k".to_string()));
        let coordinator = FailoverCoordinator::new(Some(ollama), Some(claude), Some(openai), FailoverConfig::default()).unwrap();
        let names: Vec<&str> = coordinator.chain().into_iter().map(|(n, _, _)| n).collect();
        assert_eq!(names, vec!["ollama", "claude", "openai"]);
    }

    #[test]
    fn chain_skips_unconfigured_providers() {
        let claude = ClaudeAdapter::new("http://localhost".to_string(), "claude-3".to_string(), Some("k".to_string()));
        let coordinator = FailoverCoordinator::new(None, Some(claude), None, FailoverConfig::default()).unwrap();
        let names: Vec<&str> = coordinator.chain().into_iter().map(|(n, _, _)| n).collect();
        assert_eq!(names, vec!["claude"]);
    }

    #[test]
    fn openai_not_marked_last_resort_when_it_is_the_only_provider() {
        let openai = OpenAiAdapter::new("http://localhost".to_string(), "gpt-4".to_string(), Some("k".to_string()));
        let coordinator = FailoverCoordinator::new(None, None, Some(openai), FailoverConfig::default()).unwrap();
        let flags: Vec<bool> = coordinator.chain().into_iter().map(|(_, _, f)| f).collect();
        assert_eq!(flags, vec![false]);
    }

    #[test]
    fn openai_marked_last_resort_when_chain_has_multiple_providers() {
        let claude = ClaudeAdapter::new("http://localhost".to_string(), "claude-3".to_string(), Some("k".to_string()));
        let openai = OpenAiAdapter::new("http://localhost".to_string(), "gpt-4".to_string(), Some("k".to_string()));
        let coordinator = FailoverCoordinator::new(None, Some(claude), Some(openai), FailoverConfig::default()).unwrap();
        let flags: Vec<bool> = coordinator.chain().into_iter().map(|(_, _, f)| f).collect();
        assert_eq!(flags, vec![false, true]);
    }
}
