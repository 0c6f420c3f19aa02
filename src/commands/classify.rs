use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::failover::{FailoverConfig, FailoverCoordinator};
use crate::providers::{ClaudeAdapter, OllamaAdapter, OpenAiAdapter};
use crate::taxonomy::{ClassificationResult, DocumentMetadata};
use crate::utils::progress::create_spinner;

/// Builds document metadata from filesystem facts alone; text
/// extraction (PDF/Word/etc.) is out of scope here and the file is
/// read as already-extracted plain text.
fn build_metadata(path: &Path, text: &str) -> DocumentMetadata {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_type = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "txt".to_string());
    let size = text.len() as u64;
    let word_count = text.split_whitespace().count() as u32;
    // No page boundaries in plain text; approximate one page per 500 words.
    let page_count = (word_count / 500).max(1);

    DocumentMetadata {
        file_name,
        file_type,
        size,
        word_count,
        page_count,
        source_system: None,
        properties: HashMap::new(),
    }
}

fn build_coordinator(config: &Config) -> Result<FailoverCoordinator> {
    let ollama = if !config.providers.ollama.base_url.is_empty() {
        Some(OllamaAdapter::new(
            config.providers.ollama.base_url.clone(),
            config.providers.ollama.model.clone(),
        ))
    } else {
        None
    };
    let claude = if !config.providers.claude.base_url.is_empty() {
        Some(ClaudeAdapter::new(
            config.providers.claude.base_url.clone(),
            config.providers.claude.model.clone(),
            config.providers.claude.api_key.clone(),
        ))
    } else {
        None
    };
    let openai = if !config.providers.openai.base_url.is_empty() {
        Some(OpenAiAdapter::new(
            config.providers.openai.base_url.clone(),
            config.providers.openai.model.clone(),
            config.providers.openai.api_key.clone(),
        ))
    } else {
        None
    };

    FailoverCoordinator::new(ollama, claude, openai, FailoverConfig::default())
        .context("no AI provider is configured; run `kanuni config set providers.<provider>.api_key <key>`")
}

pub async fn execute(file: &str, format: &str) -> Result<()> {
    let path = Path::new(file);
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", file))?;
    let metadata = build_metadata(path, &text);

    let config = Config::load()?;
    let coordinator = build_coordinator(&config)?;

    let spinner = create_spinner(&format!("Classifying {}...", file));
    let result = coordinator
        .classify(&text, &metadata, CancellationToken::new())
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            print_result(&result, format);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Classification failed:".red().bold(), e);
            Err(e.into())
        }
    }
}

fn print_result(result: &ClassificationResult, format: &str) {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(result).unwrap_or_default());
        }
        "markdown" => {
            println!("# Classification Result\n");
            println!("- **Document type:** {}", result.document_type);
            println!("- **Legal category:** {}", result.legal_category);
            println!("- **Confidence:** {:.2}", result.confidence);
            println!("- **Subject:** {}", result.subject);
            if let Some(date) = &result.filing_date {
                println!("- **Filing date:** {}", date);
            }
            println!("\n{}", result.summary);
        }
        _ => {
            println!("\n{}", "📊 Classification Result:".green().bold());
            println!("  {} {}", "Document Type:".white().bold(), result.document_type.yellow());
            println!("  {} {}", "Legal Category:".white().bold(), result.legal_category.yellow());
            println!("  {} {:.2}", "Confidence:".white().bold(), result.confidence);
            println!("  {} {}", "Subject:".white().bold(), result.subject);
            if !result.keywords.is_empty() {
                println!("  {} {}", "Keywords:".white().bold(), result.keywords.join(", ").cyan());
            }
            println!("\n{}", result.summary);
        }
    }
}
