//! Assembles a single model-specific prompt from raw text, document
//! metadata, and a closed set of model profiles.

use std::fmt::Write;

use crate::taxonomy::{default_document_types, default_entity_kinds, DocumentMetadata};

const ELLIPSIS_MARKER: &str = "... [truncated]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProfile {
    OpenAi,
    Claude,
    Ollama,
}

impl ModelProfile {
    pub fn max_text(self) -> usize {
        match self {
            ModelProfile::OpenAi => 12_000,
            ModelProfile::Claude => 15_000,
            ModelProfile::Ollama => 8_000,
        }
    }

    pub fn include_context(self) -> bool {
        !matches!(self, ModelProfile::Ollama)
    }

    pub fn detail(self) -> &'static str {
        match self {
            ModelProfile::OpenAi => "comprehensive",
            ModelProfile::Claude => "comprehensive",
            ModelProfile::Ollama => "standard",
        }
    }
}

fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_len).collect();
    format!("{truncated}{ELLIPSIS_MARKER}")
}

fn metadata_section(meta: &DocumentMetadata) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Document Metadata");
    let _ = writeln!(out, "- File name: {}", meta.file_name);
    let _ = writeln!(out, "- File type: {}", meta.file_type);
    let _ = writeln!(out, "- Word count: {}", meta.word_count);
    let _ = writeln!(out, "- Page count: {}", meta.page_count);
    let _ = writeln!(
        out,
        "- Source system: {}",
        meta.source_system.as_deref().unwrap_or("unknown")
    );
    out
}

fn context_block(meta: &DocumentMetadata) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Document Analysis Context");

    if meta.word_count < 300 {
        let _ = writeln!(
            out,
            "This is a short document. Focus on extracting the core facts concisely; do not pad the summary."
        );
    } else if meta.word_count > 5000 {
        let _ = writeln!(
            out,
            "This is a comprehensive document. Expect multiple sections and extract information from throughout the document, not just the opening."
        );
    } else if meta.page_count > 10 {
        let _ = writeln!(
            out,
            "This is a multi-page document; perform structural analysis across sections, headers, and exhibits before summarizing."
        );
    } else {
        let _ = writeln!(
            out,
            "Perform a standard, balanced analysis of this document."
        );
    }

    let file_type = meta.file_type.to_lowercase();
    if file_type.contains("pdf") {
        let _ = writeln!(
            out,
            "The source was a PDF; watch for OCR artifacts and page-break hyphenation."
        );
    } else if file_type.contains("word") || file_type.contains("docx") || file_type.contains("doc") {
        let _ = writeln!(
            out,
            "The source was a Word document; headings and tracked-change markers may appear inline."
        );
    } else {
        let _ = writeln!(
            out,
            "The source was plain text; formatting cues such as indentation may carry structural meaning."
        );
    }

    out
}

const DATE_EXTRACTION_INSTRUCTIONS: &str = r#"## Date Extraction Instructions

Identify the following date kinds wherever present: filing_date, event_date,
hearing_date, decision_date, served_date. Format every date as YYYY-MM-DD.
For partial dates (month and year only), use day=01. Resolve relative dates
("next Tuesday", "two weeks from filing") against the document's own stated
reference date when present. Legal documents are valid from 1950 to the
present; treat dates outside that window as implausible and omit them."#;

fn entity_extraction_guidelines() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Entity Extraction Guidelines");
    let _ = writeln!(
        out,
        "Extract named entities of these kinds: {}. Assign each entity a \
confidence score between 0 and 1 reflecting how certain the text makes its \
classification.",
        default_entity_kinds().join(", ")
    );
    out
}

fn document_type_enumeration() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Document Types");
    let _ = writeln!(out, "Choose document_type from exactly these values:");
    for t in default_document_types() {
        let _ = writeln!(out, "- {t}");
    }
    out
}

const SUMMARIZATION_REQUIREMENTS: &str = r#"## Summarization Requirements

- Motion: summarize the relief requested, the legal basis cited, and the
  moving party's core argument in 2-4 sentences.
- Order/Ruling: summarize the court's disposition, the reasoning relied on,
  and any deadlines or conditions it imposes.
- Brief/Pleading: summarize the claims or defenses raised and the key
  factual allegations supporting them.
- Administrative filing: summarize the filing's purpose and the action it
  requests or records."#;

fn json_response_schema() -> String {
    r#"## Response Format

Respond with ONLY a JSON object matching this exact shape. Use null where a
field is undetermined. Do not include any text before or after the JSON.

{
  "document_type": "string",
  "legal_category": "string",
  "subject": "string",
  "summary": "string",
  "confidence": 0.0,
  "keywords": ["string"],
  "legal_tags": ["string"],
  "case_info": {"case_number": null, "case_name": null, "case_type": null, "docket": null},
  "court_info": {"court_name": null, "jurisdiction": null, "level": null, "county": null},
  "parties": [{"name": "string", "role": null, "party_type": null}],
  "attorneys": [{"name": "string", "role": null, "organization": null}],
  "judge": {"name": "string", "title": null},
  "charges": [{"statute": null, "description": null, "grade": null, "class": null}],
  "authorities": [{"citation": "string", "case_title": null, "type": null, "precedent": null}],
  "filing_date": null,
  "event_date": null,
  "hearing_date": null,
  "decision_date": null,
  "served_date": null,
  "date_ranges": [{"start": null, "end": null, "kind": "string"}],
  "status": null,
  "entities": [{"text": "string", "type": "string", "confidence": 0.0}]
}"#
    .to_string()
}

/// Builds a complete prompt per spec.md §4.2's nine-step algorithm.
pub fn build_prompt(text: &str, metadata: &DocumentMetadata, profile: ModelProfile) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", metadata_section(metadata));

    if profile.include_context() {
        let _ = writeln!(out, "{}", context_block(metadata));
    }

    let _ = writeln!(out, "{DATE_EXTRACTION_INSTRUCTIONS}\n");
    let _ = writeln!(out, "{}", entity_extraction_guidelines());
    let _ = writeln!(out, "{}", document_type_enumeration());
    let _ = writeln!(out, "{SUMMARIZATION_REQUIREMENTS}\n");

    let _ = writeln!(out, "## Document Text\n");
    let _ = writeln!(out, "{}", truncate_text(text, profile.max_text()));
    let _ = writeln!(out, "\n{}", json_response_schema());

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn meta(word_count: u32, page_count: u32, file_type: &str) -> DocumentMetadata {
        DocumentMetadata {
            file_name: "motion.pdf".to_string(),
            file_type: file_type.to_string(),
            size: 1024,
            word_count,
            page_count,
            source_system: Some("intake".to_string()),
            properties: HashMap::new(),
        }
    }

    #[test]
    fn truncates_text_and_appends_ellipsis_marker() {
        let long_text = "a".repeat(20_000);
        let prompt = build_prompt(&long_text, &meta(100, 1, "text/plain"), ModelProfile::Ollama);
        assert!(prompt.contains(ELLIPSIS_MARKER));
    }

    #[test]
    fn prompt_length_respects_profile_bound() {
        let long_text = "word ".repeat(5000);
        let profile = ModelProfile::OpenAi;
        let prompt = build_prompt(&long_text, &meta(5000, 3, "application/pdf"), profile);
        // the truncated body itself should not exceed max_text + ellipsis marker
        let doc_section_start = prompt.find("## Document Text").unwrap();
        let schema_start = prompt.find("## Response Format").unwrap();
        let body = &prompt[doc_section_start..schema_start];
        assert!(body.chars().count() <= profile.max_text() + ELLIPSIS_MARKER.len() + 64);
    }

    #[test]
    fn short_document_gets_short_guidance_not_multi_page() {
        let prompt = build_prompt("short text", &meta(100, 1, "text/plain"), ModelProfile::Claude);
        assert!(prompt.contains("short document"));
        assert!(!prompt.contains("multi-page"));
    }

    #[test]
    fn exactly_5000_words_falls_through_to_multipage_not_comprehensive() {
        // word_count > 5000 is false at exactly 5000; page_count > 10 wins instead.
        let prompt = build_prompt(
            "text",
            &meta(5000, 15, "application/pdf"),
            ModelProfile::Claude,
        );
        assert!(prompt.contains("multi-page"));
        assert!(!prompt.contains("short document"));
        assert_eq!(prompt.matches("## Document Analysis Context").count(), 1);
    }

    #[test]
    fn over_5000_words_gets_comprehensive_guidance_over_multipage() {
        let prompt = build_prompt(
            "text",
            &meta(5001, 15, "application/pdf"),
            ModelProfile::Claude,
        );
        assert!(prompt.contains("comprehensive document"));
        assert_eq!(prompt.matches("## Document Analysis Context").count(), 1);
    }

    #[test]
    fn multipage_guidance_when_not_short_or_comprehensive() {
        let prompt = build_prompt("text", &meta(1000, 15, "text/plain"), ModelProfile::Claude);
        assert!(prompt.contains("multi-page"));
    }

    #[test]
    fn ollama_profile_omits_context_block() {
        let prompt = build_prompt("text", &meta(100, 1, "text/plain"), ModelProfile::Ollama);
        assert!(!prompt.contains("## Document Analysis Context"));
    }

    #[test]
    fn pdf_file_type_hint_present() {
        let prompt = build_prompt("text", &meta(1000, 2, "application/pdf"), ModelProfile::OpenAi);
        assert!(prompt.contains("PDF"));
    }

    #[test]
    fn includes_document_type_enumeration() {
        let prompt = build_prompt("text", &meta(1000, 2, "text/plain"), ModelProfile::OpenAi);
        assert!(prompt.contains("motion_to_suppress"));
        assert!(prompt.contains("other"));
    }

    #[test]
    fn includes_entity_kinds_from_the_taxonomy() {
        let prompt = build_prompt("text", &meta(1000, 2, "text/plain"), ModelProfile::OpenAi);
        assert!(prompt.contains("monetary_amount"));
        assert!(prompt.contains("case_citation"));
    }
}
