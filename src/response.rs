//! Turns a raw provider response string into a validated
//! `ClassificationResult`: bracket-span JSON extraction, defaulting,
//! document-type coercion, date validation, and subject synthesis.

use chrono::{DateTime, Utc};

use crate::dates::{validate_iso_date, DateKind};
use crate::error::ClassificationError;
use crate::providers::AdapterKind;
use crate::taxonomy::{default_document_types, ClassificationResult};

/// Raw shape deserialized straight off the wire, before defaulting.
#[derive(Debug, Clone, serde::Deserialize)]
struct RawResult {
    #[serde(default)]
    document_type: String,
    #[serde(default)]
    legal_category: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    legal_tags: Vec<String>,
    #[serde(default)]
    case_info: Option<crate::taxonomy::CaseInfo>,
    #[serde(default)]
    court_info: Option<crate::taxonomy::CourtInfo>,
    #[serde(default)]
    parties: Vec<crate::taxonomy::Party>,
    #[serde(default)]
    attorneys: Vec<crate::taxonomy::Attorney>,
    #[serde(default)]
    judge: Option<crate::taxonomy::Judge>,
    #[serde(default)]
    charges: Vec<crate::taxonomy::Charge>,
    #[serde(default)]
    authorities: Vec<crate::taxonomy::Authority>,
    #[serde(default)]
    entities: Vec<crate::taxonomy::NamedEntity>,
    #[serde(default)]
    filing_date: Option<String>,
    #[serde(default)]
    event_date: Option<String>,
    #[serde(default)]
    hearing_date: Option<String>,
    #[serde(default)]
    decision_date: Option<String>,
    #[serde(default)]
    served_date: Option<String>,
    #[serde(default)]
    date_ranges: Vec<crate::taxonomy::DateRange>,
    #[serde(default)]
    status: Option<String>,
}

/// Locates the first `{` and last `}` in `raw`. Fails if either is
/// missing or the span is empty/inverted.
fn extract_json_span(raw: &str) -> Result<&str, ClassificationError> {
    let start = raw
        .find('{')
        .ok_or_else(|| ClassificationError::ResponseParsing("no '{' found in response".to_string()))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| ClassificationError::ResponseParsing("no '}' found in response".to_string()))?;
    if end <= start {
        return Err(ClassificationError::ResponseParsing(
            "malformed JSON span: end <= start".to_string(),
        ));
    }
    Ok(&raw[start..=end])
}

fn first_sentence(text: &str) -> &str {
    let end = text
        .find(['.', '!', '?'])
        .map(|i| i + 1)
        .unwrap_or(text.len());
    text[..end].trim()
}

fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        text.to_string()
    } else {
        format!("{}...", words[..limit].join(" "))
    }
}

/// Parses a raw provider response into a fully validated, defaulted
/// `ClassificationResult` (spec.md §4.5, steps 1-7).
pub fn parse(raw: &str, adapter: AdapterKind, now: DateTime<Utc>) -> Result<ClassificationResult, ClassificationError> {
    let span = extract_json_span(raw)?;
    let parsed: RawResult = serde_json::from_str(span)
        .map_err(|e| ClassificationError::ResponseParsing(e.to_string()))?;

    let mut document_type = if parsed.document_type.trim().is_empty() {
        "other".to_string()
    } else {
        parsed.document_type
    };

    let legal_category = if parsed.legal_category.trim().is_empty() {
        "Civil Law".to_string()
    } else {
        parsed.legal_category
    };

    let mut confidence = if parsed.confidence == 0.0 {
        adapter.default_confidence()
    } else {
        parsed.confidence
    };

    if !default_document_types().contains(&document_type.as_str()) {
        document_type = "other".to_string();
        confidence *= adapter.coercion_penalty();
    }

    let filing_date = parsed
        .filing_date
        .and_then(|d| validate_iso_date(&d, DateKind::Filing, now))
        .map(|d| d.format("%Y-%m-%d").to_string());
    let event_date = parsed
        .event_date
        .and_then(|d| validate_iso_date(&d, DateKind::Event, now))
        .map(|d| d.format("%Y-%m-%d").to_string());
    let hearing_date = parsed
        .hearing_date
        .and_then(|d| validate_iso_date(&d, DateKind::Hearing, now))
        .map(|d| d.format("%Y-%m-%d").to_string());
    let decision_date = parsed
        .decision_date
        .and_then(|d| validate_iso_date(&d, DateKind::Decision, now))
        .map(|d| d.format("%Y-%m-%d").to_string());
    let served_date = parsed
        .served_date
        .and_then(|d| validate_iso_date(&d, DateKind::Served, now))
        .map(|d| d.format("%Y-%m-%d").to_string());

    let subject = if parsed.subject.trim().is_empty() && !parsed.summary.trim().is_empty() {
        truncate_words(first_sentence(&parsed.summary), adapter.subject_word_limit())
    } else {
        parsed.subject
    };

    Ok(ClassificationResult {
        document_type,
        legal_category,
        subject,
        summary: parsed.summary,
        confidence,
        case_info: parsed.case_info,
        court_info: parsed.court_info,
        parties: parsed.parties,
        attorneys: parsed.attorneys,
        judge: parsed.judge,
        charges: parsed.charges,
        authorities: parsed.authorities,
        entities: parsed.entities,
        filing_date,
        event_date,
        hearing_date,
        decision_date,
        served_date,
        date_ranges: parsed.date_ranges,
        status: parsed.status,
        keywords: parsed.keywords,
        legal_tags: parsed.legal_tags,
        success: true,
        error: None,
        processing_time_ms: None,
        metadata: Default::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_response_fails_parsing() {
        let err = parse("", AdapterKind::Claude, anchor()).unwrap_err();
        assert!(matches!(err, ClassificationError::ResponseParsing(_)));
    }

    #[test]
    fn response_with_only_braces_yields_all_default_result() {
        let result = parse("{}", AdapterKind::Claude, anchor()).unwrap();
        assert!(result.success);
        assert_eq!(result.document_type, "other");
        assert_eq!(result.legal_category, "Civil Law");
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn ollama_default_confidence_is_lower() {
        let result = parse("{}", AdapterKind::Ollama, anchor()).unwrap();
        assert_eq!(result.confidence, 0.3);
    }

    #[test]
    fn prose_wrapped_json_parses_via_bracket_span() {
        let raw = r#"Sure, here is the result:
        {"document_type": "order", "legal_category": "Civil Law", "subject": "An order", "summary": "", "confidence": 0.9}
        Hope that helps!"#;
        let result = parse(raw, AdapterKind::Claude, anchor()).unwrap();
        assert_eq!(result.document_type, "order");
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn unknown_document_type_is_coerced_to_other_with_penalty() {
        let raw = r#"{"document_type": "subpoena", "confidence": 0.8}"#;
        let result = parse(raw, AdapterKind::Claude, anchor()).unwrap();
        assert_eq!(result.document_type, "other");
        assert!((result.confidence - 0.64).abs() < 1e-6);
        assert_eq!(result.legal_category, "Civil Law");
    }

    #[test]
    fn ollama_coercion_uses_lower_penalty() {
        let raw = r#"{"document_type": "subpoena", "confidence": 0.8}"#;
        let result = parse(raw, AdapterKind::Ollama, anchor()).unwrap();
        assert!((result.confidence - 0.56).abs() < 1e-6);
    }

    #[test]
    fn invalid_filing_date_is_rejected_but_decision_date_kept() {
        let raw = r#"{"document_type": "order", "filing_date": "2099-01-01", "decision_date": "2024-01-10"}"#;
        let result = parse(raw, AdapterKind::Claude, anchor()).unwrap();
        assert_eq!(result.filing_date, None);
        assert_eq!(result.decision_date.as_deref(), Some("2024-01-10"));
    }

    #[test]
    fn happy_path_preserves_both_dates() {
        let raw = r#"{"document_type":"motion_to_suppress","legal_category":"Criminal Law","subject":"Motion to suppress evidence","confidence":0.9,"filing_date":"2024-03-15","hearing_date":"2024-04-20","summary":""}"#;
        let result = parse(raw, AdapterKind::Claude, anchor()).unwrap();
        assert!(result.success);
        assert_eq!(result.document_type, "motion_to_suppress");
        assert_eq!(result.filing_date.as_deref(), Some("2024-03-15"));
        assert_eq!(result.hearing_date.as_deref(), Some("2024-04-20"));
    }

    #[test]
    fn subject_synthesized_from_first_sentence_when_absent() {
        let raw = r#"{"document_type":"order","summary":"Defendant moves to suppress certain evidence obtained without a warrant. Additional facts follow."}"#;
        let result = parse(raw, AdapterKind::Claude, anchor()).unwrap();
        assert!(result.subject.starts_with("Defendant moves"));
    }

    #[test]
    fn parse_is_idempotent_on_a_valid_result() {
        let raw = r#"{"document_type":"order","legal_category":"Civil Law","subject":"An order","summary":"Summary text.","confidence":0.7,"success":true}"#;
        let first = parse(raw, AdapterKind::Claude, anchor()).unwrap();
        let reserialized = serde_json::to_string(&first).unwrap();
        let second = parse(&reserialized, AdapterKind::Claude, anchor()).unwrap();
        assert_eq!(first.document_type, second.document_type);
        assert_eq!(first.subject, second.subject);
        assert_eq!(first.confidence, second.confidence);
    }
}
