//! Canonical document types, legal categories, entity kinds, and the
//! `ClassificationResult` shape produced by the classification core.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ClassificationError;

/// Document types the model may return. Flat enumeration; conceptually
/// grouped into motions, orders/rulings, briefs/pleadings, and
/// administrative filings, but no grouping is encoded in the type system.
pub static DOCUMENT_TYPES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "motion_to_suppress",
        "motion_to_dismiss",
        "motion_for_summary_judgment",
        "motion_other",
        "order",
        "ruling",
        "judgment",
        "brief",
        "pleading",
        "complaint",
        "answer",
        "subpoena_response",
        "notice",
        "stipulation",
        "affidavit",
        "administrative_filing",
        "other",
    ]
});

pub static LEGAL_CATEGORIES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Criminal Law",
        "Civil Law",
        "Contract Law",
        "Family Law",
        "Administrative Law",
        "Constitutional Law",
        "Property Law",
        "Tax Law",
        "Labor Law",
        "Intellectual Property",
    ]
});

pub static ENTITY_KINDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "person",
        "organization",
        "court",
        "statute",
        "case_citation",
        "location",
        "date",
        "monetary_amount",
    ]
});

pub fn default_document_types() -> &'static [&'static str] {
    &DOCUMENT_TYPES
}

pub fn default_legal_categories() -> &'static [&'static str] {
    &LEGAL_CATEGORIES
}

pub fn default_entity_kinds() -> &'static [&'static str] {
    &ENTITY_KINDS
}

/// Lightweight context about the blob being classified. Immutable for the
/// lifetime of one classification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub file_name: String,
    pub file_type: String,
    pub size: u64,
    pub word_count: u32,
    pub page_count: u32,
    pub source_system: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseInfo {
    pub case_number: Option<String>,
    pub case_name: Option<String>,
    pub case_type: Option<String>,
    pub docket: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourtInfo {
    pub court_name: Option<String>,
    pub jurisdiction: Option<String>,
    pub level: Option<String>,
    pub county: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub role: Option<String>,
    pub party_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attorney {
    pub name: String,
    pub role: Option<String>,
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Judge {
    pub name: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Charge {
    pub statute: Option<String>,
    pub description: Option<String>,
    pub grade: Option<String>,
    pub class: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authority {
    pub citation: String,
    pub case_title: Option<String>,
    #[serde(rename = "type")]
    pub authority_type: Option<String>,
    pub precedent: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedEntity {
    pub text: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
    pub kind: String,
}

/// The structured output of one classification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub document_type: String,
    pub legal_category: String,
    pub subject: String,
    pub summary: String,
    pub confidence: f32,

    #[serde(default)]
    pub case_info: Option<CaseInfo>,
    #[serde(default)]
    pub court_info: Option<CourtInfo>,
    #[serde(default)]
    pub parties: Vec<Party>,
    #[serde(default)]
    pub attorneys: Vec<Attorney>,
    #[serde(default)]
    pub judge: Option<Judge>,
    #[serde(default)]
    pub charges: Vec<Charge>,
    #[serde(default)]
    pub authorities: Vec<Authority>,
    #[serde(default)]
    pub entities: Vec<NamedEntity>,

    #[serde(default)]
    pub filing_date: Option<String>,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub hearing_date: Option<String>,
    #[serde(default)]
    pub decision_date: Option<String>,
    #[serde(default)]
    pub served_date: Option<String>,
    #[serde(default)]
    pub date_ranges: Vec<DateRange>,

    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub legal_tags: Vec<String>,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Orchestrator-tracked state for one submitted batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: String,
    pub total_documents: u64,
    pub processed_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub indexed_count: u64,
    pub index_error_count: u64,
    pub percent_complete: f32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub status: BatchJobStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchJobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl BatchJobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BatchJobStatus::Completed | BatchJobStatus::Failed | BatchJobStatus::Cancelled
        )
    }
}

/// Enforces: `document_type` and `legal_category` are in the closed
/// taxonomy, `confidence` is in `[0, 1]`, and required fields are present.
pub fn validate(result: &ClassificationResult) -> Result<(), ClassificationError> {
    if !default_document_types().contains(&result.document_type.as_str()) {
        return Err(ClassificationError::Validation(format!(
            "document_type '{}' is not in the taxonomy",
            result.document_type
        )));
    }
    if !default_legal_categories().contains(&result.legal_category.as_str()) {
        return Err(ClassificationError::Validation(format!(
            "legal_category '{}' is not in the taxonomy",
            result.legal_category
        )));
    }
    if !(0.0..=1.0).contains(&result.confidence) {
        return Err(ClassificationError::Validation(format!(
            "confidence {} is outside [0, 1]",
            result.confidence
        )));
    }
    if result.subject.trim().is_empty() {
        return Err(ClassificationError::Validation(
            "subject must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_result() -> ClassificationResult {
        ClassificationResult {
            document_type: "order".to_string(),
            legal_category: "Civil Law".to_string(),
            subject: "An order".to_string(),
            summary: String::new(),
            confidence: 0.5,
            case_info: None,
            court_info: None,
            parties: vec![],
            attorneys: vec![],
            judge: None,
            charges: vec![],
            authorities: vec![],
            entities: vec![],
            filing_date: None,
            event_date: None,
            hearing_date: None,
            decision_date: None,
            served_date: None,
            date_ranges: vec![],
            status: None,
            keywords: vec![],
            legal_tags: vec![],
            success: true,
            error: None,
            processing_time_ms: None,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn validates_a_well_formed_result() {
        assert!(validate(&base_result()).is_ok());
    }

    #[test]
    fn rejects_unknown_document_type() {
        let mut r = base_result();
        r.document_type = "subpoena".to_string();
        assert!(validate(&r).is_err());
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let mut r = base_result();
        r.confidence = 1.5;
        assert!(validate(&r).is_err());
    }

    #[test]
    fn rejects_empty_subject() {
        let mut r = base_result();
        r.subject = "   ".to_string();
        assert!(validate(&r).is_err());
    }
}
