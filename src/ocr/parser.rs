//! Pure normalization of a raw provider payload into `ExtractedFields`.
//!
//! No I/O and no side effects: identical payloads always produce identical
//! output, which the pipeline relies on when re-running analysis.

use chrono::NaiveDate;
use regex::Regex;

use super::types::OcrResponseBody;

/// First `YYYY sep M[M] sep D[D]` occurrence wins; separators are `.`, `-`
/// or `/`, years are restricted to 20xx.
const DATE_PATTERN: &str = r"\b(20\d{2})[.\-/](0?[1-9]|1[0-2])[.\-/](0?[1-9]|[12]\d|3[01])\b";

/// Canonical extraction result. `diagnosis` and `drug_names` are always
/// empty for now — extraction is not implemented yet, and the shape is kept
/// fixed so rule- or model-based extraction can plug in without touching
/// the pipeline contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub document_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub drug_names: Vec<String>,
    pub full_text: String,
    pub raw_payload: serde_json::Value,
}

pub fn parse_ocr_result(raw: &serde_json::Value) -> ExtractedFields {
    let full_text = extract_full_text(raw);
    let document_date = extract_document_date(&full_text);

    ExtractedFields {
        document_date,
        diagnosis: None,
        drug_names: Vec::new(),
        full_text,
        raw_payload: raw.clone(),
    }
}

/// Concatenate every recognized token across every image, in document
/// order, single-space separated. A payload with no recognized text is
/// valid and yields an empty string.
pub fn extract_full_text(raw: &serde_json::Value) -> String {
    let body: OcrResponseBody = serde_json::from_value(raw.clone()).unwrap_or_default();

    let mut tokens: Vec<&str> = Vec::new();
    for image in &body.images {
        for field in &image.fields {
            if let Some(text) = field.infer_text.as_deref() {
                if !text.is_empty() {
                    tokens.push(text);
                }
            }
        }
    }
    tokens.join(" ")
}

/// First date-shaped substring, normalized to a calendar date. A regex
/// match that is not a real calendar date (e.g. Feb 30) yields `None`.
pub fn extract_document_date(text: &str) -> Option<NaiveDate> {
    let pattern = Regex::new(DATE_PATTERN).unwrap();
    let caps = pattern.captures(text)?;

    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
