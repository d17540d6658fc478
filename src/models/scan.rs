use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::ScanStatus;

/// One uploaded prescription/diagnosis document and its extracted fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanDocument {
    pub id: i64,
    pub owner_id: i64,
    pub status: ScanStatus,
    pub file_path: Option<String>,
    pub analyzed_at: Option<NaiveDateTime>,
    pub document_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub drug_names: Vec<String>,
    pub raw_text: Option<String>,
    pub raw_payload: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
}

/// A manual correction. Only fields the client actually sent are applied;
/// `None` means "leave unchanged", never "clear".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanCorrection {
    pub document_date: Option<String>,
    pub diagnosis: Option<String>,
    pub drug_names: Option<Vec<String>>,
}
