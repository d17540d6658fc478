//! Wire shapes for the OCR provider.
//!
//! The provider's response varies by product and version, so only the
//! fields this service consumes are typed; everything else survives in the
//! raw `serde_json::Value` kept on the scan for audit.

use serde::{Deserialize, Serialize};

/// Request sidecar sent as the `message` multipart part.
#[derive(Debug, Serialize)]
pub struct OcrRequestMessage {
    pub version: &'static str,
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub timestamp: i64,
    pub images: Vec<OcrRequestImage>,
}

#[derive(Debug, Serialize)]
pub struct OcrRequestImage {
    pub format: String,
    pub name: String,
}

/// The subset of the response the parser walks. Unknown fields are ignored
/// here and preserved in the raw payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrResponseBody {
    #[serde(default)]
    pub images: Vec<OcrImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrImage {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<OcrField>,
}

/// Smallest recognition unit (word/token/block).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrField {
    #[serde(default, rename = "inferText")]
    pub infer_text: Option<String>,
    #[serde(default, rename = "inferConfidence")]
    pub infer_confidence: Option<f64>,
}
