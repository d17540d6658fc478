//! OCR integration — wire client, response types, and the pure result parser.

pub mod client;
pub mod parser;
pub mod types;

pub use client::{ClovaOcrClient, MockOcrClient, OcrClient};
pub use parser::{parse_ocr_result, ExtractedFields};

use thiserror::Error;

/// Failure taxonomy for a single OCR call. Variants are mutually exclusive
/// and terminal for the call — the client never retries; the caller decides
/// whether to trigger another analysis.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR request timed out after {0}s")]
    Timeout(u64),

    #[error("OCR auth failed (check secret key)")]
    AuthFailure,

    #[error("OCR rate limited")]
    RateLimited,

    #[error("OCR bad request: {0}")]
    BadRequest(String),

    #[error("OCR server error (status {0})")]
    ServerError(u16),

    #[error("OCR endpoint unreachable: {0}")]
    Transport(String),

    #[error("OCR response unreadable: {0}")]
    InvalidResponse(String),

    #[error("OCR not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Cannot read upload for OCR: {0}")]
    FileRead(String),
}
