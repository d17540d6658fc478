use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

use super::types::{OcrRequestImage, OcrRequestMessage};
use super::OcrError;
use crate::config;

/// One synchronous OCR call per document. Implementations must not retry;
/// callers decide whether a failed scan gets analyzed again.
pub trait OcrClient {
    fn analyze(&self, file_path: &Path) -> Result<serde_json::Value, OcrError>;
}

/// HTTP client for the CLOVA General OCR endpoint.
#[derive(Debug)]
pub struct ClovaOcrClient {
    api_url: String,
    secret: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl ClovaOcrClient {
    pub fn new(api_url: &str, secret: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            secret: secret.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Build from `MEDISCAN_OCR_URL` / `MEDISCAN_OCR_SECRET` with the
    /// standard 30s timeout.
    pub fn from_env() -> Result<Self, OcrError> {
        let api_url = config::ocr_api_url().ok_or(OcrError::NotConfigured("MEDISCAN_OCR_URL"))?;
        let secret = config::ocr_secret().ok_or(OcrError::NotConfigured("MEDISCAN_OCR_SECRET"))?;
        Ok(Self::new(&api_url, &secret, config::OCR_TIMEOUT_SECS))
    }
}

impl OcrClient for ClovaOcrClient {
    fn analyze(&self, file_path: &Path) -> Result<serde_json::Value, OcrError> {
        let contents = std::fs::read(file_path).map_err(|e| OcrError::FileRead(e.to_string()))?;

        let format = file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "jpg".to_string());
        let name = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("scan")
            .to_string();

        let message = OcrRequestMessage {
            version: "V2",
            request_id: Uuid::new_v4().to_string(),
            timestamp: 0,
            images: vec![OcrRequestImage {
                format: format.clone(),
                name: name.clone(),
            }],
        };
        let message_json =
            serde_json::to_string(&message).map_err(|e| OcrError::Transport(e.to_string()))?;

        let file_part = reqwest::blocking::multipart::Part::bytes(contents)
            .file_name(format!("{name}.{format}"))
            .mime_str("application/octet-stream")
            .map_err(|e| OcrError::Transport(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new()
            .text("message", message_json)
            .part("file", file_part);

        let response = self
            .client
            .post(&self.api_url)
            .header("X-OCR-SECRET", &self.secret)
            .multipart(form)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    OcrError::Transport(self.api_url.clone())
                } else if e.is_timeout() {
                    OcrError::Timeout(self.timeout_secs)
                } else {
                    OcrError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => OcrError::AuthFailure,
                429 => OcrError::RateLimited,
                code if (400..500).contains(&code) => {
                    OcrError::BadRequest(response.text().unwrap_or_default())
                }
                code => OcrError::ServerError(code),
            });
        }

        response
            .json()
            .map_err(|e| OcrError::InvalidResponse(e.to_string()))
    }
}

/// Mock OCR client for testing — returns a configurable payload, or a
/// configurable failure, and counts calls.
pub struct MockOcrClient {
    response: serde_json::Value,
    failure: Option<fn() -> OcrError>,
    calls: AtomicUsize,
}

impl MockOcrClient {
    pub fn new(response: serde_json::Value) -> Self {
        Self {
            response,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: fn() -> OcrError) -> Self {
        Self {
            response: serde_json::Value::Null,
            failure: Some(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrClient for MockOcrClient {
    fn analyze(&self, _file_path: &Path) -> Result<serde_json::Value, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make_error) = self.failure {
            return Err(make_error());
        }
        Ok(self.response.clone())
    }
}
