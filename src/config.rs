use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Mediscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Accepted upload extensions (lowercase, with leading dot).
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".pdf"];

/// Maximum upload size (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// OCR request timeout in seconds.
pub const OCR_TIMEOUT_SECS: u64 = 30;

/// Default server bind address when `MEDISCAN_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8800";

/// Get the application data directory.
/// `MEDISCAN_DATA` overrides; otherwise ~/Mediscan on all platforms.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MEDISCAN_DATA") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Mediscan")
}

/// Get the uploads directory.
pub fn uploads_dir() -> PathBuf {
    app_data_dir().join("uploads")
}

/// Path of the service database file.
pub fn database_path() -> PathBuf {
    app_data_dir().join("mediscan.db")
}

/// OCR provider base URL (`MEDISCAN_OCR_URL`).
pub fn ocr_api_url() -> Option<String> {
    std::env::var("MEDISCAN_OCR_URL").ok()
}

/// OCR shared secret (`MEDISCAN_OCR_SECRET`).
pub fn ocr_secret() -> Option<String> {
    std::env::var("MEDISCAN_OCR_SECRET").ok()
}

/// Server bind address (`MEDISCAN_ADDR`, falls back to the default).
pub fn bind_addr() -> String {
    std::env::var("MEDISCAN_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

/// Dev bootstrap token (`MEDISCAN_BOOTSTRAP_TOKEN`). When set, startup
/// ensures a `local` user whose token hash matches it.
pub fn bootstrap_token() -> Option<String> {
    std::env::var("MEDISCAN_BOOTSTRAP_TOKEN").ok()
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,mediscan=debug".to_string()
}
