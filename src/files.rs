//! Upload storage — file-name sanitization, validation, and persistence.
//!
//! Uploaded prescriptions land under `{uploads_dir}/{user_id}/{uuid12}_{name}{ext}`.
//! Validation happens before any scan row is created, so a rejected file
//! leaves no trace in the store.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{ALLOWED_UPLOAD_EXTENSIONS, MAX_UPLOAD_BYTES};

#[derive(Error, Debug)]
pub enum FileError {
    #[error("Missing file name")]
    MissingName,

    #[error("Unsupported file type '{0}' (allowed: jpg, jpeg, png, pdf)")]
    UnsupportedExtension(String),

    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Strip path components and unusual characters from a client file name.
pub fn sanitize_file_name(name: &str) -> String {
    let name = name.trim();
    let name = name
        .replace('\\', "/")
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string();
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        format!("file_{}", uuid::Uuid::new_v4().simple())
    } else {
        cleaned
    }
}

/// Lowercased extension including the dot, or empty when absent.
pub fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

pub fn validate_extension(name: &str) -> Result<(), FileError> {
    let ext = file_extension(name);
    if ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(FileError::UnsupportedExtension(ext))
    }
}

pub fn validate_size(size: usize) -> Result<(), FileError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(FileError::TooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Validate and persist an upload; returns the stored path.
pub fn store_upload(
    base_dir: &Path,
    user_id: i64,
    original_name: &str,
    contents: &[u8],
) -> Result<PathBuf, FileError> {
    if original_name.trim().is_empty() {
        return Err(FileError::MissingName);
    }
    validate_extension(original_name)?;
    validate_size(contents.len())?;

    let safe = sanitize_file_name(original_name);
    let ext = file_extension(&safe);
    let stem = safe
        .strip_suffix(&ext)
        .unwrap_or(&safe)
        .to_string();
    let unique = uuid::Uuid::new_v4().simple().to_string();
    let file_name = format!("{}_{stem}{ext}", &unique[..12]);

    let user_dir = base_dir.join(user_id.to_string());
    std::fs::create_dir_all(&user_dir)?;

    let dest = user_dir.join(file_name);
    std::fs::write(&dest, contents)?;
    Ok(dest)
}
