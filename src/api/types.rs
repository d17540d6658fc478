//! Shared types for the API layer.

use std::path::PathBuf;
use std::sync::Arc;

use crate::pipeline::ScanPipeline;

/// Shared context for all API routes and middleware.
///
/// Carries the database path rather than connections; every request opens
/// its own connection, so nothing here needs interior mutability.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: Arc<PathBuf>,
    pub pipeline: Arc<ScanPipeline>,
}

impl ApiContext {
    pub fn new(db_path: PathBuf, pipeline: ScanPipeline) -> Self {
        Self {
            db_path: Arc::new(db_path),
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Authenticated user, injected into request extensions by the auth
/// middleware after the bearer token resolves.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: i64,
    pub username: String,
}

/// Hash a bearer token with SHA-256, hex-encoded to match the stored
/// `users.token_hash` text.
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_token_is_deterministic() {
        assert_eq!(hash_token("test"), hash_token("test"));
    }

    #[test]
    fn hash_token_differs_for_different_inputs() {
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }

    #[test]
    fn hash_token_is_lowercase_hex() {
        let hash = hash_token("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }
}
