use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A registered user. Token issuance lives outside this service; only the
/// SHA-256 hash of the bearer token is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub token_hash: String,
    pub created_at: NaiveDateTime,
}
