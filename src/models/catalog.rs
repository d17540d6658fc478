//! Master/reference entities, created lazily at save time and shared
//! across users.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disease {
    pub id: i64,
    pub name: String,
    pub icd_code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drug {
    pub id: i64,
    pub name: String,
    pub manufacturer: Option<String>,
}
