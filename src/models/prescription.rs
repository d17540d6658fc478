use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub owner_id: i64,
    pub disease_id: Option<i64>,
    pub drug_id: Option<i64>,
    pub dose_count: Option<i64>,
    pub dose_amount: Option<String>,
    pub dose_unit: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

/// Insert payload; the id comes from the database.
#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub owner_id: i64,
    pub disease_id: Option<i64>,
    pub drug_id: Option<i64>,
    pub dose_count: Option<i64>,
    pub dose_amount: Option<String>,
    pub dose_unit: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
