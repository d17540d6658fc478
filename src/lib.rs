//! Mediscan — personal health-management backend.
//!
//! Prescription scans enter through upload, get analyzed by an OCR
//! provider, can be corrected by hand, and are finally reconciled into
//! prescriptions plus daily medication/health checklists. Everything is
//! served over a bearer-authenticated JSON API backed by SQLite.

pub mod api;
pub mod config;
pub mod dates;
pub mod db;
pub mod files;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod tracking;
