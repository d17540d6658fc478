//! Repository layer — entity-scoped database operations.
//!
//! Free functions over a borrowed `Connection`; callers own the connection
//! and any transaction it is enrolled in. Timestamps are stored as
//! `YYYY-MM-DD HH:MM:SS` text, dates as `YYYY-MM-DD`.

mod catalog;
mod prescriptions;
mod scans;
mod tracking;
mod users;

pub use catalog::*;
pub use prescriptions::*;
pub use scans::*;
pub use tracking::*;
pub use users::*;

use chrono::NaiveDateTime;

/// Current local time, truncated to whole seconds for stable storage text.
pub(crate) fn now_text() -> String {
    chrono::Local::now().naive_local().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub(crate) fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
