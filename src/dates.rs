//! Calendar-date helpers shared by the scan pipeline and tracking queries.
//!
//! All dates cross the API as `YYYY-MM-DD` strings and are stored in the
//! database in the same form (`NaiveDate` Display).

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Days covered by a history query when the caller gives no range (today inclusive).
const DEFAULT_RANGE_DAYS: i64 = 30;

#[derive(Error, Debug)]
pub enum DateError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidFormat(String),

    #[error("'to' date precedes 'from' date")]
    InvertedRange,
}

/// Parse a `YYYY-MM-DD` string into a `NaiveDate`.
pub fn parse_date(value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| DateError::InvalidFormat(value.to_string()))
}

/// All dates from `start` to `end`, both inclusive.
pub fn date_range_inclusive(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, DateError> {
    if end < start {
        return Err(DateError::InvertedRange);
    }
    let days = (end - start).num_days();
    Ok((0..=days).map(|i| start + Duration::days(i)).collect())
}

/// Resolve optional `from`/`to` query strings into a concrete date range.
///
/// - both absent: the last 30 days ending today
/// - only `from`: from..today
/// - only `to`: the 30 days ending at `to`
pub fn normalize_from_to(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(NaiveDate, NaiveDate), DateError> {
    let today = chrono::Local::now().date_naive();

    let (start, end) = match (from, to) {
        (None, None) => (today - Duration::days(DEFAULT_RANGE_DAYS - 1), today),
        (Some(f), None) => (parse_date(f)?, today),
        (None, Some(t)) => {
            let end = parse_date(t)?;
            (end - Duration::days(DEFAULT_RANGE_DAYS - 1), end)
        }
        (Some(f), Some(t)) => (parse_date(f)?, parse_date(t)?),
    };

    if end < start {
        return Err(DateError::InvertedRange);
    }
    Ok((start, end))
}
