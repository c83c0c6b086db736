//! Date comparator and status derivation over a project's collection window.
//!
//! The window is the closed interval `[start, end]`: a project is `Collecting`
//! at exactly its start instant and still `Collecting` at exactly its end
//! instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{FundingError, Result};
use crate::types::ProjectStatus;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Derive `Draft`, `Collecting` or `Closed` from the window and `now`.
pub fn calculate_project_status(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ProjectStatus {
    if !is_project_started(start, now) {
        ProjectStatus::Draft
    } else if is_project_ended(end, now) {
        ProjectStatus::Closed
    } else {
        ProjectStatus::Collecting
    }
}

/// [`calculate_project_status`] against the wall clock.
pub fn calculate_project_status_now(start: DateTime<Utc>, end: DateTime<Utc>) -> ProjectStatus {
    calculate_project_status(start, end, Utc::now())
}

/// String entry point: both dates are parsed with [`parse_instant`] and a
/// malformed one is an error, never a silent `Collecting`.
pub fn calculate_project_status_str(
    start: &str,
    end: &str,
    now: DateTime<Utc>,
) -> Result<ProjectStatus> {
    let start = parse_instant(start)?;
    let end = parse_instant(end)?;
    Ok(calculate_project_status(start, end, now))
}

pub fn is_project_started(start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= start
}

pub fn is_project_ended(end: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > end
}

pub fn is_project_in_progress(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    is_project_started(start, now) && !is_project_ended(end, now)
}

/// Whole days until the window opens, rounded up. Negative once it has opened.
pub fn days_until_start(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ceil_days((start - now).num_milliseconds())
}

/// Whole days until the window closes, rounded up. Negative once it has closed.
pub fn days_until_end(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ceil_days((end - now).num_milliseconds())
}

fn ceil_days(millis: i64) -> i64 {
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

/// Parse a wire date into an absolute instant.
///
/// Accepted forms:
/// * RFC 3339 (`2025-01-15T09:30:00Z`, `2025-01-15T18:30:00+09:00`)
/// * offset-less date-time, read as UTC (`2025-01-15T09:30:00`, `2025-01-15 09:30:00.250`)
/// * bare date, read as UTC midnight (`2025-01-15`)
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    Err(FundingError::InvalidDate(raw.to_string()))
}
