//! Normalization of platform timestamps to naive UTC.
//!
//! Every timestamp that enters a [`Post`](crate::models::Post) or a date
//! window goes through [`normalize`], so range comparisons always happen
//! between values in the same representation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized timestamp format: {0:?}")]
pub struct TimestampError(pub String);

/// Naive formats tried after the offset-carrying ones fail.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Formats with a numeric offset that RFC 3339 parsing rejects (`+0000`).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parse an ISO-8601 style timestamp into naive UTC.
///
/// Values carrying a UTC offset are shifted to UTC and the offset is dropped.
/// Values without an offset are taken as already being UTC. A bare date maps
/// to midnight.
///
/// # Errors
///
/// Returns [`TimestampError`] if no supported format matches.
pub fn normalize(raw: &str) -> Result<NaiveDateTime, TimestampError> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.naive_utc());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }

    Err(TimestampError(raw.to_string()))
}
