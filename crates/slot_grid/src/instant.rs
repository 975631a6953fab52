//! Serialized form of slot instants.
//!
//! Renderers attach `format_instant(slot.instant)` to whatever element
//! represents a slot and later hand the same string back to
//! [`crate::SlotAssignment::get_by_key`]. The form is RFC 3339 in UTC with a
//! `Z` suffix, and parsing it yields the exact same instant.

use crate::error::{Result, SlotGridError};
use chrono::{DateTime, SecondsFormat, Utc};

pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses an RFC 3339 timestamp. Offsets other than `Z` are accepted and
/// converted to UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| SlotGridError::InvalidInstant {
            value: value.to_string(),
            source,
        })
}
