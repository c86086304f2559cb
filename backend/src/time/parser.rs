//! Tolerant parsing of timestamp text coming back from the record store.
//!
//! The hosted backend and older rows disagree on how an instant is written:
//! with or without fractional seconds, `Z` or a numeric offset, a `T` or a
//! space between date and time, and sometimes no offset at all. Rows without
//! an offset are UTC by convention, since the store never receives local time.
//!
//! Patterns are tried in the fixed order of [`TIMESTAMP_PATTERNS`], from the
//! most specific (explicit offset) to the least specific (minute precision,
//! no offset). The first pattern that consumes the whole input wins.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use log::trace;

use super::error::TimestampParseError;
use crate::models::Instant;

/// One entry of the parsing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampPattern {
    /// Short name used in logs and tests.
    pub name: &'static str,
    /// chrono `strftime`-style format. `%.f` accepts an optional fraction of
    /// up to nanosecond precision.
    pub format: &'static str,
    /// Whether the pattern requires an explicit UTC offset. Patterns without
    /// one are read as UTC.
    pub carries_offset: bool,
}

/// Recognized timestamp encodings, in priority order.
pub const TIMESTAMP_PATTERNS: &[TimestampPattern] = &[
    // 2024-01-15T10:30:00.123456+02:00
    TimestampPattern {
        name: "extended_offset",
        format: "%Y-%m-%dT%H:%M:%S%.f%:z",
        carries_offset: true,
    },
    // 2024-01-15T10:30:00+0200
    TimestampPattern {
        name: "basic_offset",
        format: "%Y-%m-%dT%H:%M:%S%.f%z",
        carries_offset: true,
    },
    // 2024-01-15 10:30:00.5+00 (SQL text output)
    TimestampPattern {
        name: "sql_offset",
        format: "%Y-%m-%d %H:%M:%S%.f%#z",
        carries_offset: true,
    },
    // 2024-01-15T10:30:00.123456
    TimestampPattern {
        name: "naive",
        format: "%Y-%m-%dT%H:%M:%S%.f",
        carries_offset: false,
    },
    // 2024-01-15 10:30:00
    TimestampPattern {
        name: "sql_naive",
        format: "%Y-%m-%d %H:%M:%S%.f",
        carries_offset: false,
    },
    // 2024-01-15T10:30 (datetime-local form value)
    TimestampPattern {
        name: "naive_minutes",
        format: "%Y-%m-%dT%H:%M",
        carries_offset: false,
    },
];

/// Parse timestamp text into a UTC instant.
///
/// # Errors
/// * [`TimestampParseError::EmptyInput`] for empty or whitespace-only text
/// * [`TimestampParseError::UnparseableFormat`] when no pattern matches
///
/// # Example
/// ```
/// use biogas_backend::time::parse_timestamp_text;
///
/// let a = parse_timestamp_text("2024-01-15T10:30:00Z").unwrap();
/// let b = parse_timestamp_text("2024-01-15T10:30:00+00:00").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_timestamp_text(text: &str) -> Result<Instant, TimestampParseError> {
    match_timestamp_pattern(text).map(|(instant, _)| instant)
}

/// Like [`parse_timestamp_text`], also reporting which pattern matched.
pub fn match_timestamp_pattern(
    text: &str,
) -> Result<(Instant, &'static TimestampPattern), TimestampParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TimestampParseError::EmptyInput);
    }

    let normalized = normalize_zulu(trimmed);

    for pattern in TIMESTAMP_PATTERNS {
        if let Some(instant) = try_pattern(&normalized, pattern) {
            trace!("timestamp '{}' matched pattern {}", trimmed, pattern.name);
            return Ok((instant, pattern));
        }
    }

    Err(TimestampParseError::UnparseableFormat {
        input: trimmed.to_string(),
    })
}

/// A trailing `Z` designator means `+00:00`.
fn normalize_zulu(text: &str) -> String {
    match text.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => text.to_string(),
    }
}

fn try_pattern(text: &str, pattern: &TimestampPattern) -> Option<Instant> {
    if pattern.carries_offset {
        DateTime::parse_from_str(text, pattern.format)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    } else {
        NaiveDateTime::parse_from_str(text, pattern.format)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}
