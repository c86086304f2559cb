//! Timestamp normalization between the dashboard's civil timezone and UTC.
//!
//! The record store only ever sees UTC. Operators type wall-clock values in
//! the configured zone, and analysts read values back in that zone:
//!
//! ```text
//!   form input (local)  ──► ValueGate ──► local_to_utc ──► record store (UTC text)
//!   record store (text) ──► parse_timestamp_text ──► utc_to_local ──► display
//! ```
//!
//! - [`parser`]: tolerant parsing of the textual forms the store hands back
//! - [`normalizer`]: [`TimestampNormalizer`], local/UTC conversion and display
//! - [`error`]: typed parse and timezone failures

pub mod error;
pub mod normalizer;
pub mod parser;

pub use error::{DisplayFormatError, TimestampParseError, TimezoneError};
pub use normalizer::{
    to_store_text, validate_display_format, AsInstant, TimestampNormalizer,
    DEFAULT_DISPLAY_FORMAT, DEFAULT_TIMEZONE,
};
pub use parser::{match_timestamp_pattern, parse_timestamp_text, TimestampPattern, TIMESTAMP_PATTERNS};
