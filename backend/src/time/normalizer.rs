//! Conversion between the configured civil timezone and UTC.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat,
    SubsecRound, TimeZone, Utc,
};
use chrono_tz::Tz;

use super::error::{DisplayFormatError, TimestampParseError, TimezoneError};
use super::parser::parse_timestamp_text;
use crate::models::{Instant, LocalCivilTime};

/// Zone used when nothing is configured: the research site's local time.
pub const DEFAULT_TIMEZONE: &str = "Europe/Kiev";

/// Display pattern used by tables, exports and record lists.
pub const DEFAULT_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Anything that designates a point on the UTC timeline.
///
/// Offset-tagged values are converted; untagged (naive) values are taken to
/// already be UTC, which is how the store writes them.
pub trait AsInstant {
    fn as_instant(&self) -> Instant;
}

impl<Z: TimeZone> AsInstant for DateTime<Z> {
    fn as_instant(&self) -> Instant {
        self.with_timezone(&Utc)
    }
}

impl AsInstant for NaiveDateTime {
    fn as_instant(&self) -> Instant {
        Utc.from_utc_datetime(self)
    }
}

/// Converts wall-clock values in one fixed IANA zone to and from UTC.
///
/// The zone is chosen at construction and never changes afterwards; the
/// normalizer is `Clone + Send + Sync` and is shared by value.
///
/// # DST transitions
///
/// `local_to_utc` never fails. Wall-clock values that the zone's rules make
/// ambiguous or impossible resolve as follows:
///
/// - **Repeated hour** (clocks fall back): the earlier of the two instants,
///   i.e. the reading is taken to be on the daylight-saving offset.
/// - **Skipped hour** (clocks spring forward): the offset in force before the
///   transition is applied, so the value lands one gap-length later on the
///   wall clock (03:30 in Kyiv on 2024-03-31 becomes 04:30 EEST).
/// - **Out of range**: at the edges of the representable calendar, where no
///   offset can be applied without overflowing, the value is taken as UTC.
///
/// The store keeps microseconds, so conversions truncate anything finer.
///
/// # Example
/// ```
/// use biogas_backend::models::LocalCivilTime;
/// use biogas_backend::time::TimestampNormalizer;
///
/// let normalizer = TimestampNormalizer::from_zone_name("Europe/Kiev").unwrap();
/// let local = LocalCivilTime::from_ymd_hms(2024, 7, 1, 12, 0, 0).unwrap();
/// let utc = normalizer.local_to_utc(local);
/// assert_eq!(utc.to_rfc3339(), "2024-07-01T09:00:00+00:00");
/// assert_eq!(normalizer.utc_to_local(utc), local);
/// ```
#[derive(Debug, Clone)]
pub struct TimestampNormalizer {
    zone: Tz,
    display_format: String,
}

impl TimestampNormalizer {
    pub fn new(zone: Tz) -> Self {
        Self {
            zone,
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }

    /// Build from an IANA identifier such as `"Europe/Kiev"`.
    pub fn from_zone_name(name: &str) -> Result<Self, TimezoneError> {
        let zone = name.trim().parse::<Tz>().map_err(|_| TimezoneError {
            name: name.to_string(),
        })?;
        Ok(Self::new(zone))
    }

    /// Override the pattern used by [`format_display`](Self::format_display).
    pub fn with_display_format(mut self, pattern: impl Into<String>) -> Self {
        self.display_format = pattern.into();
        self
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn zone_name(&self) -> &'static str {
        self.zone.name()
    }

    pub fn display_format(&self) -> &str {
        &self.display_format
    }

    /// Interpret a wall-clock value in the configured zone and return the
    /// equivalent UTC instant, using the zone's offset rules on that date.
    pub fn local_to_utc(&self, local: LocalCivilTime) -> Instant {
        let naive = local.naive().trunc_subsecs(6);
        match self.zone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(first, second) => {
                let first = first.with_timezone(&Utc);
                let second = second.with_timezone(&Utc);
                first.min(second)
            }
            LocalResult::None => {
                let utc = naive
                    .checked_sub_signed(self.offset_before(naive))
                    .unwrap_or(naive);
                Utc.from_utc_datetime(&utc)
            }
        }
    }

    /// Wall-clock value in the configured zone for the given instant.
    pub fn utc_to_local<T: AsInstant>(&self, instant: T) -> LocalCivilTime {
        LocalCivilTime::from_naive(self.utc_to_zoned(instant).naive_local())
    }

    /// Same as [`utc_to_local`](Self::utc_to_local) but keeps the zone tag.
    pub fn utc_to_zoned<T: AsInstant>(&self, instant: T) -> DateTime<Tz> {
        instant.as_instant().with_timezone(&self.zone)
    }

    /// Parse store text and convert it straight to wall-clock time.
    pub fn parse_to_local(&self, text: &str) -> Result<LocalCivilTime, TimestampParseError> {
        parse_timestamp_text(text).map(|instant| self.utc_to_local(instant))
    }

    /// Render an instant in local time with a strftime-style pattern.
    ///
    /// A pattern chrono cannot render falls back to the default display
    /// pattern instead of failing the whole response.
    pub fn format_local<T: AsInstant>(&self, instant: T, pattern: &str) -> String {
        let zoned = self.utc_to_zoned(instant);
        let mut out = String::new();
        if write!(out, "{}", zoned.format(pattern)).is_err() {
            log::warn!("Unrenderable display pattern '{}'", pattern);
            return zoned.format(DEFAULT_DISPLAY_FORMAT).to_string();
        }
        out
    }

    /// Render an instant with the configured display pattern.
    pub fn format_display<T: AsInstant>(&self, instant: T) -> String {
        self.format_local(instant, &self.display_format)
    }

    pub fn now_utc(&self) -> Instant {
        Utc::now()
    }

    pub fn now_local(&self) -> LocalCivilTime {
        self.utc_to_local(Utc::now())
    }

    /// UTC bounds covering one local calendar day: its first instant and its
    /// last microsecond. Days that are 23 or 25 hours long are handled.
    pub fn local_day_bounds(&self, date: NaiveDate) -> (Instant, Instant) {
        let start = self.local_to_utc(LocalCivilTime::new(date, NaiveTime::MIN));
        let end = match date.succ_opt() {
            Some(next) => {
                let next_start = self.local_to_utc(LocalCivilTime::new(next, NaiveTime::MIN));
                next_start
                    .checked_sub_signed(Duration::microseconds(1))
                    .unwrap_or(next_start)
            }
            None => {
                let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
                self.local_to_utc(LocalCivilTime::new(date, last))
            }
        };
        (start, end)
    }

    /// Canonical text handed to the record store, e.g.
    /// `2024-01-15T08:30:00.123456Z`.
    pub fn to_store_text<T: AsInstant>(&self, instant: T) -> String {
        to_store_text(&instant.as_instant())
    }

    /// Offset in force shortly before `naive`, read as if `naive` were UTC.
    /// Used to place wall-clock values that fall inside a skipped hour.
    fn offset_before(&self, naive: NaiveDateTime) -> Duration {
        let earlier = naive.checked_sub_signed(Duration::days(1)).unwrap_or(naive);
        let offset = self.zone.offset_from_utc_datetime(&earlier).fix();
        Duration::seconds(i64::from(offset.local_minus_utc()))
    }
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Kiev)
    }
}

/// Canonical store form of an instant: RFC 3339, microseconds, `Z` suffix.
///
/// Precision is capped at the microsecond; nanoseconds are dropped, so only
/// instants already truncated (as [`TimestampNormalizer::local_to_utc`]
/// produces them) read back unchanged.
pub fn to_store_text(instant: &Instant) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Reject strftime patterns chrono cannot render, e.g. `%Q`.
pub fn validate_display_format(pattern: &str) -> Result<(), DisplayFormatError> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(DisplayFormatError {
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "normalizer_tests.rs"]
mod normalizer_tests;
