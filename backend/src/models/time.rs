use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::*;

/// UTC point on the timeline. Everything handed to or read from the record
/// store is expressed in this type.
pub type Instant = chrono::DateTime<chrono::Utc>;

/// Wall-clock date and time in the dashboard's configured civil timezone.
///
/// Carries no offset on purpose: it only becomes an [`Instant`] through
/// `TimestampNormalizer::local_to_utc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalCivilTime(NaiveDateTime);

impl LocalCivilTime {
    /// Combine a form's date and time inputs.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self(date.and_time(time))
    }

    /// Build from calendar components. Returns `None` for impossible dates.
    pub fn from_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, min, sec)?;
        Some(Self::new(date, time))
    }

    pub fn from_naive(naive: NaiveDateTime) -> Self {
        Self(naive)
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    /// Same wall-clock value with seconds and sub-seconds dropped.
    ///
    /// Entry forms only collect minutes, so comparisons against "now" happen
    /// at this granularity.
    pub fn truncated_to_minute(&self) -> Self {
        let time = self.0.time();
        let minute = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
        Self(self.0.date().and_time(minute))
    }
}

impl From<NaiveDateTime> for LocalCivilTime {
    fn from(naive: NaiveDateTime) -> Self {
        Self::from_naive(naive)
    }
}

impl std::fmt::Display for LocalCivilTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::LocalCivilTime;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_local_civil_time_new() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let time = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        let local = LocalCivilTime::new(date, time);

        assert_eq!(local.date(), date);
        assert_eq!(local.time(), time);
    }

    #[test]
    fn test_from_ymd_hms_rejects_impossible_dates() {
        assert!(LocalCivilTime::from_ymd_hms(2024, 2, 30, 0, 0, 0).is_none());
        assert!(LocalCivilTime::from_ymd_hms(2024, 1, 1, 24, 0, 0).is_none());
        assert!(LocalCivilTime::from_ymd_hms(2024, 2, 29, 23, 59, 59).is_some());
    }

    #[test]
    fn test_truncated_to_minute() {
        let local = LocalCivilTime::from_ymd_hms(2024, 6, 1, 8, 15, 42).unwrap();
        let truncated = local.truncated_to_minute();

        assert_eq!(truncated, LocalCivilTime::from_ymd_hms(2024, 6, 1, 8, 15, 0).unwrap());
    }

    #[test]
    fn test_ordering_follows_wall_clock() {
        let earlier = LocalCivilTime::from_ymd_hms(2024, 6, 1, 8, 15, 0).unwrap();
        let later = LocalCivilTime::from_ymd_hms(2024, 6, 1, 8, 16, 0).unwrap();

        assert!(earlier < later);
    }

    #[test]
    fn test_display() {
        let local = LocalCivilTime::from_ymd_hms(2024, 1, 5, 7, 3, 9).unwrap();
        assert_eq!(local.to_string(), "2024-01-05 07:03:09");
    }
}
