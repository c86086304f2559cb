//! Tests for time module - store text parsing and local/UTC conversion.

use biogas_backend::models::LocalCivilTime;
use biogas_backend::time::{
    match_timestamp_pattern, parse_timestamp_text, to_store_text, TimestampNormalizer,
    TimestampParseError,
};
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

fn kyiv() -> TimestampNormalizer {
    TimestampNormalizer::from_zone_name("Europe/Kiev").unwrap()
}

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> LocalCivilTime {
    LocalCivilTime::from_ymd_hms(y, mo, d, h, mi, 0).unwrap()
}

// =========================================================
// Parsing
// =========================================================

#[test]
fn test_every_store_encoding_reads_back_the_same_instant() {
    let expected = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap();
    let inputs = [
        "2024-01-15T08:30:00Z",
        "2024-01-15T08:30:00.000000Z",
        "2024-01-15T08:30:00+00:00",
        "2024-01-15T10:30:00+02:00",
        "2024-01-15T10:30:00+0200",
        "2024-01-15 08:30:00+00",
        "2024-01-15T08:30:00",
        "2024-01-15 08:30:00",
        "2024-01-15T08:30",
    ];

    for input in inputs {
        assert_eq!(
            parse_timestamp_text(input).unwrap(),
            expected,
            "input {input}"
        );
    }
}

#[test]
fn test_parse_errors_are_typed() {
    assert_eq!(parse_timestamp_text(""), Err(TimestampParseError::EmptyInput));
    assert_eq!(parse_timestamp_text("  "), Err(TimestampParseError::EmptyInput));

    let err = parse_timestamp_text("15/01/2024 08:30").unwrap_err();
    assert!(matches!(err, TimestampParseError::UnparseableFormat { .. }));
    assert!(err.to_string().contains("15/01/2024 08:30"));
}

#[test]
fn test_matched_pattern_reports_offset_presence() {
    let (_, with_offset) = match_timestamp_pattern("2024-01-15T08:30:00.25+03:00").unwrap();
    assert!(with_offset.carries_offset);

    let (_, without_offset) = match_timestamp_pattern("2024-01-15 08:30:00.25").unwrap();
    assert!(!without_offset.carries_offset);
}

// =========================================================
// Conversion
// =========================================================

#[test]
fn test_winter_and_summer_offsets() {
    let normalizer = kyiv();

    let winter = normalizer.local_to_utc(local(2024, 1, 15, 12, 30));
    assert_eq!(winter, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());

    let summer = normalizer.local_to_utc(local(2024, 7, 15, 12, 30));
    assert_eq!(summer, Utc.with_ymd_and_hms(2024, 7, 15, 9, 30, 0).unwrap());
}

#[test]
fn test_skipped_hour_uses_offset_before_transition() {
    // 03:00 jumps to 04:00 on 2024-03-31; 03:30 never happens on the wall.
    let utc = kyiv().local_to_utc(local(2024, 3, 31, 3, 30));
    assert_eq!(utc, Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap());
}

#[test]
fn test_repeated_hour_takes_earlier_instant() {
    // 04:00 falls back to 03:00 on 2024-10-27; 03:30 happens twice.
    let utc = kyiv().local_to_utc(local(2024, 10, 27, 3, 30));
    assert_eq!(utc, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
}

#[test]
fn test_store_text_is_canonical() {
    let normalizer = kyiv();
    let utc = normalizer.local_to_utc(local(2024, 1, 15, 10, 30));

    assert_eq!(normalizer.to_store_text(utc), "2024-01-15T08:30:00.000000Z");
    assert_eq!(to_store_text(&utc), "2024-01-15T08:30:00.000000Z");
    assert_eq!(parse_timestamp_text(&to_store_text(&utc)).unwrap(), utc);
}

#[test]
fn test_parse_to_local_and_display() {
    let normalizer = kyiv().with_display_format("%d.%m.%Y %H:%M");

    let local = normalizer.parse_to_local("2024-07-01T09:00:00Z").unwrap();
    assert_eq!(local, self::local(2024, 7, 1, 12, 0));

    let instant = Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap();
    assert_eq!(normalizer.format_display(instant), "01.07.2024 12:00");
}

#[test]
fn test_local_day_bounds_on_short_day() {
    let normalizer = kyiv();
    let (start, end) = normalizer.local_day_bounds(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());

    assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 30, 22, 0, 0).unwrap());
    assert_eq!(
        to_store_text(&end),
        "2024-03-31T20:59:59.999999Z",
        "23-hour day ends at the next local midnight minus one microsecond"
    );
}

#[test]
fn test_unknown_zone_rejected() {
    let err = TimestampNormalizer::from_zone_name("Mars/Olympus").unwrap_err();
    assert_eq!(err.name, "Mars/Olympus");
}

// =========================================================
// Properties
// =========================================================

/// Local times in Kyiv, kept away from the last Sunday of March and October.
fn unambiguous_local() -> impl Strategy<Value = LocalCivilTime> {
    (2000i32..2037, 1u32..13, 1u32..29, 0u32..24, 0u32..60, 0u32..60)
        .prop_filter("outside DST transitions", |(_, month, day, ..)| {
            !((*month == 3 || *month == 10) && *day >= 24)
        })
        .prop_map(|(y, mo, d, h, mi, s)| LocalCivilTime::from_ymd_hms(y, mo, d, h, mi, s).unwrap())
}

proptest! {
    #[test]
    fn prop_local_round_trip(local in unambiguous_local()) {
        let normalizer = kyiv();
        let utc = normalizer.local_to_utc(local);
        prop_assert_eq!(normalizer.utc_to_local(utc), local);
    }

    #[test]
    fn prop_instant_round_trip(secs in 946_684_800i64..2_145_916_800) {
        let normalizer = kyiv();
        let instant = Utc.timestamp_opt(secs, 0).unwrap();
        let local = normalizer.utc_to_local(instant);
        let month = local.date().month();
        prop_assume!(!((month == 3 || month == 10) && local.date().day() >= 24));
        prop_assert_eq!(normalizer.local_to_utc(local), instant);
    }

    #[test]
    fn prop_store_text_round_trip(secs in 946_684_800i64..2_145_916_800, micros in 0u32..1_000_000) {
        let instant = Utc.timestamp_opt(secs, micros * 1_000).unwrap();
        let text = to_store_text(&instant);
        prop_assert!(text.ends_with('Z'));
        prop_assert_eq!(parse_timestamp_text(&text).unwrap(), instant);
    }

    #[test]
    fn prop_local_to_utc_is_monotonic(a in unambiguous_local(), b in unambiguous_local()) {
        let normalizer = kyiv();
        if a <= b {
            prop_assert!(normalizer.local_to_utc(a) <= normalizer.local_to_utc(b));
        }
    }
}
