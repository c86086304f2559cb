//! Analyst data table: date-range presets, time sorting and pagination.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::{ServiceError, ServiceResult};
use crate::db::repository::FullRepository;
use crate::db::services;
use crate::models::{Instant, RecordFilter, RecordOrder, SensorId, SensorRecord};
use crate::time::TimestampNormalizer;

pub const DEFAULT_ROWS_PER_PAGE: usize = 50;

/// Quick filters offered above the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangePreset {
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    AllTime,
    /// Local calendar dates, both inclusive.
    Custom { start: NaiveDate, end: NaiveDate },
}

impl DateRangePreset {
    /// Build a preset from its query-string name; `custom` needs both dates.
    pub fn from_parts(
        name: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, String> {
        match name.trim().to_lowercase().as_str() {
            "7d" | "last_7_days" => Ok(Self::Last7Days),
            "30d" | "last_30_days" => Ok(Self::Last30Days),
            "90d" | "last_90_days" => Ok(Self::Last90Days),
            "all" | "all_time" => Ok(Self::AllTime),
            "custom" => match (start, end) {
                (Some(start), Some(end)) => Ok(Self::Custom { start, end }),
                _ => Err("custom range requires start and end dates".to_string()),
            },
            other => Err(format!("Unknown date range: {}", other)),
        }
    }

    /// Inclusive UTC bounds relative to `now`.
    ///
    /// Rolling presets start exactly N days before `now` and are open-ended;
    /// custom ranges cover whole local days.
    pub fn bounds(
        &self,
        normalizer: &TimestampNormalizer,
        now: Instant,
    ) -> ServiceResult<(Option<Instant>, Option<Instant>)> {
        match *self {
            Self::Last7Days => Ok((Some(now - Duration::days(7)), None)),
            Self::Last30Days => Ok((Some(now - Duration::days(30)), None)),
            Self::Last90Days => Ok((Some(now - Duration::days(90)), None)),
            Self::AllTime => Ok((None, None)),
            Self::Custom { start, end } => {
                if start > end {
                    return Err(ServiceError::InvalidRange { start, end });
                }
                let (from, _) = normalizer.local_day_bounds(start);
                let (_, to) = normalizer.local_day_bounds(end);
                Ok((Some(from), Some(to)))
            }
        }
    }
}

/// Time ordering of table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn record_order(&self) -> RecordOrder {
        match self {
            SortOrder::NewestFirst => RecordOrder::Descending,
            SortOrder::OldestFirst => RecordOrder::Ascending,
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "newest_first" | "desc" => Ok(Self::NewestFirst),
            "oldest" | "oldest_first" | "asc" => Ok(Self::OldestFirst),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

/// Table filter state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    /// `None` shows all sensors
    pub sensor_id: Option<SensorId>,
    pub range: DateRangePreset,
    pub sort: SortOrder,
}

impl TableQuery {
    pub fn filter(&self, normalizer: &TimestampNormalizer, now: Instant) -> ServiceResult<RecordFilter> {
        let (start, end) = self.range.bounds(normalizer, now)?;
        let mut filter = RecordFilter::default()
            .with_range(start, end)
            .with_order(self.sort.record_order());
        if let Some(sensor_id) = self.sensor_id {
            filter = filter.with_sensors(vec![sensor_id]);
        }
        Ok(filter)
    }
}

/// Display row: `Sensor, Unit, Timestamp, Value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub sensor: String,
    pub unit: String,
    pub timestamp: String,
    pub value: f64,
}

impl TableRow {
    pub fn from_record(record: &SensorRecord, normalizer: &TimestampNormalizer) -> Self {
        Self {
            sensor: record.sensor_name().to_string(),
            unit: record.sensor_unit().to_string(),
            timestamp: normalizer.format_display(record.recorded_at),
            value: record.value,
        }
    }
}

/// Position of one page within the full row set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total_rows: usize,
    pub total_pages: usize,
}

impl Pagination {
    /// Clamp `requested_page` into `1..=total_pages`. An empty table still
    /// has one (empty) page.
    pub fn new(total_rows: usize, per_page: usize, requested_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_rows.div_ceil(per_page).max(1);
        Self {
            page: requested_page.clamp(1, total_pages),
            per_page,
            total_rows,
            total_pages,
        }
    }

    /// Half-open row index range of the current page.
    pub fn row_range(&self) -> std::ops::Range<usize> {
        let start = ((self.page - 1) * self.per_page).min(self.total_rows);
        let end = (start + self.per_page).min(self.total_rows);
        start..end
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    pub rows: Vec<TableRow>,
    pub pagination: Pagination,
}

/// Every row matching `query`, sorted.
pub async fn table_rows<R: FullRepository + ?Sized>(
    repo: &R,
    normalizer: &TimestampNormalizer,
    query: &TableQuery,
) -> ServiceResult<Vec<TableRow>> {
    let filter = query.filter(normalizer, normalizer.now_utc())?;
    let records = services::list_records(repo, &filter).await?;
    Ok(records
        .iter()
        .map(|r| TableRow::from_record(r, normalizer))
        .collect())
}

/// One page of the table.
pub async fn table_page<R: FullRepository + ?Sized>(
    repo: &R,
    normalizer: &TimestampNormalizer,
    query: &TableQuery,
    page: usize,
    per_page: usize,
) -> ServiceResult<TablePage> {
    let mut rows = table_rows(repo, normalizer, query).await?;
    let pagination = Pagination::new(rows.len(), per_page, page);
    let range = pagination.row_range();
    rows.truncate(range.end);
    let rows = rows.split_off(range.start);
    Ok(TablePage { rows, pagination })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_pagination_basic() {
        let p = Pagination::new(120, 50, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.row_range(), 50..100);
        assert!(p.has_previous());
        assert!(p.has_next());
    }

    #[test]
    fn test_pagination_clamps_page() {
        assert_eq!(Pagination::new(120, 50, 9).page, 3);
        assert_eq!(Pagination::new(120, 50, 0).page, 1);
        assert_eq!(Pagination::new(120, 50, 9).row_range(), 100..120);
    }

    #[test]
    fn test_empty_table_has_one_page() {
        let p = Pagination::new(0, 50, 3);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.page, 1);
        assert_eq!(p.row_range(), 0..0);
        assert!(!p.has_next());
    }

    #[test]
    fn test_exact_multiple() {
        let p = Pagination::new(100, 50, 2);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.row_range(), 50..100);
    }

    #[test]
    fn test_rolling_preset_bounds() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let (start, end) = DateRangePreset::Last7Days
            .bounds(&TimestampNormalizer::default(), now)
            .unwrap();
        assert_eq!(start, Some(Utc.with_ymd_and_hms(2024, 6, 23, 12, 0, 0).unwrap()));
        assert_eq!(end, None);

        let (start, end) = DateRangePreset::AllTime
            .bounds(&TimestampNormalizer::default(), now)
            .unwrap();
        assert_eq!((start, end), (None, None));
    }

    #[test]
    fn test_custom_preset_covers_local_days() {
        let range = DateRangePreset::from_parts(
            "custom",
            NaiveDate::from_ymd_opt(2024, 1, 10),
            NaiveDate::from_ymd_opt(2024, 1, 12),
        )
        .unwrap();
        let (start, end) = range
            .bounds(&TimestampNormalizer::default(), Utc::now())
            .unwrap();
        assert_eq!(start, Some(Utc.with_ymd_and_hms(2024, 1, 9, 22, 0, 0).unwrap()));
        assert_eq!(
            end,
            Some(Utc.with_ymd_and_hms(2024, 1, 12, 22, 0, 0).unwrap() - Duration::microseconds(1))
        );
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(DateRangePreset::default(), DateRangePreset::Last30Days);
        assert_eq!(
            DateRangePreset::from_parts("90d", None, None).unwrap(),
            DateRangePreset::Last90Days
        );
        assert!(DateRangePreset::from_parts("custom", None, None).is_err());
        assert!(DateRangePreset::from_parts("yesterday", None, None).is_err());
    }

    #[test]
    fn test_sort_order() {
        assert_eq!(SortOrder::default().record_order(), RecordOrder::Descending);
        assert_eq!("oldest".parse::<SortOrder>().unwrap(), SortOrder::OldestFirst);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
