//! Analyst chart data: per-sensor time series and summary statistics.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::{ServiceError, ServiceResult};
use crate::db::repository::FullRepository;
use crate::db::services;
use crate::models::{RecordFilter, RecordOrder, SensorId, SensorRecord};
use crate::time::TimestampNormalizer;

/// One plotted reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Local wall-clock time in the display format
    pub timestamp: String,
    pub value: f64,
}

/// All readings of one sensor in the window, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub sensor_id: SensorId,
    pub name: String,
    pub unit: Option<String>,
    pub points: Vec<ChartPoint>,
}

/// Min / max / mean over one sensor's readings in the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub sensor_id: SensorId,
    pub sensor: String,
    pub unit: Option<String>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl SummaryRow {
    /// Statistic rendered with two decimals and the sensor's unit.
    pub fn format_stat(&self, value: f64) -> String {
        match self.unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{:.2} {}", value, unit),
            _ => format!("{:.2}", value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
    pub summary: Vec<SummaryRow>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// `(min, max, mean)` of a non-empty slice.
pub fn summarize(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some((min, max, mean))
}

/// Readings of the selected sensors between two local calendar dates,
/// both inclusive.
///
/// Series and summary rows follow the order of `sensor_ids`; sensors without
/// readings in the window are left out.
pub async fn chart_series<R: FullRepository + ?Sized>(
    repo: &R,
    normalizer: &TimestampNormalizer,
    sensor_ids: &[SensorId],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> ServiceResult<ChartData> {
    if start_date > end_date {
        return Err(ServiceError::InvalidRange {
            start: start_date,
            end: end_date,
        });
    }
    if sensor_ids.is_empty() {
        return Ok(ChartData::default());
    }

    let (start, _) = normalizer.local_day_bounds(start_date);
    let (_, end) = normalizer.local_day_bounds(end_date);
    let filter = RecordFilter::default()
        .with_sensors(sensor_ids.to_vec())
        .with_range(Some(start), Some(end))
        .with_order(RecordOrder::Ascending);

    let records = services::list_records(repo, &filter).await?;
    Ok(build_chart(&records, sensor_ids, normalizer))
}

/// Group ascending records into per-sensor series and summaries.
pub fn build_chart(
    records: &[SensorRecord],
    sensor_ids: &[SensorId],
    normalizer: &TimestampNormalizer,
) -> ChartData {
    let mut data = ChartData::default();

    for &sensor_id in sensor_ids {
        let own: Vec<&SensorRecord> = records.iter().filter(|r| r.sensor_id == sensor_id).collect();
        let Some(first) = own.first() else {
            continue;
        };

        let name = first.sensor_name().to_string();
        let unit = first.sensor.as_ref().and_then(|s| s.unit.clone());
        let values: Vec<f64> = own.iter().map(|r| r.value).collect();

        if let Some((min, max, mean)) = summarize(&values) {
            data.summary.push(SummaryRow {
                sensor_id,
                sensor: name.clone(),
                unit: unit.clone(),
                min,
                max,
                mean,
                count: values.len(),
            });
        }

        data.series.push(ChartSeries {
            sensor_id,
            name,
            unit,
            points: own
                .iter()
                .map(|r| ChartPoint {
                    timestamp: normalizer.format_display(r.recorded_at),
                    value: r.value,
                })
                .collect(),
        });
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordId, SensorSummary};
    use chrono::{TimeZone, Utc};

    fn record(sensor_id: SensorId, hour: u32, value: f64) -> SensorRecord {
        SensorRecord {
            id: RecordId::generate(),
            sensor_id,
            recorded_at: Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap(),
            value,
            sensor: Some(SensorSummary {
                name: "Temp".to_string(),
                unit: Some("°C".to_string()),
            }),
        }
    }

    #[test]
    fn test_summarize() {
        assert_eq!(summarize(&[]), None);
        assert_eq!(summarize(&[2.0, 4.0, 9.0]), Some((2.0, 9.0, 5.0)));
    }

    #[test]
    fn test_build_chart_groups_in_requested_order() {
        let a = SensorId::generate();
        let b = SensorId::generate();
        let missing = SensorId::generate();
        let records = vec![record(a, 8, 1.0), record(b, 9, 5.0), record(a, 10, 3.0)];

        let chart = build_chart(&records, &[b, missing, a], &TimestampNormalizer::default());

        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].sensor_id, b);
        assert_eq!(chart.series[1].sensor_id, a);
        assert_eq!(chart.series[1].points[0].timestamp, "2024-01-15 10:00:00");
        assert_eq!(chart.summary[1].count, 2);
        assert_eq!(chart.summary[1].mean, 2.0);
    }

    #[test]
    fn test_format_stat() {
        let a = SensorId::generate();
        let chart = build_chart(&[record(a, 8, 12.346)], &[a], &TimestampNormalizer::default());
        let row = &chart.summary[0];
        assert_eq!(row.format_stat(row.max), "12.35 °C");
    }
}
