//! Data Transfer Objects for the HTTP API.
//!
//! Workflow types that already derive Serialize are re-exported; the structs
//! here cover query strings and the request/response envelopes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use crate::services::{
    ChartData, ChartPoint, ChartSeries, Pagination, ReadingRow, SensorForm, SummaryRow, TablePage,
    TableRow,
};

use super::error::AppError;
use crate::models::{Sensor, SensorId, SensorRecord};
use crate::services::{DateRangePreset, ReadingForm, SortOrder, TableQuery};
use crate::time::{to_store_text, TimestampNormalizer};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Record store connection status
    pub database: String,
    /// Civil timezone used for entry and display
    pub timezone: String,
}

/// Sensor list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorListResponse {
    pub sensors: Vec<Sensor>,
    pub total: usize,
}

/// Reading submission. `value` is the raw form text; JSON numbers are
/// accepted and rendered to text before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingRequest {
    pub sensor_id: SensorId,
    pub date: NaiveDate,
    pub time: chrono::NaiveTime,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl ReadingRequest {
    pub fn into_form(self) -> ReadingForm {
        let value = match self.value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        ReadingForm {
            sensor_id: self.sensor_id,
            date: self.date,
            time: self.time,
            value,
        }
    }
}

/// A stored reading with both the UTC instant and its local rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    pub id: String,
    pub sensor_id: String,
    pub sensor: String,
    pub unit: String,
    /// Canonical UTC text
    pub recorded_at: String,
    /// Local wall-clock time in the display format
    pub recorded_at_local: String,
    pub value: f64,
}

impl RecordResponse {
    pub fn from_record(record: &SensorRecord, normalizer: &TimestampNormalizer) -> Self {
        Self {
            id: record.id.to_string(),
            sensor_id: record.sensor_id.to_string(),
            sensor: record.sensor_name().to_string(),
            unit: record.sensor_unit().to_string(),
            recorded_at: to_store_text(&record.recorded_at),
            recorded_at_local: normalizer.format_display(record.recorded_at),
            value: record.value,
        }
    }
}

/// Query parameters for the recent readings list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingListResponse {
    pub records: Vec<ReadingRow>,
    pub total: usize,
}

/// Query parameters for the chart endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartQuery {
    /// Comma-separated sensor IDs
    #[serde(default)]
    pub sensor_ids: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ChartQuery {
    pub fn sensor_ids(&self) -> Result<Vec<SensorId>, AppError> {
        self.sensor_ids
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(parse_sensor_id)
            .collect()
    }
}

/// Query parameters shared by the table and export endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableParams {
    #[serde(default)]
    pub sensor_id: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl TableParams {
    pub fn to_query(&self) -> Result<TableQuery, AppError> {
        let sensor_id = match self.sensor_id.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(parse_sensor_id(raw)?),
        };

        let range = match self.range.as_deref() {
            None | Some("") => match (self.start, self.end) {
                (Some(start), Some(end)) => DateRangePreset::Custom { start, end },
                _ => DateRangePreset::default(),
            },
            Some(name) => DateRangePreset::from_parts(name, self.start, self.end)
                .map_err(AppError::BadRequest)?,
        };

        let sort = match self.sort.as_deref() {
            None | Some("") => SortOrder::default(),
            Some(raw) => raw.parse().map_err(AppError::BadRequest)?,
        };

        Ok(TableQuery {
            sensor_id,
            range,
            sort,
        })
    }
}

/// Response for delete operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

pub fn parse_sensor_id(raw: &str) -> Result<SensorId, AppError> {
    raw.parse::<SensorId>()
        .map_err(|_| AppError::BadRequest(format!("Invalid sensor ID: {}", raw.trim())))
}
