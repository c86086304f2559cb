//! Sensor and sensor-record entities owned by the record store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::Instant;

crate::define_id_type!(Uuid, SensorId);
crate::define_id_type!(Uuid, RecordId);

impl SensorId {
    pub fn generate() -> Self {
        SensorId(Uuid::new_v4())
    }
}

impl RecordId {
    pub fn generate() -> Self {
        RecordId(Uuid::new_v4())
    }
}

/// A measurement source (e.g. "Reactor temperature", unit "°C").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Sensor {
    /// Name with unit suffix, as shown in selectors and chart legends.
    pub fn label(&self) -> String {
        match self.unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{} ({})", self.name, unit),
            _ => self.name.clone(),
        }
    }
}

/// Payload for registering a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSensor {
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Partial sensor update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Sensor columns joined onto each record when listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSummary {
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
}

/// One stored reading. `recorded_at` is always UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub id: RecordId,
    pub sensor_id: SensorId,
    pub recorded_at: Instant,
    pub value: f64,
    #[serde(default, rename = "sensors")]
    pub sensor: Option<SensorSummary>,
}

impl SensorRecord {
    pub fn sensor_name(&self) -> &str {
        self.sensor.as_ref().map(|s| s.name.as_str()).unwrap_or("")
    }

    pub fn sensor_unit(&self) -> &str {
        self.sensor
            .as_ref()
            .and_then(|s| s.unit.as_deref())
            .unwrap_or("")
    }
}

/// Payload for storing a reading. Only accepts a UTC instant, so local
/// wall-clock values cannot reach the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub sensor_id: SensorId,
    pub recorded_at: Instant,
    pub value: f64,
}

/// Partial record update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    pub sensor_id: Option<SensorId>,
    pub recorded_at: Option<Instant>,
    pub value: Option<f64>,
}

impl RecordUpdate {
    pub fn is_empty(&self) -> bool {
        self.sensor_id.is_none() && self.recorded_at.is_none() && self.value.is_none()
    }
}

/// Time ordering for record listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrder {
    #[default]
    Ascending,
    Descending,
}

impl RecordOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordOrder::Ascending => "asc",
            RecordOrder::Descending => "desc",
        }
    }
}

/// Record listing filter. Bounds are inclusive UTC instants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub sensor_ids: Option<Vec<SensorId>>,
    pub start: Option<Instant>,
    pub end: Option<Instant>,
    pub order: RecordOrder,
    pub limit: Option<usize>,
}

impl RecordFilter {
    /// Most recent `limit` records, newest first.
    pub fn recent(limit: usize) -> Self {
        Self {
            order: RecordOrder::Descending,
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn with_sensors(mut self, sensor_ids: Vec<SensorId>) -> Self {
        self.sensor_ids = Some(sensor_ids);
        self
    }

    pub fn with_range(mut self, start: Option<Instant>, end: Option<Instant>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_order(mut self, order: RecordOrder) -> Self {
        self.order = order;
        self
    }

    /// Whether a record with these keys passes the filter (limit excluded).
    pub fn matches(&self, sensor_id: SensorId, recorded_at: Instant) -> bool {
        if let Some(ids) = &self.sensor_ids {
            if !ids.contains(&sensor_id) {
                return false;
            }
        }
        if let Some(start) = self.start {
            if recorded_at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if recorded_at > end {
                return false;
            }
        }
        true
    }
}
