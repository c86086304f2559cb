//! Engineer workflow: registering sensors and entering readings.
//!
//! Forms carry raw operator input. Every submission passes the
//! [`ValueGate`] first; the reading's local date and time are converted to
//! UTC only after validation, and only the UTC instant reaches the store.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::error::ServiceResult;
use super::validation::{ValidationResult, ValueGate};
use crate::db::repository::FullRepository;
use crate::db::services;
use crate::models::{
    LocalCivilTime, NewRecord, NewSensor, RecordFilter, RecordId, RecordUpdate, Sensor, SensorId,
    SensorRecord, SensorUpdate,
};
use crate::time::TimestampNormalizer;

/// Label used in "is required" messages for the sensor name field.
pub const SENSOR_NAME_FIELD: &str = "Sensor Name";

/// Default size of the recent-readings list.
pub const DEFAULT_RECENT_LIMIT: usize = 100;

/// Sensor create/edit form as typed by the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorForm {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub comment: String,
}

impl SensorForm {
    /// Payload for a new sensor. Blank unit and comment are stored as absent.
    pub fn to_new_sensor(&self, gate: &ValueGate) -> ValidationResult<NewSensor> {
        gate.validate_required(&self.name, SENSOR_NAME_FIELD)?;
        Ok(NewSensor {
            name: self.name.trim().to_string(),
            unit: optional_text(&self.unit),
            comment: optional_text(&self.comment),
        })
    }

    /// Payload for editing a sensor. Blank unit and comment leave the stored
    /// values unchanged.
    pub fn to_update(&self, gate: &ValueGate) -> ValidationResult<SensorUpdate> {
        gate.validate_required(&self.name, SENSOR_NAME_FIELD)?;
        Ok(SensorUpdate {
            name: Some(self.name.trim().to_string()),
            unit: optional_text(&self.unit),
            comment: optional_text(&self.comment),
        })
    }
}

/// Reading form: local wall-clock date and time plus the raw value text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingForm {
    pub sensor_id: SensorId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub value: String,
}

impl ReadingForm {
    pub fn local_time(&self) -> LocalCivilTime {
        LocalCivilTime::new(self.date, self.time)
    }

    /// Validate against the live clock and build the store payload.
    pub fn to_new_record(&self, gate: &ValueGate) -> ValidationResult<NewRecord> {
        self.to_new_record_at(gate, gate.normalizer().now_local())
    }

    /// Same as [`to_new_record`](Self::to_new_record) with an explicit
    /// local "now".
    pub fn to_new_record_at(
        &self,
        gate: &ValueGate,
        now_local: LocalCivilTime,
    ) -> ValidationResult<NewRecord> {
        let value = gate.validate_numeric(&self.value)?;
        let local = self.local_time();
        gate.validate_timestamp_not_future_at(local, now_local)?;

        Ok(NewRecord {
            sensor_id: self.sensor_id,
            recorded_at: gate.normalizer().local_to_utc(local),
            value,
        })
    }
}

/// One line of the recent-readings list, timestamp already in local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRow {
    pub id: RecordId,
    pub sensor_id: SensorId,
    pub sensor: String,
    pub unit: String,
    pub recorded_at: String,
    pub value: f64,
}

impl ReadingRow {
    pub fn from_record(record: &SensorRecord, normalizer: &TimestampNormalizer) -> Self {
        Self {
            id: record.id,
            sensor_id: record.sensor_id,
            sensor: record.sensor_name().to_string(),
            unit: record.sensor_unit().to_string(),
            recorded_at: normalizer.format_display(record.recorded_at),
            value: record.value,
        }
    }
}

pub async fn register_sensor<R: FullRepository + ?Sized>(
    repo: &R,
    gate: &ValueGate,
    form: &SensorForm,
) -> ServiceResult<Sensor> {
    let sensor = form.to_new_sensor(gate)?;
    Ok(services::create_sensor(repo, &sensor).await?)
}

pub async fn edit_sensor<R: FullRepository + ?Sized>(
    repo: &R,
    gate: &ValueGate,
    id: SensorId,
    form: &SensorForm,
) -> ServiceResult<Sensor> {
    let update = form.to_update(gate)?;
    Ok(services::update_sensor(repo, id, &update).await?)
}

pub async fn submit_reading<R: FullRepository + ?Sized>(
    repo: &R,
    gate: &ValueGate,
    form: &ReadingForm,
) -> ServiceResult<SensorRecord> {
    let record = form.to_new_record(gate)?;
    Ok(services::put_record(repo, &record).await?)
}

/// Replace sensor, timestamp and value of an existing reading.
pub async fn amend_reading<R: FullRepository + ?Sized>(
    repo: &R,
    gate: &ValueGate,
    id: RecordId,
    form: &ReadingForm,
) -> ServiceResult<SensorRecord> {
    let record = form.to_new_record(gate)?;
    let update = RecordUpdate {
        sensor_id: Some(record.sensor_id),
        recorded_at: Some(record.recorded_at),
        value: Some(record.value),
    };
    Ok(services::update_record(repo, id, &update).await?)
}

/// Newest readings first, rendered in local time.
pub async fn recent_readings<R: FullRepository + ?Sized>(
    repo: &R,
    normalizer: &TimestampNormalizer,
    limit: usize,
) -> ServiceResult<Vec<ReadingRow>> {
    let records = services::list_records(repo, &RecordFilter::recent(limit)).await?;
    Ok(records
        .iter()
        .map(|r| ReadingRow::from_record(r, normalizer))
        .collect())
}

fn optional_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
