//! In-memory local repository implementation.
//!
//! This module provides a local implementation of the repository traits
//! suitable for unit testing and local development. Data lives in HashMaps
//! behind an `Arc<RwLock<_>>`, giving fast, deterministic and isolated runs.
//!
//! Record timestamps are kept as text exactly like the hosted backend keeps
//! them, and parsed back on every read. A malformed stored value therefore
//! surfaces the same `DataIntegrityError` the hosted store would produce.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::db::repository::*;
use crate::models::{
    NewRecord, NewSensor, RecordFilter, RecordId, RecordOrder, RecordUpdate, Sensor, SensorId,
    SensorRecord, SensorSummary, SensorUpdate,
};
use crate::time::{parse_timestamp_text, to_store_text};

/// In-memory local repository.
///
/// # Example
/// ```
/// use biogas_backend::db::repositories::LocalRepository;
/// use biogas_backend::db::repository::SensorRepository;
/// use biogas_backend::models::NewSensor;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = LocalRepository::new();
///     repo.create_sensor(&NewSensor {
///         name: "Reactor temperature".to_string(),
///         unit: Some("°C".to_string()),
///         comment: None,
///     })
///     .await
///     .unwrap();
///
///     let sensors = repo.list_sensors().await.unwrap();
///     assert_eq!(sensors.len(), 1);
/// });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

/// Row shape of `sensor_records` as the store keeps it.
#[derive(Debug, Clone)]
struct StoredRecord {
    id: RecordId,
    sensor_id: SensorId,
    recorded_at: String,
    value: f64,
}

struct LocalData {
    sensors: HashMap<SensorId, Sensor>,
    records: HashMap<RecordId, StoredRecord>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            sensors: HashMap::new(),
            records: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn sensor_summary(&self, sensor_id: SensorId) -> Option<SensorSummary> {
        self.sensors.get(&sensor_id).map(|s| SensorSummary {
            name: s.name.clone(),
            unit: s.unit.clone(),
        })
    }

    /// Parse the stored text and join the sensor columns.
    fn materialize(&self, stored: &StoredRecord) -> RepositoryResult<SensorRecord> {
        let recorded_at = parse_timestamp_text(&stored.recorded_at).map_err(|e| {
            RepositoryError::from(e)
                .with_operation("read_record")
                .with_entity("sensor_record", Some(stored.id.to_string()))
        })?;

        Ok(SensorRecord {
            id: stored.id,
            sensor_id: stored.sensor_id,
            recorded_at,
            value: stored.value,
            sensor: self.sensor_summary(stored.sensor_id),
        })
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Store a record with arbitrary timestamp text, bypassing normalization.
    ///
    /// Mirrors rows written by other clients of the hosted table; used to
    /// exercise the tolerant parser and the data-integrity path.
    pub fn insert_raw_record(
        &self,
        sensor_id: SensorId,
        recorded_at: impl Into<String>,
        value: f64,
    ) -> RepositoryResult<RecordId> {
        let mut data = self.write()?;
        let id = RecordId::generate();
        data.records.insert(
            id,
            StoredRecord {
                id,
                sensor_id,
                recorded_at: recorded_at.into(),
                value,
            },
        );
        Ok(id)
    }

    /// Raw stored timestamp text of a record.
    pub fn stored_timestamp(&self, id: RecordId) -> Option<String> {
        self.data
            .read()
            .ok()
            .and_then(|data| data.records.get(&id).map(|r| r.recorded_at.clone()))
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        if let Ok(mut data) = self.data.write() {
            data.is_healthy = healthy;
        }
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        if let Ok(mut data) = self.data.write() {
            let is_healthy = data.is_healthy;
            *data = LocalData {
                is_healthy,
                ..Default::default()
            };
        }
    }

    /// Get the number of sensors stored.
    pub fn sensor_count(&self) -> usize {
        self.data.read().map(|d| d.sensors.len()).unwrap_or(0)
    }

    /// Get the number of records stored.
    pub fn record_count(&self) -> usize {
        self.data.read().map(|d| d.records.len()).unwrap_or(0)
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, LocalData>> {
        self.data
            .read()
            .map_err(|_| RepositoryError::internal("local repository lock poisoned"))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, LocalData>> {
        self.data
            .write()
            .map_err(|_| RepositoryError::internal("local repository lock poisoned"))
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.read()?.is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }

    fn missing_sensor(operation: &str, sensor_id: SensorId) -> RepositoryError {
        RepositoryError::ValidationError {
            message: format!("Sensor {} does not exist", sensor_id),
            context: ErrorContext::new(operation)
                .with_entity("sensor")
                .with_entity_id(sensor_id),
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SensorRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.read()?.is_healthy)
    }

    async fn list_sensors(&self) -> RepositoryResult<Vec<Sensor>> {
        self.check_health()?;
        let data = self.read()?;

        let mut sensors: Vec<Sensor> = data.sensors.values().cloned().collect();
        sensors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(sensors)
    }

    async fn get_sensor(&self, id: SensorId) -> RepositoryResult<Option<Sensor>> {
        self.check_health()?;
        Ok(self.read()?.sensors.get(&id).cloned())
    }

    async fn create_sensor(&self, sensor: &NewSensor) -> RepositoryResult<Sensor> {
        self.check_health()?;
        let mut data = self.write()?;

        let stored = Sensor {
            id: SensorId::generate(),
            name: sensor.name.clone(),
            unit: sensor.unit.clone(),
            comment: sensor.comment.clone(),
        };
        data.sensors.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_sensor(&self, id: SensorId, update: &SensorUpdate) -> RepositoryResult<Sensor> {
        self.check_health()?;
        let mut data = self.write()?;

        let sensor = data.sensors.get_mut(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Sensor {} not found", id),
                ErrorContext::new("update_sensor")
                    .with_entity("sensor")
                    .with_entity_id(id),
            )
        })?;

        if let Some(name) = &update.name {
            sensor.name = name.clone();
        }
        if let Some(unit) = &update.unit {
            sensor.unit = Some(unit.clone());
        }
        if let Some(comment) = &update.comment {
            sensor.comment = Some(comment.clone());
        }
        Ok(sensor.clone())
    }

    async fn delete_sensor(&self, id: SensorId) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.write()?;

        let existed = data.sensors.remove(&id).is_some();
        if existed {
            // ON DELETE CASCADE
            data.records.retain(|_, r| r.sensor_id != id);
        }
        Ok(existed)
    }
}

#[async_trait]
impl RecordRepository for LocalRepository {
    async fn put_record(&self, record: &NewRecord) -> RepositoryResult<SensorRecord> {
        self.check_health()?;
        let mut data = self.write()?;

        if !data.sensors.contains_key(&record.sensor_id) {
            return Err(Self::missing_sensor("put_record", record.sensor_id));
        }

        let stored = StoredRecord {
            id: RecordId::generate(),
            sensor_id: record.sensor_id,
            recorded_at: to_store_text(&record.recorded_at),
            value: record.value,
        };
        data.records.insert(stored.id, stored.clone());
        data.materialize(&stored)
    }

    async fn get_record(&self, id: RecordId) -> RepositoryResult<Option<SensorRecord>> {
        self.check_health()?;
        let data = self.read()?;

        data.records
            .get(&id)
            .map(|stored| data.materialize(stored))
            .transpose()
    }

    async fn list_records(&self, filter: &RecordFilter) -> RepositoryResult<Vec<SensorRecord>> {
        self.check_health()?;
        let data = self.read()?;

        let mut records = Vec::new();
        for stored in data.records.values() {
            let record = data.materialize(stored)?;
            if filter.matches(record.sensor_id, record.recorded_at) {
                records.push(record);
            }
        }

        records.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at).then(a.id.cmp(&b.id)));
        if filter.order == RecordOrder::Descending {
            records.reverse();
        }
        if let Some(limit) = filter.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn update_record(&self, id: RecordId, update: &RecordUpdate) -> RepositoryResult<SensorRecord> {
        self.check_health()?;
        let mut data = self.write()?;

        if let Some(sensor_id) = update.sensor_id {
            if !data.sensors.contains_key(&sensor_id) {
                return Err(Self::missing_sensor("update_record", sensor_id));
            }
        }

        let stored = data.records.get_mut(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Record {} not found", id),
                ErrorContext::new("update_record")
                    .with_entity("sensor_record")
                    .with_entity_id(id),
            )
        })?;

        if let Some(sensor_id) = update.sensor_id {
            stored.sensor_id = sensor_id;
        }
        if let Some(recorded_at) = update.recorded_at {
            stored.recorded_at = to_store_text(&recorded_at);
        }
        if let Some(value) = update.value {
            stored.value = value;
        }

        let stored = stored.clone();
        data.materialize(&stored)
    }

    async fn delete_record(&self, id: RecordId) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self.write()?.records.remove(&id).is_some())
    }
}
