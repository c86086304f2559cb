//! High-level database service layer.
//!
//! Repository-agnostic operations over any implementation of the record-store
//! traits. Each call is logged and failures are annotated with the operation
//! that produced them, so callers above this layer never talk to a repository
//! directly.
//!
//! # Usage
//!
//! ```no_run
//! use biogas_backend::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let sensors = services::list_sensors(&repo).await?;
//!     println!("Found {} sensors", sensors.len());
//!     Ok(())
//! }
//! ```

use log::{debug, info, warn};

use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    NewRecord, NewSensor, RecordFilter, RecordId, RecordUpdate, Sensor, SensorId, SensorRecord,
    SensorUpdate,
};

// ==================== Health & Connection ====================

/// Check if the record store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    let healthy = repo.health_check().await?;
    if !healthy {
        warn!("Record store reported unhealthy");
    }
    Ok(healthy)
}

// ==================== Sensor Operations ====================

/// All sensors ordered by name.
pub async fn list_sensors<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Sensor>> {
    info!("Fetching all sensors");
    let sensors = repo
        .list_sensors()
        .await
        .map_err(|e| annotate(e, "list_sensors"))?;
    info!("Retrieved {} sensors", sensors.len());
    Ok(sensors)
}

pub async fn get_sensor<R: FullRepository + ?Sized>(
    repo: &R,
    id: SensorId,
) -> RepositoryResult<Option<Sensor>> {
    debug!("Fetching sensor {}", id);
    repo.get_sensor(id)
        .await
        .map_err(|e| annotate(e, "get_sensor"))
}

/// Like [`get_sensor`] but a missing sensor is a `NotFound` error.
pub async fn require_sensor<R: FullRepository + ?Sized>(
    repo: &R,
    id: SensorId,
) -> RepositoryResult<Sensor> {
    get_sensor(repo, id).await?.ok_or_else(|| {
        RepositoryError::not_found(format!("Sensor {} not found", id))
            .with_operation("get_sensor")
            .with_entity("sensor", Some(id.to_string()))
    })
}

pub async fn create_sensor<R: FullRepository + ?Sized>(
    repo: &R,
    sensor: &NewSensor,
) -> RepositoryResult<Sensor> {
    info!(
        "Creating sensor '{}' ({})",
        sensor.name,
        sensor.unit.as_deref().unwrap_or("no unit")
    );
    let created = repo
        .create_sensor(sensor)
        .await
        .map_err(|e| annotate(e, "create_sensor"))?;
    info!("Sensor created: {} ({})", created.name, created.id);
    Ok(created)
}

pub async fn update_sensor<R: FullRepository + ?Sized>(
    repo: &R,
    id: SensorId,
    update: &SensorUpdate,
) -> RepositoryResult<Sensor> {
    info!("Updating sensor {}", id);
    repo.update_sensor(id, update)
        .await
        .map_err(|e| annotate(e, "update_sensor"))
}

/// Delete a sensor together with all of its records.
pub async fn delete_sensor<R: FullRepository + ?Sized>(
    repo: &R,
    id: SensorId,
) -> RepositoryResult<bool> {
    info!("Deleting sensor {} and its records", id);
    let deleted = repo
        .delete_sensor(id)
        .await
        .map_err(|e| annotate(e, "delete_sensor"))?;
    if !deleted {
        warn!("Sensor {} did not exist", id);
    }
    Ok(deleted)
}

// ==================== Record Operations ====================

pub async fn put_record<R: FullRepository + ?Sized>(
    repo: &R,
    record: &NewRecord,
) -> RepositoryResult<SensorRecord> {
    info!(
        "Storing reading for sensor {} at {} = {}",
        record.sensor_id, record.recorded_at, record.value
    );
    repo.put_record(record)
        .await
        .map_err(|e| annotate(e, "put_record"))
}

pub async fn get_record<R: FullRepository + ?Sized>(
    repo: &R,
    id: RecordId,
) -> RepositoryResult<Option<SensorRecord>> {
    debug!("Fetching record {}", id);
    repo.get_record(id)
        .await
        .map_err(|e| annotate(e, "get_record"))
}

/// Like [`get_record`] but a missing record is a `NotFound` error.
pub async fn require_record<R: FullRepository + ?Sized>(
    repo: &R,
    id: RecordId,
) -> RepositoryResult<SensorRecord> {
    get_record(repo, id).await?.ok_or_else(|| {
        RepositoryError::not_found(format!("Record {} not found", id))
            .with_operation("get_record")
            .with_entity("sensor_record", Some(id.to_string()))
    })
}

pub async fn list_records<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &RecordFilter,
) -> RepositoryResult<Vec<SensorRecord>> {
    info!(
        "Fetching records (sensors={:?}, start={:?}, end={:?}, order={}, limit={:?})",
        filter.sensor_ids.as_ref().map(|ids| ids.len()),
        filter.start,
        filter.end,
        filter.order.as_str(),
        filter.limit
    );
    let records = repo
        .list_records(filter)
        .await
        .map_err(|e| annotate(e, "list_records"))?;
    info!("Retrieved {} records", records.len());
    Ok(records)
}

pub async fn update_record<R: FullRepository + ?Sized>(
    repo: &R,
    id: RecordId,
    update: &RecordUpdate,
) -> RepositoryResult<SensorRecord> {
    if update.is_empty() {
        debug!("Empty update for record {}, returning stored row", id);
        return require_record(repo, id).await;
    }
    info!("Updating record {}", id);
    repo.update_record(id, update)
        .await
        .map_err(|e| annotate(e, "update_record"))
}

pub async fn delete_record<R: FullRepository + ?Sized>(
    repo: &R,
    id: RecordId,
) -> RepositoryResult<bool> {
    info!("Deleting record {}", id);
    repo.delete_record(id)
        .await
        .map_err(|e| annotate(e, "delete_record"))
}

/// Log a failure and make sure it names the operation.
fn annotate(err: RepositoryError, operation: &str) -> RepositoryError {
    warn!("{} failed: {}", operation, err);
    if err.context().operation.is_some() {
        err
    } else {
        err.with_operation(operation)
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;
