//! Sensor repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewSensor, Sensor, SensorId, SensorUpdate};

/// Repository trait for the `sensors` table.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SensorRepository: Send + Sync {
    /// Check whether the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// All sensors ordered by name.
    async fn list_sensors(&self) -> RepositoryResult<Vec<Sensor>>;

    /// Fetch a single sensor, `None` when the ID is unknown.
    async fn get_sensor(&self, id: SensorId) -> RepositoryResult<Option<Sensor>>;

    /// Insert a sensor and return the stored row.
    async fn create_sensor(&self, sensor: &NewSensor) -> RepositoryResult<Sensor>;

    /// Apply a partial update and return the stored row.
    ///
    /// # Errors
    /// `NotFound` when the ID is unknown.
    async fn update_sensor(&self, id: SensorId, update: &SensorUpdate) -> RepositoryResult<Sensor>;

    /// Delete a sensor together with all of its records.
    ///
    /// # Returns
    /// * `Ok(true)` if a sensor was deleted, `Ok(false)` if none matched
    async fn delete_sensor(&self, id: SensorId) -> RepositoryResult<bool>;
}
