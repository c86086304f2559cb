//! Sensor record repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewRecord, RecordFilter, RecordId, RecordUpdate, SensorRecord};

/// Repository trait for the `sensor_records` table.
///
/// Timestamps cross this boundary as UTC instants only. Implementations that
/// keep them as text must parse them back and report malformed values as
/// `DataIntegrityError`.
///
/// Returned records carry the owning sensor's name and unit.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Insert a reading and return the stored row.
    ///
    /// # Errors
    /// `ValidationError` when the referenced sensor does not exist.
    async fn put_record(&self, record: &NewRecord) -> RepositoryResult<SensorRecord>;

    /// Fetch a single record, `None` when the ID is unknown.
    async fn get_record(&self, id: RecordId) -> RepositoryResult<Option<SensorRecord>>;

    /// Records matching `filter`, ordered by `recorded_at`.
    async fn list_records(&self, filter: &RecordFilter) -> RepositoryResult<Vec<SensorRecord>>;

    /// Apply a partial update and return the stored row.
    async fn update_record(&self, id: RecordId, update: &RecordUpdate) -> RepositoryResult<SensorRecord>;

    /// Delete a record.
    ///
    /// # Returns
    /// * `Ok(true)` if a record was deleted, `Ok(false)` if none matched
    async fn delete_record(&self, id: RecordId) -> RepositoryResult<bool>;
}
