//! Repository trait definitions for record-store operations.
//!
//! The store is split into two focused traits so implementations stay small
//! and testable.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`sensor`]: CRUD over the `sensors` table
//! - [`record`]: CRUD and filtered listing over the `sensor_records` table
//!
//! # Convenience Trait Bound
//!
//! For functions that need both capabilities, use the [`FullRepository`] bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let sensors = repo.list_sensors().await?;
//!     let records = repo.list_records(&RecordFilter::recent(10)).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod record;
pub mod sensor;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use record::RecordRepository;
pub use sensor::SensorRepository;

/// Composite trait bound for a complete record store.
///
/// Automatically implemented for any type that implements both traits.
pub trait FullRepository: SensorRepository + RecordRepository {}

// Blanket implementation: any type implementing both traits automatically implements FullRepository
impl<T> FullRepository for T where T: SensorRepository + RecordRepository {}
