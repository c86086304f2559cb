//! Record-store module for sensors and their readings.
//!
//! This module provides abstractions for storage via the Repository pattern,
//! allowing the in-memory and hosted backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (workflows, REST API)                │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - logging, error context   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! │  - SensorRepository                                     │
//! │  - RecordRepository                                     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                │
//! ┌───▼──────────────┐     ┌───────────▼─────────────┐
//! │ Rest Repository  │     │ Local Repository        │
//! │ (PostgREST)      │     │ (in-memory)             │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! Every timestamp crossing into a repository is a UTC instant; every
//! timestamp coming back out has been parsed from the store's text form.

#[cfg(not(any(feature = "rest-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(feature = "rest-repo")]
pub use repositories::RestConfig;
#[cfg(not(feature = "rest-repo"))]
#[derive(Debug, Clone)]
pub struct RestConfig {
    _private: (),
}

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "rest-repo")]
pub use repositories::RestRepository;
pub use repository::{
    ErrorContext, FullRepository, RecordRepository, RepositoryError, RepositoryResult,
    SensorRepository,
};
