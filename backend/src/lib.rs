//! # Biogas Dashboard Backend
//!
//! Sensor data entry and analysis for a biogas research project.
//!
//! Engineers register sensors and enter readings in local wall-clock time;
//! analysts chart, tabulate and export them. The record store only ever sees
//! UTC, so every boundary crossing goes through one timezone layer.
//!
//! ## Architecture
//!
//! - [`time`]: UTC normalization and tolerant timestamp parsing
//! - [`models`]: Sensors, records and the local wall-clock value type
//! - [`services`]: Input validation and the engineer/analyst workflows
//! - [`db`]: Record-store traits, in-memory and hosted implementations
//! - [`config`]: Process configuration from the environment
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Example
//!
//! ```
//! use biogas_backend::models::LocalCivilTime;
//! use biogas_backend::services::ValueGate;
//! use biogas_backend::time::TimestampNormalizer;
//!
//! let normalizer = TimestampNormalizer::from_zone_name("Europe/Kiev").unwrap();
//! let gate = ValueGate::new(normalizer.clone());
//!
//! let value = gate.validate_numeric(" 37.5 ").unwrap();
//! let local = LocalCivilTime::from_ymd_hms(2024, 1, 15, 12, 30, 0).unwrap();
//! let utc = normalizer.local_to_utc(local);
//!
//! assert_eq!(value, 37.5);
//! assert_eq!(normalizer.to_store_text(utc), "2024-01-15T10:30:00.000000Z");
//! ```

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod time;

#[cfg(feature = "http-server")]
pub mod http;
