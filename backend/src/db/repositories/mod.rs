//! Repository implementations module.
//!
//! This module contains the implementations of the record-store traits:
//! - `local`: In-memory implementation for unit testing and local development
//! - `rest`: Hosted store spoken to over PostgREST
pub mod local;
#[cfg(feature = "rest-repo")]
pub mod rest;

pub use local::LocalRepository;
#[cfg(feature = "rest-repo")]
pub use rest::{RestConfig, RestRepository};
