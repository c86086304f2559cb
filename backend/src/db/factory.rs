//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "rest-repo")]
use super::repositories::RestRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use super::RestConfig;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Hosted PostgREST store
    Rest,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("rest", "supabase", "local")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rest" | "supabase" | "postgrest" => Ok(Self::Rest),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Without it, defaults to Rest if `SUPABASE_URL`
    /// is present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or_else(|e| {
                log::warn!("{}; falling back to local repository", e);
                Self::Local
            });
        }

        if std::env::var("SUPABASE_URL").is_ok() {
            Self::Rest
        } else {
            Self::Local
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use biogas_backend::db::{RepositoryFactory, RepositoryType};
///
/// let repo = RepositoryFactory::create(RepositoryType::Local, None).unwrap();
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `rest_config` - Hosted store configuration (required for Rest)
    pub fn create(
        repo_type: RepositoryType,
        rest_config: Option<&RestConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Rest => {
                #[cfg(feature = "rest-repo")]
                {
                    let config = rest_config.ok_or_else(|| {
                        RepositoryError::configuration("REST repository requires RestConfig")
                    })?;
                    let rest = Self::create_rest(config)?;
                    Ok(rest as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "rest-repo"))]
                {
                    let _ = rest_config;
                    Err(RepositoryError::configuration(
                        "REST repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a hosted-store repository.
    #[cfg(feature = "rest-repo")]
    pub fn create_rest(config: &RestConfig) -> RepositoryResult<Arc<RestRepository>> {
        let repo = RestRepository::new(config.clone())?;
        Ok(Arc::new(repo))
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create repository from environment configuration.
    ///
    /// Reads `REPOSITORY_TYPE` to determine which repository to create; the
    /// hosted store additionally needs `SUPABASE_URL` and `SUPABASE_KEY`.
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        match RepositoryType::from_env() {
            RepositoryType::Rest => {
                #[cfg(feature = "rest-repo")]
                {
                    let config = RestConfig::from_env().map_err(RepositoryError::configuration)?;
                    let rest = Self::create_rest(&config)?;
                    Ok(rest as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "rest-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "REST repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create repository from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config)
    }

    /// Create repository from the default configuration file location.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config)
    }

    /// Create repository from a RepositoryConfig instance.
    pub fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        match repo_type {
            RepositoryType::Rest => {
                #[cfg(feature = "rest-repo")]
                {
                    let rest_config = config.to_rest_config()?.ok_or_else(|| {
                        RepositoryError::configuration("REST repository requires [rest] settings")
                    })?;
                    let rest = Self::create_rest(&rest_config)?;
                    Ok(rest as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "rest-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "REST repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }
}
