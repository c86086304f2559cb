//! Repository configuration file support.
//!
//! This module provides utilities for reading the record-store and timezone
//! settings from a `repository.toml` file:
//!
//! ```toml
//! [repository]
//! type = "rest"
//!
//! [rest]
//! url = "https://project.supabase.co"
//! key = "service-key"
//!
//! [timezone]
//! name = "Europe/Kiev"
//! display_format = "%Y-%m-%d %H:%M"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::time::{
    validate_display_format, TimestampNormalizer, DEFAULT_DISPLAY_FORMAT, DEFAULT_TIMEZONE,
};

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub rest: RestSettings,
    /// Absent unless the file has a `[timezone]` section.
    #[serde(default)]
    pub timezone: Option<TimezoneSettings>,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Hosted store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Civil timezone used for entry forms and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimezoneSettings {
    #[serde(default = "default_timezone")]
    pub name: String,
    #[serde(default = "default_display_format")]
    pub display_format: String,
}

impl Default for TimezoneSettings {
    fn default() -> Self {
        Self {
            name: default_timezone(),
            display_format: default_display_format(),
        }
    }
}

fn default_timeout() -> u64 {
    20
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_display_format() -> String {
    DEFAULT_DISPLAY_FORMAT.to_string()
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        Self::load_default()?.ok_or_else(|| {
            RepositoryError::configuration("No repository.toml found in standard locations")
        })
    }

    /// Same search as [`from_default_location`](Self::from_default_location),
    /// but a missing file is `Ok(None)`. A file that exists and cannot be
    /// read or parsed is still an error.
    pub fn load_default() -> Result<Option<Self>, RepositoryError> {
        Self::load_from(Path::new("."))
    }

    /// Search the standard locations relative to `base`.
    pub fn load_from(base: &Path) -> Result<Option<Self>, RepositoryError> {
        match Self::find_in(base) {
            Some(path) => Self::from_file(path).map(Some),
            None => Ok(None),
        }
    }

    /// First `repository.toml` found relative to `base`.
    pub fn find_in(base: &Path) -> Option<PathBuf> {
        ["repository.toml", "backend/repository.toml", "../repository.toml"]
            .into_iter()
            .map(|relative| base.join(relative))
            .find(|path| path.exists())
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Normalizer for the configured civil timezone.
    ///
    /// Without a `[timezone]` section the built-in defaults apply.
    pub fn normalizer(&self) -> Result<TimestampNormalizer, RepositoryError> {
        let settings = self.timezone.clone().unwrap_or_default();
        validate_display_format(&settings.display_format)
            .map_err(|e| RepositoryError::configuration(e.to_string()))?;
        let normalizer = TimestampNormalizer::from_zone_name(&settings.name)
            .map_err(|e| RepositoryError::configuration(e.to_string()))?;
        Ok(normalizer.with_display_format(settings.display_format))
    }

    /// Convert to RestConfig if this is a REST configuration.
    #[cfg(feature = "rest-repo")]
    pub fn to_rest_config(
        &self,
    ) -> Result<Option<super::repositories::RestConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type != RepositoryType::Rest {
            return Ok(None);
        }

        let config = super::repositories::RestConfig {
            url: self.rest.url.clone(),
            api_key: self.rest.key.clone(),
            timeout_sec: self.rest.timeout,
            max_retries: self.rest.max_retries,
            retry_delay_ms: self.rest.retry_delay_ms,
        }
        .validated()
        .map_err(|e| RepositoryError::configuration(format!("[rest] {}", e)))?;

        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_config() {
        let toml = r#"
[repository]
type = "local"
"#;

        let config = RepositoryConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.repository.repo_type, "local");
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
        assert!(config.timezone.is_none());
        let normalizer = config.normalizer().unwrap();
        assert_eq!(normalizer.zone_name(), "Europe/Kiev");
        assert_eq!(normalizer.display_format(), "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn test_timezone_section() {
        let toml = r#"
[repository]
type = "local"

[timezone]
name = "America/New_York"
display_format = "%d.%m.%Y"
"#;

        let config = RepositoryConfig::from_toml_str(toml).unwrap();
        let normalizer = config.normalizer().unwrap();
        assert_eq!(normalizer.zone_name(), "America/New_York");
        assert_eq!(normalizer.display_format(), "%d.%m.%Y");
    }

    #[test]
    fn test_unknown_timezone_is_configuration_error() {
        let toml = r#"
[repository]
type = "local"

[timezone]
name = "Nowhere/Special"
"#;

        let config = RepositoryConfig::from_toml_str(toml).unwrap();
        assert!(matches!(
            config.normalizer().unwrap_err(),
            RepositoryError::ConfigurationError { .. }
        ));
    }

    #[test]
    fn test_unrenderable_display_format_is_configuration_error() {
        let toml = r#"
[repository]
type = "local"

[timezone]
display_format = "%Y-%Q"
"#;

        let config = RepositoryConfig::from_toml_str(toml).unwrap();
        let err = config.normalizer().unwrap_err();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
        assert!(err.to_string().contains("%Y-%Q"));
    }

    #[test]
    fn test_missing_repository_section_fails() {
        assert!(RepositoryConfig::from_toml_str("[rest]\nurl = \"x\"\n").is_err());
    }

    #[cfg(feature = "rest-repo")]
    #[test]
    fn test_parse_rest_config() {
        let toml = r#"
[repository]
type = "rest"

[rest]
url = "https://abc.supabase.co"
key = "anon"
timeout = 5
max_retries = 1
"#;

        let config = RepositoryConfig::from_toml_str(toml).unwrap();
        let rest = config.to_rest_config().unwrap().unwrap();
        assert_eq!(rest.url, "https://abc.supabase.co");
        assert_eq!(rest.api_key, "anon");
        assert_eq!(rest.timeout_sec, 5);
        assert_eq!(rest.max_retries, 1);
        assert_eq!(rest.retry_delay_ms, 100);
    }

    #[cfg(feature = "rest-repo")]
    #[test]
    fn test_rest_requires_url() {
        let toml = r#"
[repository]
type = "rest"

[rest]
key = "anon"
"#;

        let config = RepositoryConfig::from_toml_str(toml).unwrap();
        assert!(config.to_rest_config().is_err());
    }
}
