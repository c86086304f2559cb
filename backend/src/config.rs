//! Application configuration and environment variable handling.

use std::env;

use crate::db::RepositoryConfig;
use crate::time::{
    validate_display_format, TimestampNormalizer, TimezoneError, DEFAULT_DISPLAY_FORMAT,
    DEFAULT_TIMEZONE,
};

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Timezone(#[from] TimezoneError),

    #[error("{name} has an invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Process-level settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// IANA zone operators enter readings in
    pub timezone: String,
    /// strftime pattern for tables and exports
    pub display_format: String,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `APP_TIMEZONE` (optional, default: `Europe/Kiev`)
    /// - `DISPLAY_FORMAT` (optional, default: `%Y-%m-%d %H:%M:%S`)
    /// - `HOST` (optional, default: `0.0.0.0`)
    /// - `PORT` (optional, default: 8080)
    ///
    /// # Errors
    /// Unknown timezone names, display patterns chrono cannot render and
    /// unparseable ports are rejected rather than silently replaced by defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_defaults(Self::default())
    }

    /// Like [`from_env`](Self::from_env), with the `[timezone]` section of a
    /// `repository.toml` (when it has one) standing in for the built-in
    /// defaults. Environment variables still take precedence.
    pub fn from_env_over_file(file: Option<&RepositoryConfig>) -> Result<Self, ConfigError> {
        let mut defaults = Self::default();
        if let Some(settings) = file.and_then(|f| f.timezone.as_ref()) {
            defaults.timezone = settings.name.clone();
            defaults.display_format = settings.display_format.clone();
        }
        Self::from_env_with_defaults(defaults)
    }

    fn from_env_with_defaults(defaults: Self) -> Result<Self, ConfigError> {
        let timezone = non_empty_var("APP_TIMEZONE").unwrap_or(defaults.timezone);
        // Fail early on a bad zone name
        TimestampNormalizer::from_zone_name(&timezone)?;

        let display_format = non_empty_var("DISPLAY_FORMAT").unwrap_or(defaults.display_format);
        check_display_format(&display_format)?;
        let host = non_empty_var("HOST").unwrap_or(defaults.host);
        let port = match non_empty_var("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value })?,
            None => defaults.port,
        };

        Ok(Self {
            timezone,
            display_format,
            host,
            port,
        })
    }

    /// Normalizer for the configured zone and display pattern.
    pub fn normalizer(&self) -> Result<TimestampNormalizer, ConfigError> {
        check_display_format(&self.display_format)?;
        Ok(TimestampNormalizer::from_zone_name(&self.timezone)?
            .with_display_format(self.display_format.clone()))
    }

    /// `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn check_display_format(pattern: &str) -> Result<(), ConfigError> {
    validate_display_format(pattern).map_err(|_| ConfigError::InvalidValue {
        name: "DISPLAY_FORMAT",
        value: pattern.to_string(),
    })
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
