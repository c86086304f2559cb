//! Error types for timestamp parsing and timezone configuration.

/// Why a timestamp string could not be turned into an instant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampParseError {
    /// Input was empty or only whitespace.
    #[error("Timestamp string is empty")]
    EmptyInput,

    /// None of the recognized patterns matched.
    #[error("Unable to parse timestamp: {input}")]
    UnparseableFormat { input: String },
}

impl TimestampParseError {
    pub fn code(&self) -> &'static str {
        match self {
            TimestampParseError::EmptyInput => "EMPTY_INPUT",
            TimestampParseError::UnparseableFormat { .. } => "UNPARSEABLE_FORMAT",
        }
    }
}

/// The configured zone identifier is not a known IANA zone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown timezone identifier: '{name}'")]
pub struct TimezoneError {
    pub name: String,
}

/// The display pattern contains a specifier chrono cannot render.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid display format: '{pattern}'")]
pub struct DisplayFormatError {
    pub pattern: String,
}
