//! Input gate for operator-entered values.
//!
//! Every value typed into an entry form passes through [`ValueGate`] before a
//! record is built:
//! - numeric readings must parse as a finite floating-point number
//! - required text fields must contain something other than whitespace
//! - reading timestamps must not lie in the future, judged in local time
//!
//! All checks are synchronous and perform no I/O. Failures are returned as
//! [`ValidationError`] values for the caller to present.

use crate::models::LocalCivilTime;
use crate::time::TimestampNormalizer;

/// Rejection reasons for operator input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A numeric field was blank.
    #[error("Value cannot be empty")]
    EmptyValue,

    /// A numeric field did not hold a finite number.
    #[error("'{input}' is not a valid number")]
    NotANumber { input: String },

    /// The reading is dated after the current local minute.
    #[error("Cannot record future timestamps ({candidate} is after {now})")]
    FutureTimestamp {
        candidate: LocalCivilTime,
        now: LocalCivilTime,
    },

    /// A required text field was blank. Carries the field's display name.
    #[error("{0} is required")]
    RequiredFieldMissing(String),
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyValue => "EMPTY_VALUE",
            ValidationError::NotANumber { .. } => "NOT_A_NUMBER",
            ValidationError::FutureTimestamp { .. } => "FUTURE_TIMESTAMP",
            ValidationError::RequiredFieldMissing(_) => "REQUIRED_FIELD_MISSING",
        }
    }
}

/// Result type for gate checks.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates entry-form input against the dashboard's rules.
///
/// Holds the normalizer so "now" is read in the same civil timezone the
/// operator types in.
#[derive(Debug, Clone, Default)]
pub struct ValueGate {
    normalizer: TimestampNormalizer,
}

impl ValueGate {
    pub fn new(normalizer: TimestampNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &TimestampNormalizer {
        &self.normalizer
    }

    /// Parse a numeric reading.
    ///
    /// Surrounding whitespace is ignored; the parsed value is returned as-is
    /// (no rounding or range clamping).
    ///
    /// # Errors
    /// * [`ValidationError::EmptyValue`] for blank input
    /// * [`ValidationError::NotANumber`] when the text is not a finite number
    pub fn validate_numeric(&self, text: &str) -> ValidationResult<f64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyValue);
        }

        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ValidationError::NotANumber {
                input: text.to_string(),
            }),
        }
    }

    /// Reject readings dated after the current local minute.
    pub fn validate_timestamp_not_future(&self, local: LocalCivilTime) -> ValidationResult<()> {
        self.validate_timestamp_not_future_at(local, self.normalizer.now_local())
    }

    /// [`validate_timestamp_not_future`](Self::validate_timestamp_not_future)
    /// against an explicit clock reading.
    ///
    /// Both sides are truncated to the minute, matching the minute-level
    /// input of the entry form: a reading stamped in the current minute is
    /// accepted even if its seconds are ahead of the clock.
    pub fn validate_timestamp_not_future_at(
        &self,
        local: LocalCivilTime,
        now_local: LocalCivilTime,
    ) -> ValidationResult<()> {
        let candidate = local.truncated_to_minute();
        let now = now_local.truncated_to_minute();
        if candidate > now {
            return Err(ValidationError::FutureTimestamp { candidate, now });
        }
        Ok(())
    }

    /// Reject blank required fields.
    pub fn validate_required(&self, text: &str, field_name: &str) -> ValidationResult<()> {
        if text.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing(field_name.to_string()));
        }
        Ok(())
    }
}
