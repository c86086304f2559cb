//! Tests for db::repository::error and the service error codes built on it.

use biogas_backend::db::repository::{ErrorContext, RepositoryError};
use biogas_backend::services::{ServiceError, ValidationError};
use biogas_backend::time::{parse_timestamp_text, TimestampParseError};
use chrono::NaiveDate;

#[test]
fn test_error_context_chaining() {
    let ctx = ErrorContext::new("put_record")
        .with_entity("sensor_record")
        .with_entity_id("4f1c")
        .with_details("status=503")
        .retryable();

    assert_eq!(ctx.operation.as_deref(), Some("put_record"));
    assert_eq!(ctx.entity.as_deref(), Some("sensor_record"));
    assert_eq!(ctx.entity_id.as_deref(), Some("4f1c"));
    assert_eq!(ctx.details.as_deref(), Some("status=503"));
    assert!(ctx.retryable);
}

#[test]
fn test_error_context_display() {
    let ctx = ErrorContext::new("get_sensor")
        .with_entity("sensor")
        .with_entity_id(7);

    let display = ctx.to_string();
    assert!(display.contains("operation=get_sensor"));
    assert!(display.contains("entity=sensor"));
    assert!(display.contains("id=7"));
    assert!(!display.contains("retryable"));
}

#[test]
fn test_transient_errors_are_retryable() {
    assert!(RepositoryError::connection("refused").is_retryable());
    assert!(RepositoryError::timeout("20s elapsed").is_retryable());
    assert!(!RepositoryError::query("syntax").is_retryable());
    assert!(!RepositoryError::not_found("gone").is_retryable());
    assert!(!RepositoryError::data_integrity("bad row").is_retryable());
}

#[test]
fn test_with_operation_and_entity() {
    let err = RepositoryError::not_found("Sensor missing")
        .with_operation("update_sensor")
        .with_entity("sensor", Some("abc".to_string()));

    assert!(err.is_not_found());
    let ctx = err.context();
    assert_eq!(ctx.operation.as_deref(), Some("update_sensor"));
    assert_eq!(ctx.entity.as_deref(), Some("sensor"));
    assert_eq!(ctx.entity_id.as_deref(), Some("abc"));

    let message = err.to_string();
    assert!(message.starts_with("Not found: Sensor missing"));
    assert!(message.contains("operation=update_sensor"));
}

#[test]
fn test_parse_failure_becomes_integrity_error() {
    let parse_err = parse_timestamp_text("31/12/2023").unwrap_err();
    assert!(matches!(parse_err, TimestampParseError::UnparseableFormat { .. }));

    let err: RepositoryError = parse_err.into();
    assert!(matches!(err, RepositoryError::DataIntegrityError { .. }));
    assert_eq!(err.context().details.as_deref(), Some("UNPARSEABLE_FORMAT"));
}

#[test]
fn test_service_error_codes() {
    let cases: Vec<(ServiceError, &str)> = vec![
        (ValidationError::EmptyValue.into(), "EMPTY_VALUE"),
        (
            ValidationError::RequiredFieldMissing("Sensor Name".to_string()).into(),
            "REQUIRED_FIELD_MISSING",
        ),
        (RepositoryError::not_found("x").into(), "NOT_FOUND"),
        (RepositoryError::validation("x").into(), "VALIDATION_ERROR"),
        (RepositoryError::data_integrity("x").into(), "DATA_INTEGRITY_ERROR"),
        (RepositoryError::connection("x").into(), "CONNECTION_ERROR"),
        (RepositoryError::timeout("x").into(), "TIMEOUT_ERROR"),
        (RepositoryError::query("x").into(), "REPOSITORY_ERROR"),
        (
            ServiceError::InvalidRange {
                start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            },
            "INVALID_RANGE",
        ),
    ];

    for (err, code) in cases {
        assert_eq!(err.code(), code, "{err}");
    }
}

#[test]
fn test_service_error_messages_pass_through() {
    let err: ServiceError = ValidationError::NotANumber {
        input: "abc".to_string(),
    }
    .into();
    assert_eq!(err.to_string(), "'abc' is not a valid number");

    let err = ServiceError::InvalidRange {
        start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    };
    assert_eq!(err.to_string(), "Start date 2024-02-01 is after end date 2024-01-01");
}
