//! Hosted record store over the PostgREST dialect.
//!
//! Talks to `{url}/rest/v1/sensors` and `{url}/rest/v1/sensor_records` with
//! the project's API key. Timestamps are sent as canonical UTC text and
//! parsed back through the tolerant parser on every read.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `SUPABASE_URL`: Project base URL (required)
//! - `SUPABASE_KEY`: API key sent as `apikey` and bearer token (required)
//! - `REST_TIMEOUT_SEC`: Request timeout in seconds (default: 20)
//! - `REST_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `REST_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::db::repository::*;
use crate::models::{
    NewRecord, NewSensor, RecordFilter, RecordId, RecordUpdate, Sensor, SensorId, SensorRecord,
    SensorSummary, SensorUpdate,
};
use crate::time::{parse_timestamp_text, to_store_text};

const SENSORS_TABLE: &str = "sensors";
const RECORDS_TABLE: &str = "sensor_records";
const RECORD_SELECT: &str = "*,sensors(name,unit)";

/// Configuration for connecting to the hosted store.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project base URL, without the `/rest/v1` suffix
    pub url: String,
    /// API key
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_sec: 20,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl RestConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| "SUPABASE_URL must be set".to_string())?;
        let api_key = std::env::var("SUPABASE_KEY")
            .map_err(|_| "SUPABASE_KEY must be set".to_string())?;

        let timeout_sec = std::env::var("REST_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(20);

        let max_retries = std::env::var("REST_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("REST_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Self {
            url,
            api_key,
            timeout_sec,
            max_retries,
            retry_delay_ms,
        }
        .validated()
    }

    /// Create a configuration with credentials and default tuning.
    pub fn with_credentials(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Reject blank credentials.
    pub fn validated(self) -> Result<Self, String> {
        if self.url.trim().is_empty() {
            return Err("REST repository requires a project URL".to_string());
        }
        if self.api_key.trim().is_empty() {
            return Err("REST repository requires an API key".to_string());
        }
        Ok(self)
    }

    /// `{url}/rest/v1/{table}`
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), table)
    }
}

/// `sensor_records` row as the hosted store returns it.
#[derive(Debug, Clone, Deserialize)]
struct RecordRow {
    id: RecordId,
    sensor_id: SensorId,
    recorded_at: String,
    value: f64,
    #[serde(default)]
    sensors: Option<SensorSummary>,
}

impl RecordRow {
    fn into_record(self) -> RepositoryResult<SensorRecord> {
        let recorded_at = parse_timestamp_text(&self.recorded_at).map_err(|e| {
            RepositoryError::from(e)
                .with_operation("read_record")
                .with_entity("sensor_record", Some(self.id.to_string()))
        })?;
        Ok(SensorRecord {
            id: self.id,
            sensor_id: self.sensor_id,
            recorded_at,
            value: self.value,
            sensor: self.sensors,
        })
    }
}

#[derive(Debug, Serialize)]
struct RecordInsert {
    sensor_id: SensorId,
    recorded_at: String,
    value: f64,
}

#[derive(Debug, Default, Serialize)]
struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    sensor_id: Option<SensorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recorded_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
}

impl From<&RecordUpdate> for RecordPatch {
    fn from(update: &RecordUpdate) -> Self {
        Self {
            sensor_id: update.sensor_id,
            recorded_at: update.recorded_at.as_ref().map(to_store_text),
            value: update.value,
        }
    }
}

/// Query parameters for a filtered record listing.
pub fn record_query(filter: &RecordFilter) -> Vec<(String, String)> {
    let mut query = vec![("select".to_string(), RECORD_SELECT.to_string())];

    if let Some(ids) = &filter.sensor_ids {
        let list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        query.push(("sensor_id".to_string(), format!("in.({})", list)));
    }
    if let Some(start) = &filter.start {
        query.push(("recorded_at".to_string(), format!("gte.{}", to_store_text(start))));
    }
    if let Some(end) = &filter.end {
        query.push(("recorded_at".to_string(), format!("lte.{}", to_store_text(end))));
    }
    query.push((
        "order".to_string(),
        format!("recorded_at.{}", filter.order.as_str()),
    ));
    if let Some(limit) = filter.limit {
        query.push(("limit".to_string(), limit.to_string()));
    }
    query
}

/// `column=eq.value`
pub fn eq_filter(column: &str, value: impl ToString) -> (String, String) {
    (column.to_string(), format!("eq.{}", value.to_string()))
}

/// Translate a non-success response into a repository error.
fn status_error(status: StatusCode, body: &str, operation: &str) -> RepositoryError {
    let context = ErrorContext::new(operation).with_details(format!("status={} body={}", status, body.trim()));
    match status {
        StatusCode::NOT_FOUND => RepositoryError::not_found_with_context("Resource not found", context),
        // Foreign key or uniqueness violations
        StatusCode::CONFLICT | StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            RepositoryError::ValidationError {
                message: "Store rejected the payload".to_string(),
                context,
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RepositoryError::ConfigurationError {
            message: "Store refused the API key".to_string(),
            context,
        },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => RepositoryError::TimeoutError {
            message: "Store timed out".to_string(),
            context: context.retryable(),
        },
        s if s.is_server_error() => {
            RepositoryError::query_with_context("Store failed the request", context.retryable())
        }
        _ => RepositoryError::query_with_context("Unexpected response", context),
    }
}

/// PostgREST-backed repository.
#[derive(Clone, Debug)]
pub struct RestRepository {
    client: Client,
    config: RestConfig,
}

impl RestRepository {
    /// Build the HTTP client. No request is made until the first call.
    pub fn new(config: RestConfig) -> RepositoryResult<Self> {
        let config = config.validated().map_err(RepositoryError::configuration)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| {
                RepositoryError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn request(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.config.table_url(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// Send with automatic retry for transient failures.
    async fn send<F>(&self, operation: &str, build: F) -> RepositoryResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let max_retries = self.config.max_retries;
        let mut retry_delay =
            Duration::from_millis(self.config.retry_delay_ms).min(MAX_RETRY_DELAY);
        let mut attempt = 0;

        loop {
            let result = match build().send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    Err(status_error(status, &body, operation))
                }
                Err(e) => Err(RepositoryError::from(e).with_operation(operation)),
            };

            match result {
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    log::warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        operation,
                        attempt,
                        max_retries + 1,
                        retry_delay,
                        e
                    );
                    tokio::time::sleep(retry_delay).await;
                    retry_delay = next_retry_delay(retry_delay);
                }
                Err(e) => return Err(e),
                Ok(response) => return Ok(response),
            }
        }
    }

    async fn rows<T: serde::de::DeserializeOwned>(response: Response) -> RepositoryResult<Vec<T>> {
        response.json::<Vec<T>>().await.map_err(RepositoryError::from)
    }

    fn first<T>(rows: Vec<T>, operation: &str, entity: &str) -> RepositoryResult<T> {
        rows.into_iter().next().ok_or_else(|| {
            RepositoryError::data_integrity_with_context(
                "Store returned no row",
                ErrorContext::new(operation).with_entity(entity),
            )
        })
    }
}

#[async_trait]
impl SensorRepository for RestRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let result = self
            .request(reqwest::Method::GET, SENSORS_TABLE)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await;
        match result {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                log::warn!("Store health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn list_sensors(&self) -> RepositoryResult<Vec<Sensor>> {
        let response = self
            .send("list_sensors", || {
                self.request(reqwest::Method::GET, SENSORS_TABLE)
                    .query(&[("select", "*"), ("order", "name.asc")])
            })
            .await?;
        Self::rows(response).await
    }

    async fn get_sensor(&self, id: SensorId) -> RepositoryResult<Option<Sensor>> {
        let response = self
            .send("get_sensor", || {
                self.request(reqwest::Method::GET, SENSORS_TABLE)
                    .query(&[("select", "*".to_string())])
                    .query(&[eq_filter("id", id)])
            })
            .await?;
        Ok(Self::rows::<Sensor>(response).await?.into_iter().next())
    }

    async fn create_sensor(&self, sensor: &NewSensor) -> RepositoryResult<Sensor> {
        let response = self
            .send("create_sensor", || {
                self.request(reqwest::Method::POST, SENSORS_TABLE)
                    .header("Prefer", "return=representation")
                    .json(sensor)
            })
            .await?;
        Self::first(Self::rows(response).await?, "create_sensor", "sensor")
    }

    async fn update_sensor(&self, id: SensorId, update: &SensorUpdate) -> RepositoryResult<Sensor> {
        let response = self
            .send("update_sensor", || {
                self.request(reqwest::Method::PATCH, SENSORS_TABLE)
                    .header("Prefer", "return=representation")
                    .query(&[eq_filter("id", id)])
                    .json(update)
            })
            .await?;
        Self::rows::<Sensor>(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Sensor {} not found", id),
                    ErrorContext::new("update_sensor")
                        .with_entity("sensor")
                        .with_entity_id(id),
                )
            })
    }

    async fn delete_sensor(&self, id: SensorId) -> RepositoryResult<bool> {
        // Records go with it through the table's ON DELETE CASCADE.
        let response = self
            .send("delete_sensor", || {
                self.request(reqwest::Method::DELETE, SENSORS_TABLE)
                    .header("Prefer", "return=representation")
                    .query(&[eq_filter("id", id)])
            })
            .await?;
        Ok(!Self::rows::<Sensor>(response).await?.is_empty())
    }
}

#[async_trait]
impl RecordRepository for RestRepository {
    async fn put_record(&self, record: &NewRecord) -> RepositoryResult<SensorRecord> {
        let payload = RecordInsert {
            sensor_id: record.sensor_id,
            recorded_at: to_store_text(&record.recorded_at),
            value: record.value,
        };
        let response = self
            .send("put_record", || {
                self.request(reqwest::Method::POST, RECORDS_TABLE)
                    .header("Prefer", "return=representation")
                    .query(&[("select", RECORD_SELECT)])
                    .json(&payload)
            })
            .await?;
        Self::first(Self::rows::<RecordRow>(response).await?, "put_record", "sensor_record")?
            .into_record()
    }

    async fn get_record(&self, id: RecordId) -> RepositoryResult<Option<SensorRecord>> {
        let response = self
            .send("get_record", || {
                self.request(reqwest::Method::GET, RECORDS_TABLE)
                    .query(&[("select", RECORD_SELECT.to_string())])
                    .query(&[eq_filter("id", id)])
            })
            .await?;
        Self::rows::<RecordRow>(response)
            .await?
            .into_iter()
            .next()
            .map(RecordRow::into_record)
            .transpose()
    }

    async fn list_records(&self, filter: &RecordFilter) -> RepositoryResult<Vec<SensorRecord>> {
        if matches!(&filter.sensor_ids, Some(ids) if ids.is_empty()) {
            return Ok(Vec::new());
        }

        let query = record_query(filter);
        let response = self
            .send("list_records", || {
                self.request(reqwest::Method::GET, RECORDS_TABLE).query(&query)
            })
            .await?;
        Self::rows::<RecordRow>(response)
            .await?
            .into_iter()
            .map(RecordRow::into_record)
            .collect()
    }

    async fn update_record(&self, id: RecordId, update: &RecordUpdate) -> RepositoryResult<SensorRecord> {
        let patch = RecordPatch::from(update);
        let response = self
            .send("update_record", || {
                self.request(reqwest::Method::PATCH, RECORDS_TABLE)
                    .header("Prefer", "return=representation")
                    .query(&[("select", RECORD_SELECT.to_string())])
                    .query(&[eq_filter("id", id)])
                    .json(&patch)
            })
            .await?;
        Self::rows::<RecordRow>(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Record {} not found", id),
                    ErrorContext::new("update_record")
                        .with_entity("sensor_record")
                        .with_entity_id(id),
                )
            })?
            .into_record()
    }

    async fn delete_record(&self, id: RecordId) -> RepositoryResult<bool> {
        let response = self
            .send("delete_record", || {
                self.request(reqwest::Method::DELETE, RECORDS_TABLE)
                    .header("Prefer", "return=representation")
                    .query(&[("select", "id".to_string())])
                    .query(&[eq_filter("id", id)])
            })
            .await?;
        Ok(!Self::rows::<serde_json::Value>(response).await?.is_empty())
    }
}

/// Upper bound for the pause between retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);

/// Exponential backoff step, capped at [`MAX_RETRY_DELAY`].
fn next_retry_delay(delay: Duration) -> Duration {
    delay.saturating_mul(2).min(MAX_RETRY_DELAY)
}
