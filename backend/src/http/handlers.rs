//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{
    parse_sensor_id, ChartData, ChartQuery, DeleteResponse, HealthResponse, ReadingListResponse,
    ReadingRequest, RecordResponse, RecordsQuery, SensorForm, SensorListResponse, TablePage,
    TableParams,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{RecordId, Sensor};
use crate::services::{self, entry::DEFAULT_RECENT_LIMIT, table::DEFAULT_ROWS_PER_PAGE};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn parse_record_id(raw: &str) -> Result<RecordId, AppError> {
    raw.parse::<RecordId>()
        .map_err(|_| AppError::BadRequest(format!("Invalid record ID: {}", raw.trim())))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
        timezone: state.normalizer.zone_name().to_string(),
    }))
}

// =============================================================================
// Sensors
// =============================================================================

/// GET /v1/sensors
pub async fn list_sensors(State(state): State<AppState>) -> HandlerResult<SensorListResponse> {
    let sensors = db_services::list_sensors(state.repository.as_ref()).await?;
    let total = sensors.len();
    Ok(Json(SensorListResponse { sensors, total }))
}

/// POST /v1/sensors
pub async fn create_sensor(
    State(state): State<AppState>,
    Json(form): Json<SensorForm>,
) -> Result<(StatusCode, Json<Sensor>), AppError> {
    let sensor = services::register_sensor(state.repository.as_ref(), &state.gate, &form).await?;
    Ok((StatusCode::CREATED, Json(sensor)))
}

/// GET /v1/sensors/{id}
pub async fn get_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Sensor> {
    let id = parse_sensor_id(&id)?;
    let sensor = db_services::require_sensor(state.repository.as_ref(), id).await?;
    Ok(Json(sensor))
}

/// PUT /v1/sensors/{id}
pub async fn update_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<SensorForm>,
) -> HandlerResult<Sensor> {
    let id = parse_sensor_id(&id)?;
    let sensor = services::edit_sensor(state.repository.as_ref(), &state.gate, id, &form).await?;
    Ok(Json(sensor))
}

/// DELETE /v1/sensors/{id}
///
/// Removes the sensor and all of its readings.
pub async fn delete_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<DeleteResponse> {
    let id = parse_sensor_id(&id)?;
    if !db_services::delete_sensor(state.repository.as_ref(), id).await? {
        return Err(AppError::NotFound(format!("Sensor {} not found", id)));
    }
    Ok(Json(DeleteResponse { deleted: true }))
}

// =============================================================================
// Readings
// =============================================================================

/// GET /v1/records?limit=
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> HandlerResult<ReadingListResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let records =
        services::recent_readings(state.repository.as_ref(), &state.normalizer, limit).await?;
    let total = records.len();
    Ok(Json(ReadingListResponse { records, total }))
}

/// POST /v1/records
pub async fn create_record(
    State(state): State<AppState>,
    Json(request): Json<ReadingRequest>,
) -> Result<(StatusCode, Json<RecordResponse>), AppError> {
    let form = request.into_form();
    let record = services::submit_reading(state.repository.as_ref(), &state.gate, &form).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordResponse::from_record(&record, &state.normalizer)),
    ))
}

/// GET /v1/records/{id}
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<RecordResponse> {
    let id = parse_record_id(&id)?;
    let record = db_services::require_record(state.repository.as_ref(), id).await?;
    Ok(Json(RecordResponse::from_record(&record, &state.normalizer)))
}

/// PUT /v1/records/{id}
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReadingRequest>,
) -> HandlerResult<RecordResponse> {
    let id = parse_record_id(&id)?;
    let form = request.into_form();
    let record =
        services::amend_reading(state.repository.as_ref(), &state.gate, id, &form).await?;
    Ok(Json(RecordResponse::from_record(&record, &state.normalizer)))
}

/// DELETE /v1/records/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<DeleteResponse> {
    let id = parse_record_id(&id)?;
    if !db_services::delete_record(state.repository.as_ref(), id).await? {
        return Err(AppError::NotFound(format!("Record {} not found", id)));
    }
    Ok(Json(DeleteResponse { deleted: true }))
}

// =============================================================================
// Analysis
// =============================================================================

/// GET /v1/chart?sensor_ids=a,b&start=YYYY-MM-DD&end=YYYY-MM-DD
pub async fn get_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> HandlerResult<ChartData> {
    let sensor_ids = query.sensor_ids()?;
    let data = services::chart_series(
        state.repository.as_ref(),
        &state.normalizer,
        &sensor_ids,
        query.start,
        query.end,
    )
    .await?;
    Ok(Json(data))
}

/// GET /v1/table
pub async fn get_table(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> HandlerResult<TablePage> {
    let query = params.to_query()?;
    let page = services::table_page(
        state.repository.as_ref(),
        &state.normalizer,
        &query,
        params.page.unwrap_or(1),
        params.per_page.unwrap_or(DEFAULT_ROWS_PER_PAGE),
    )
    .await?;
    Ok(Json(page))
}

/// GET /v1/export.csv
///
/// Same filters as the table; every matching row, no pagination.
pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Result<Response, AppError> {
    let query = params.to_query()?;
    let export =
        services::export_csv(state.repository.as_ref(), &state.normalizer, &query).await?;

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}
