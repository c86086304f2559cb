//! Tests for the HTTP router - request routing, status codes and payloads.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use biogas_backend::db::repository::FullRepository;
use biogas_backend::db::LocalRepository;
use biogas_backend::http::dto::ReadingListResponse;
use biogas_backend::http::{create_router, AppState};
use biogas_backend::time::TimestampNormalizer;

fn app_with(repo: Arc<LocalRepository>) -> Router {
    let normalizer = TimestampNormalizer::from_zone_name("Europe/Kiev").unwrap();
    create_router(AppState::new(repo as Arc<dyn FullRepository>, normalizer))
}

fn app() -> Router {
    app_with(Arc::new(LocalRepository::new()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_sensor(app: &Router, name: &str, unit: &str) -> String {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/v1/sensors",
        Some(json!({ "name": name, "unit": unit })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send_json(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["timezone"], "Europe/Kiev");
}

#[tokio::test]
async fn test_health_reports_disconnected_store() {
    let repo = Arc::new(LocalRepository::new());
    repo.set_healthy(false);
    let (status, body) = send_json(&app_with(repo), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_sensor_lifecycle() {
    let app = app();
    let id = create_sensor(&app, "Reactor temperature", "°C").await;

    let (status, body) = send_json(&app, Method::GET, "/v1/sensors", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["sensors"][0]["name"], "Reactor temperature");

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/v1/sensors/{id}"),
        Some(json!({ "name": "Reactor 2 temperature", "comment": "moved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Reactor 2 temperature");
    assert_eq!(body["unit"], "°C");
    assert_eq!(body["comment"], "moved");

    let (status, _) = send_json(&app, Method::DELETE, &format!("/v1/sensors/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, Method::GET, &format!("/v1/sensors/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send_json(&app, Method::DELETE, &format!("/v1/sensors/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sensor_without_name_rejected() {
    let (status, body) = send_json(
        &app(),
        Method::POST,
        "/v1/sensors",
        Some(json!({ "name": "  ", "unit": "°C" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "REQUIRED_FIELD_MISSING");
    assert_eq!(body["message"], "Sensor Name is required");
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let (status, body) = send_json(&app(), Method::GET, "/v1/sensors/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_reading_submission_and_listing() {
    let app = app();
    let sensor_id = create_sensor(&app, "Temperature", "°C").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/v1/records",
        Some(json!({
            "sensor_id": sensor_id,
            "date": "2024-01-15",
            "time": "10:30:00",
            "value": "37.5"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["recorded_at"], "2024-01-15T08:30:00.000000Z");
    assert_eq!(body["recorded_at_local"], "2024-01-15 10:30:00");
    assert_eq!(body["value"], 37.5);
    let record_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(&app, Method::GET, "/v1/records?limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["records"][0]["sensor"], "Temperature");

    let listing: ReadingListResponse = serde_json::from_value(body).unwrap();
    assert_eq!(listing.total, 1);
    assert_eq!(listing.records[0].recorded_at, "2024-01-15 10:30:00");
    assert_eq!(listing.records[0].value, 37.5);

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/v1/records/{record_id}"),
        Some(json!({
            "sensor_id": sensor_id,
            "date": "2024-01-15",
            "time": "11:00:00",
            "value": 38
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recorded_at"], "2024-01-15T09:00:00.000000Z");
    assert_eq!(body["value"], 38.0);

    let (status, _) = send_json(&app, Method::DELETE, &format!("/v1/records/{record_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(&app, Method::GET, &format!("/v1/records/{record_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reading_rejections() {
    let app = app();
    let sensor_id = create_sensor(&app, "Temperature", "°C").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/v1/records",
        Some(json!({
            "sensor_id": sensor_id,
            "date": "2024-01-15",
            "time": "10:30:00",
            "value": "warm"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NOT_A_NUMBER");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/v1/records",
        Some(json!({
            "sensor_id": sensor_id,
            "date": "2999-01-01",
            "time": "00:00:00",
            "value": "1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "FUTURE_TIMESTAMP");

    let (_, body) = send_json(&app, Method::GET, "/v1/records", None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_malformed_stored_row_is_server_error() {
    let repo = Arc::new(LocalRepository::new());
    let app = app_with(repo.clone());
    let sensor_id = create_sensor(&app, "Temperature", "°C").await;
    repo.insert_raw_record(sensor_id.parse().unwrap(), "garbage", 1.0)
        .unwrap();

    let (status, body) = send_json(&app, Method::GET, "/v1/records", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "DATA_INTEGRITY_ERROR");
}

#[tokio::test]
async fn test_chart_endpoint() {
    let app = app();
    let sensor_id = create_sensor(&app, "Temperature", "°C").await;
    for (time, value) in [("08:00:00", 35), ("09:00:00", 39)] {
        let (status, _) = send_json(
            &app,
            Method::POST,
            "/v1/records",
            Some(json!({
                "sensor_id": sensor_id,
                "date": "2024-03-10",
                "time": time,
                "value": value
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!("/v1/chart?sensor_ids={sensor_id}&start=2024-03-10&end=2024-03-10");
    let (status, body) = send_json(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["series"][0]["points"].as_array().unwrap().len(), 2);
    assert_eq!(body["summary"][0]["mean"], 37.0);

    let uri = format!("/v1/chart?sensor_ids={sensor_id}&start=2024-03-11&end=2024-03-10");
    let (status, body) = send_json(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_RANGE");
}

#[tokio::test]
async fn test_table_and_export() {
    let app = app();
    let sensor_id = create_sensor(&app, "Gas flow", "m³/h").await;
    for day in ["2024-05-01", "2024-05-02", "2024-05-03"] {
        send_json(
            &app,
            Method::POST,
            "/v1/records",
            Some(json!({
                "sensor_id": sensor_id,
                "date": day,
                "time": "12:00:00",
                "value": 2.5
            })),
        )
        .await;
    }

    let (status, body) = send_json(
        &app,
        Method::GET,
        "/v1/table?range=all&sort=oldest&per_page=2&page=2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total_rows"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["rows"][0]["timestamp"], "2024-05-03 12:00:00");

    let (status, body) = send_json(&app, Method::GET, "/v1/table?range=fortnight", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let request = Request::builder()
        .uri("/v1/export.csv?start=2024-05-02&end=2024-05-02")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"biogas_sensor_data_"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        String::from_utf8(body.to_vec()).unwrap(),
        "Sensor,Unit,Timestamp,Value\nGas flow,m³/h,2024-05-02 12:00:00,2.5\n"
    );
}
