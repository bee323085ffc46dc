//! HTTP API integration tests.
//!
//! Drives the full router with `tower::ServiceExt::oneshot` and checks the
//! status codes and bodies of every endpoint.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use flight_control::{AppState, FlightControl, PassengerLog, build_router};
use flight_control::api::operations::OperationResponse;
use flight_control_core::environment::SystemClock;
use flight_control_runtime::{OperationId, OperationRunner};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    control: Arc<FlightControl>,
    _dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = PassengerLog::new(dir.path().join("log").join("passengers.csv"));
        let control = Arc::new(FlightControl::new(log, OperationRunner::new(SystemClock)));
        control.initialize_log().await.expect("initialize log");

        Self {
            router: build_router(AppState::new(Arc::clone(&control), None)),
            control,
            _dir: dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_flight(&self, capacity: i64) -> u64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/flight/",
                Some(json!({
                    "departure_location": "Earth",
                    "arrival_location": "Mars",
                    "max_capacity": capacity,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["flight_id"].as_u64().unwrap()
    }

    async fn create_passenger(&self, name: &str, surname: &str) -> u64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/passenger/",
                Some(json!({ "name": name, "surname": surname })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["passenger_id"].as_u64().unwrap()
    }
}

// ============================================================================
// Flights
// ============================================================================

#[tokio::test]
async fn test_create_flight_returns_sequential_ids() {
    let app = TestApp::new().await;
    assert_eq!(app.create_flight(20).await, 0);
    assert_eq!(app.create_flight(5).await, 1);
}

#[tokio::test]
async fn test_create_flight_defaults_capacity() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/flight/",
            Some(json!({ "departure_location": "Earth", "arrival_location": "Moon" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let flight_id = flight_control_core::FlightId::new(body["flight_id"].as_u64().unwrap() as usize);
    let flight = app.control.flight(flight_id).await.unwrap();
    assert_eq!(flight.max_capacity(), 50);
}

#[tokio::test]
async fn test_create_flight_validation_errors() {
    let app = TestApp::new().await;

    for body in [
        json!({ "departure_location": "Earth", "arrival_location": "Mars", "max_capacity": 0 }),
        json!({ "departure_location": "x".repeat(51), "arrival_location": "Mars" }),
        json!({ "departure_location": "", "arrival_location": "Mars" }),
        json!({ "arrival_location": "Mars" }),
    ] {
        let (status, response) = app.send(Method::POST, "/api/v1/flight/", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response["code"], "VALIDATION_ERROR");
    }

    // Rejected requests allocate no identity
    assert_eq!(app.create_flight(1).await, 0);
}

#[tokio::test]
async fn test_flight_status_and_delayed() {
    let app = TestApp::new().await;
    let flight_id = app.create_flight(10).await;

    let delayed_uri = format!("/api/v1/delayed/?flight_id={flight_id}");
    let (status, _) = app.send(Method::GET, &delayed_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/flight/status",
            Some(json!({ "flight_id": flight_id, "status": "DELAYED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::GET, &delayed_uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_flight_status_errors() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/flight/status",
            Some(json!({ "flight_id": 42, "status": "ARRIVED" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/flight/status",
            Some(json!({ "flight_id": 0, "status": "LOST_IN_SPACE" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delayed_errors() {
    let app = TestApp::new().await;

    let (status, _) = app.send(Method::GET, "/api/v1/delayed/?flight_id=3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::GET, "/api/v1/delayed/?flight_id=-1", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.send(Method::GET, "/api/v1/delayed/", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Passengers and tickets
// ============================================================================

#[tokio::test]
async fn test_create_passenger_validation() {
    let app = TestApp::new().await;
    assert_eq!(app.create_passenger("Sally", "Ride").await, 0);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/passenger/",
            Some(json!({ "name": "Sally", "surname": "R".repeat(256) })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .send(Method::POST, "/api/v1/passenger/", Some(json!({ "name": "Sally" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_ticket_scenario_earth_to_mars() {
    let app = TestApp::new().await;
    let flight = app.create_flight(1).await;
    let first = app.create_passenger("Elon", "Musk").await;
    let second = app.create_passenger("Yuri", "Gagarin").await;

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/v1/ticket/?flight_id={flight}&passenger_id={first}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/v1/ticket/?flight_id={flight}&passenger_id={second}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_ticket_not_found_and_validation() {
    let app = TestApp::new().await;
    let flight = app.create_flight(3).await;
    let passenger = app.create_passenger("Neil", "Armstrong").await;

    // Unknown passenger
    let (status, body) = app
        .send(Method::POST, &format!("/api/v1/ticket/?flight_id={flight}&passenger_id=99"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Passenger with id 99 not found");

    // Unknown flight
    let (status, body) = app
        .send(Method::POST, &format!("/api/v1/ticket/?flight_id=7&passenger_id={passenger}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Flight with id 7 not found");

    // Missing and malformed ids
    let (status, _) = app
        .send(Method::POST, &format!("/api/v1/ticket/?flight_id={flight}"), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .send(Method::POST, "/api/v1/ticket/?flight_id=abc&passenger_id=0", None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Log exports
// ============================================================================

#[tokio::test]
async fn test_log_export_submit_then_poll() {
    let app = TestApp::new().await;
    app.create_passenger("Valentina", "Tereshkova").await;

    let (status, body) = app.send(Method::GET, "/api/v1/log/", None).await;
    assert_eq!(status, StatusCode::OK);
    let submitted: OperationResponse = serde_json::from_value(body).unwrap();

    app.control
        .wait_operation(submitted.id, Duration::from_secs(5))
        .await
        .unwrap();

    let (status, body) = app
        .send(Method::GET, &format!("/api/v1/log/status/?id={}", submitted.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], submitted.id.to_string());
    assert_eq!(body["done"], true);
    assert!(
        body["result"]["path"]
            .as_str()
            .unwrap()
            .ends_with("passengers.csv")
    );
}

#[tokio::test]
async fn test_log_status_errors() {
    let app = TestApp::new().await;

    let unknown = OperationId::new();
    let (status, _) = app
        .send(Method::GET, &format!("/api/v1/log/status/?id={unknown}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::GET, "/api/v1/log/status/?id=42", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Operational endpoints
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.send(Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Healthy");

    // Metrics are disabled in this app
    let (status, _) = app.send(Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_carry_correlation_id() {
    let app = TestApp::new().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .contains_key(flight_control_web::CORRELATION_ID_HEADER)
    );
}
