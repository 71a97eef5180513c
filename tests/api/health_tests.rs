//! Health Check API Tests

use axum::http::StatusCode;

use crate::common::{body_json, body_text, TestApp};

/// Test basic health check endpoint returns 200 OK
#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("version").is_some());
}

/// Liveness must not depend on the database
#[tokio::test]
async fn test_liveness_endpoint() {
    let app = TestApp::new().await;

    let response = app.get("/health/live").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "alive");
}

/// With no reachable database, readiness reports 503 but still describes
/// the real-time core
#[tokio::test]
async fn test_readiness_reports_realtime_state() {
    let app = TestApp::new().await;

    let response = app.get("/health/ready").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["checks"]["database"]["status"], "unhealthy");
    assert!(json["checks"].get("redis").is_none());
    assert_eq!(json["checks"]["realtime"]["fanout"], "local");
    assert_eq!(json["checks"]["realtime"]["active_sessions"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_realtime_metrics() {
    let app = TestApp::new().await;

    let response = app.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("chat_realtime_websocket_sessions_active"));
}

/// A plain GET without upgrade headers never reaches authentication
#[tokio::test]
async fn test_ws_requires_upgrade() {
    let app = TestApp::new().await;

    let response = app.get("/ws?token=abc").await;

    assert!(response.status().is_client_error());
}
