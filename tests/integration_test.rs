//! Integration tests for the API.
//!
//! The runtime mode is never published here, so error responses take the
//! production-safe path: generic messages and no diagnostic trace.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use backend_starter::api::{RateLimitConfig, create_router, create_router_with_rate_limit};
use backend_starter::app::AppState;
use backend_starter::domain::{ApiResponse, ErrorBody, HealthData, HealthStatus, MediaAsset};
use backend_starter::test_utils::{MockDatabaseClient, MockMediaStore};

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn create_test_state() -> Arc<AppState> {
    let db = Arc::new(MockDatabaseClient::new());
    let media = Arc::new(MockMediaStore::new());
    Arc::new(AppState::new(db, media))
}

fn multipart_upload_request(uri: &str, include_file: bool) -> Request<Body> {
    let mut body = String::new();
    if include_file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             fake image bytes\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"folder\"\r\n\r\n\
         avatars\r\n\
         --{BOUNDARY}--\r\n"
    ));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_check_returns_envelope() {
    let router = create_router(create_test_state());

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let envelope: ApiResponse<HealthData> = serde_json::from_slice(&body_bytes).unwrap();

    assert_eq!(envelope.status_code, 200);
    assert!(envelope.success);
    assert_eq!(envelope.data.status, HealthStatus::Healthy);
    assert_eq!(envelope.data.database, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_health_check_envelope_wire_shape() {
    let router = create_router(create_test_state());

    let request = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    // Wire fields are camelCase
    assert_eq!(json["statusCode"], 200);
    assert_eq!(json["success"], true);
    assert!(json["data"]["uptimeSecs"].is_number());
    assert!(json["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_readiness_degrades_with_database() {
    let db = Arc::new(MockDatabaseClient::failing("connection refused"));
    let media = Arc::new(MockMediaStore::new());
    let state = Arc::new(AppState::new(db, media));
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_liveness_ignores_dependencies() {
    let db = Arc::new(MockDatabaseClient::failing("connection refused"));
    let media = Arc::new(MockMediaStore::failing("down"));
    let state = Arc::new(AppState::new(db, media));
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_success_returns_created_envelope() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let db = Arc::new(MockDatabaseClient::new());
    let media = Arc::new(MockMediaStore::new());
    let state = Arc::new(
        AppState::new(db, media.clone()).with_tmp_dir(tmp_dir.path().to_path_buf()),
    );
    let router = create_router(state);

    let response = router
        .oneshot(multipart_upload_request("/api/v1/uploads", true))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let envelope: ApiResponse<MediaAsset> = serde_json::from_slice(&body_bytes).unwrap();

    assert_eq!(envelope.status_code, 201);
    assert!(envelope.success);
    assert!(envelope.data.public_id.starts_with("avatars/"));
    assert_eq!(media.uploads().len(), 1);
}

#[tokio::test]
async fn test_upload_cleans_spool_dir_on_success() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let db = Arc::new(MockDatabaseClient::new());
    let media = Arc::new(MockMediaStore::new());
    let state =
        Arc::new(AppState::new(db, media).with_tmp_dir(tmp_dir.path().to_path_buf()));
    let router = create_router(state);

    let response = router
        .oneshot(multipart_upload_request("/api/v1/uploads", true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let leftovers: Vec<_> = std::fs::read_dir(tmp_dir.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "spool dir should be empty after upload");
}

#[tokio::test]
async fn test_upload_cleans_spool_dir_on_failure() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let db = Arc::new(MockDatabaseClient::new());
    let media = Arc::new(MockMediaStore::failing("media host down"));
    let state =
        Arc::new(AppState::new(db, media).with_tmp_dir(tmp_dir.path().to_path_buf()));
    let router = create_router(state);

    let response = router
        .oneshot(multipart_upload_request("/api/v1/uploads", true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let leftovers: Vec<_> = std::fs::read_dir(tmp_dir.path()).unwrap().collect();
    assert!(
        leftovers.is_empty(),
        "spool dir should be empty after failed upload"
    );
}

#[tokio::test]
async fn test_truncated_body_leaves_no_spool_files() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let db = Arc::new(MockDatabaseClient::new());
    let media = Arc::new(MockMediaStore::new());
    let state =
        Arc::new(AppState::new(db, media.clone()).with_tmp_dir(tmp_dir.path().to_path_buf()));
    let router = create_router(state);

    // A complete file part followed by a folder part that is cut off
    // before the closing boundary
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         fake image bytes\r\n\
         --{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"folder\"\r\n\r\n\
         avat"
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/uploads")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let leftovers: Vec<_> = std::fs::read_dir(tmp_dir.path()).unwrap().collect();
    assert!(
        leftovers.is_empty(),
        "spool dir should be empty after a truncated body"
    );
    assert!(media.uploads().is_empty());
}

#[tokio::test]
async fn test_upload_failure_is_redacted_outside_development() {
    let db = Arc::new(MockDatabaseClient::new());
    let media = Arc::new(MockMediaStore::failing("secret internal detail"));
    let state = Arc::new(AppState::new(db, media));
    let router = create_router(state);

    let response = router
        .oneshot(multipart_upload_request("/api/v1/uploads", true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorBody = serde_json::from_slice(&body_bytes).unwrap();

    assert_eq!(body.status_code, 502);
    assert!(!body.success);
    assert!(body.data.is_none());
    assert!(body.stack.is_none(), "no diagnostic trace outside development");
    assert_eq!(body.message, "Something went wrong");
    // The internal detail never leaks anywhere in the payload
    let raw = String::from_utf8(body_bytes.to_vec()).unwrap();
    assert!(!raw.contains("secret internal detail"));
}

#[tokio::test]
async fn test_upload_without_file_part_is_operational_400() {
    let router = create_router(create_test_state());

    let response = router
        .oneshot(multipart_upload_request("/api/v1/uploads", false))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorBody = serde_json::from_slice(&body_bytes).unwrap();

    // Operational errors keep their message even outside development
    assert_eq!(body.status_code, 400);
    assert_eq!(body.message, "A `file` part is required");
    assert!(body.stack.is_none());
}

#[tokio::test]
async fn test_fallback_returns_envelope_404() {
    let router = create_router(create_test_state());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorBody = serde_json::from_slice(&body_bytes).unwrap();

    assert_eq!(body.status_code, 404);
    assert_eq!(body.message, "Resource not found");
    assert!(!body.success);
}

#[tokio::test]
async fn test_rate_limited_request_gets_envelope_429() {
    let config = RateLimitConfig {
        general_rps: 1,
        general_burst: 1,
        ..Default::default()
    };
    let router = create_router_with_rate_limit(create_test_state(), config);

    let request = || {
        Request::builder()
            .method("POST")
            .uri("/api/v1/uploads")
            .header("x-forwarded-for", "203.0.113.9")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::empty())
            .unwrap()
    };

    // Exhaust the bucket
    let _ = router.clone().oneshot(request()).await.unwrap();
    let response = router.oneshot(request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorBody = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body.status_code, 429);
    assert!(!body.success);
}
