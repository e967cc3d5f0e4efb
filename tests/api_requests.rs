//! Integration tests for development-mode request flows.
//!
//! This binary publishes the development runtime mode once, so every error
//! response here carries full diagnostics. Production-mode behavior is
//! covered by the `integration_test` binary, which never publishes a mode.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use backend_starter::api::create_router;
use backend_starter::app::AppState;
use backend_starter::domain::ErrorBody;
use backend_starter::infra::observability::init_metrics_handle;
use backend_starter::infra::{RuntimeEnv, set_runtime_env};
use backend_starter::test_utils::{MockDatabaseClient, MockMediaStore};

const BOUNDARY: &str = "test-boundary-9zB2kQpXvR";

fn enable_development_mode() {
    // First write wins; repeated calls from parallel tests are no-ops
    let _ = set_runtime_env(RuntimeEnv::Development);
}

fn state_with_media(media: Arc<MockMediaStore>) -> Arc<AppState> {
    let db = Arc::new(MockDatabaseClient::new());
    Arc::new(AppState::new(db, media))
}

fn multipart_request(uri: &str, folder: Option<&str>) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         fake image bytes\r\n"
    );
    if let Some(folder) = folder {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"folder\"\r\n\r\n\
             {folder}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

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
async fn test_development_error_includes_stack() {
    enable_development_mode();

    let media = Arc::new(MockMediaStore::failing("media host exploded"));
    let router = create_router(state_with_media(media));

    let response = router
        .oneshot(multipart_request("/api/v1/uploads", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorBody = serde_json::from_slice(&body_bytes).unwrap();

    let stack = body.stack.expect("development responses carry a stack");
    assert!(!stack.is_empty());
    // The real failure is visible, not a generic message
    assert!(body.message.contains("media host exploded"));
}

#[tokio::test]
async fn test_development_validation_error_is_detailed() {
    enable_development_mode();

    let media = Arc::new(MockMediaStore::new());
    let router = create_router(state_with_media(media));

    // An empty folder name fails options validation in the service
    let response = router
        .oneshot(multipart_request("/api/v1/uploads", Some("")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorBody = serde_json::from_slice(&body_bytes).unwrap();

    assert_eq!(body.status_code, 400);
    assert!(body.stack.is_some());
    assert_eq!(body.errors.len(), 1);
    assert_eq!(body.errors[0].r#type, "validation_error");
}

#[tokio::test]
async fn test_upload_flow_end_to_end() {
    enable_development_mode();

    let media = Arc::new(MockMediaStore::new());
    let router = create_router(state_with_media(media.clone()));

    let response = router
        .oneshot(multipart_request("/api/v1/uploads", Some("avatars")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    assert_eq!(json["statusCode"], 201);
    assert_eq!(json["success"], true);
    assert!(
        json["data"]["public_id"]
            .as_str()
            .unwrap()
            .starts_with("avatars/")
    );
    assert_eq!(media.uploads().len(), 1);
}

#[tokio::test]
async fn test_metrics_endpoint_renders_when_installed() {
    enable_development_mode();

    let Some(handle) = init_metrics_handle() else {
        // Another recorder already claimed the global slot; nothing to test
        return;
    };

    let db = Arc::new(MockDatabaseClient::new());
    let media = Arc::new(MockMediaStore::new());
    let state = Arc::new(AppState::new(db, media).with_metrics(handle));
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_is_valid_json() {
    enable_development_mode();

    let media = Arc::new(MockMediaStore::new());
    let router = create_router(state_with_media(media));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert!(json["paths"]["/api/v1/uploads"].is_object());
}
