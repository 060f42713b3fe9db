//! HTTP surface tests
//!
//! Router-level tests via tower oneshot; no listener, no oracle traffic.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use ecodex_server::config::OracleConfig;
use ecodex_server::services::{PipelineError, SpeciesOracleClient};
use ecodex_server::{build_router, AppState};

async fn test_state() -> (TempDir, AppState) {
    let dir = TempDir::new().unwrap();
    let pool: SqlitePool = ecodex_server::db::init_database_pool(&dir.path().join("test.db"))
        .await
        .unwrap();
    let oracle = SpeciesOracleClient::new(test_oracle_config()).unwrap();
    (dir, AppState::new(pool, oracle))
}

// Points at a closed port; tests never let a request reach the oracle
fn test_oracle_config() -> OracleConfig {
    OracleConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_reports_ok() {
    let (_dir, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "ecodex-server");
}

#[tokio::test]
async fn entries_require_user_identity() {
    let (_dir, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/ecodex/entries")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_user_id_is_rejected() {
    let (_dir, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/ecodex/stats")
                .header("X-User-Id", "not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn entries_list_starts_empty() {
    let (_dir, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/ecodex/entries?page=1&limit=10")
                .header("X-User-Id", Uuid::new_v4().to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 0);
    assert_eq!(json["entries"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn stats_for_new_user_are_zeroed() {
    let (_dir, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/ecodex/stats")
                .header("X-User-Id", Uuid::new_v4().to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["totalEntries"], 0);
    assert_eq!(json["experience"], 0);
    assert_eq!(json["level"], 1);
}

#[tokio::test]
async fn unknown_entry_id_is_404() {
    let (_dir, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/ecodex/entries/{}", Uuid::new_v4()))
                .header("X-User-Id", Uuid::new_v4().to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pipeline_rejects_missing_inputs_before_any_oracle_call() {
    let (_dir, state) = test_state().await;
    let pipeline = &state.pipeline;

    let err = pipeline
        .identify(Uuid::new_v4(), &[], Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));

    let err = pipeline.chat(None, None).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));

    let err = pipeline.chat(Some("   "), None).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
}

#[tokio::test]
async fn corrupt_image_fails_decode_not_oracle() {
    let (_dir, state) = test_state().await;

    let err = state
        .pipeline
        .identify(Uuid::new_v4(), b"not an image", Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::ImageDecode(_)));
}
