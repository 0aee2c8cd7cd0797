//! Shared helpers for HTTP-level integration tests.
//!
//! Tests drive the real router (same middleware stack as production) via
//! `tower::ServiceExt::oneshot`, with a fresh in-memory store per app.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use praxis_api::config::ServerConfig;
use praxis_api::router::build_app_router;
use praxis_api::state::AppState;
use praxis_api::store::MilestoneStore;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        auto_close_sweep_secs: 3600,
    }
}

/// Build the application router with a fresh store.
pub fn build_test_app() -> Router {
    build_test_app_with_store().0
}

/// Build the application router and keep a handle on its store, for tests
/// that drive store-level operations (e.g. the auto-close sweep) directly.
pub fn build_test_app_with_store() -> (Router, Arc<MilestoneStore>) {
    let config = test_config();
    let store = Arc::new(MilestoneStore::new());
    let state = AppState {
        store: Arc::clone(&store),
        config: Arc::new(config.clone()),
    };
    (build_app_router(state, &config), store)
}

pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
    )
    .await
    .expect("response")
}

pub async fn put_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("PUT")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
    )
    .await
    .expect("response")
}

pub async fn delete(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("valid JSON body")
}

/// Today's local date as the wire `YYYY-MM-DD` string.
pub fn today_string() -> String {
    chrono::Local::now().date_naive().to_string()
}

/// A minimal valid milestone draft due today.
pub fn milestone_draft() -> serde_json::Value {
    serde_json::json!({
        "projectId": Uuid::new_v4(),
        "name": "Sprint demo",
        "description": "Demo the sprint result to stakeholders",
        "dueDate": today_string(),
        "type": "deliverable"
    })
}

/// A valid milestone draft requiring sign-off from the given personas.
pub fn milestone_draft_with_personas(persona_ids: &[Uuid]) -> serde_json::Value {
    let mut draft = milestone_draft();
    draft["personaIds"] = serde_json::json!(persona_ids);
    draft
}

/// POST a draft and return the created milestone's JSON view.
pub async fn create_milestone(app: &Router, draft: serde_json::Value) -> serde_json::Value {
    let response = post_json(app.clone(), "/api/v1/milestones", draft).await;
    assert_eq!(
        response.status(),
        axum::http::StatusCode::CREATED,
        "milestone creation should succeed"
    );
    body_json(response).await["data"].clone()
}
