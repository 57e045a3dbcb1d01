//! Shared test harness: builds the real router with an in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use facelens_api::auth::jwt::{generate_access_token, JwtConfig};
use facelens_api::config::{InferenceSettings, ServerConfig};
use facelens_api::router::build_app_router;
use facelens_api::state::AppState;
use facelens_events::EventBus;
use facelens_store::SessionStore;

/// Build a test `ServerConfig` with safe defaults and a known JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
        inference: InferenceSettings {
            api_url: "http://127.0.0.1:1".to_string(),
            model_id: "face-test/1".to_string(),
            api_key: "test-key".to_string(),
        },
        auto_capture_tick_secs: 1,
        auto_capture_fallback_secs: 30,
        webview_dir: "static".to_string(),
    }
}

/// Build the full application router with all middleware layers over the
/// given store.
///
/// This goes through [`build_app_router`], so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(store: Arc<SessionStore>) -> Router {
    let config = test_config();
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
    };
    build_app_router(state, &config)
}

/// Mint a valid bearer token for `user_id` with the test secret.
pub fn auth_token(user_id: &str) -> String {
    generate_access_token(user_id, &test_config().jwt).expect("token generation should succeed")
}

/// Issue an unauthenticated GET request.
pub async fn get(app: &Router, path: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should not fail at the transport level")
}

/// Issue a GET request with a bearer token.
pub async fn get_auth(app: &Router, path: &str, token: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(path)
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should not fail at the transport level")
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Collect a response body into raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}
