pub mod health;
pub mod photos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /photos/latest                      current capture descriptor
/// /photos/{capture_id}                raw image bytes
/// /photos/{capture_id}/detections     stored detection result
/// ```
///
/// Every route under `/api/v1` requires an authenticated user.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(photos::router())
}
