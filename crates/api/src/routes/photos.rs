//! Route definitions for the `/photos` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::photos;
use crate::state::AppState;

/// Routes for the `/photos` resource (merged under `/api/v1`).
///
/// ```text
/// GET /photos/latest                      -> latest_photo
/// GET /photos/{capture_id}                -> photo_bytes
/// GET /photos/{capture_id}/detections     -> detections
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/photos/latest", get(photos::latest_photo))
        .route("/photos/{capture_id}", get(photos::photo_bytes))
        .route("/photos/{capture_id}/detections", get(photos::detections))
}
