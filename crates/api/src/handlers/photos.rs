//! Handlers for the `/photos` resource -- the query surface the polling
//! webview reads.
//!
//! All endpoints require authentication via [`AuthUser`]; a missing
//! identity is rejected (401) before any cache lookup. A capture id that
//! is not the caller's *current* capture reads as not-found whether it is
//! stale or never existed.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use facelens_core::error::CoreError;
use facelens_core::types::CaptureId;
use facelens_store::{DetectionLookup, PhotoDescriptor};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/photos/latest
///
/// Descriptor of the caller's current capture, or 404 if no capture has
/// been taken yet this session.
pub async fn latest_photo(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PhotoDescriptor>>> {
    let descriptor = state
        .store
        .latest_photo(&auth.user_id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Capture",
            id: auth.user_id.clone(),
        }))?;

    Ok(Json(DataResponse { data: descriptor }))
}

/// GET /api/v1/photos/{capture_id}
///
/// Raw image bytes with the stored content type, but only while
/// `capture_id` is the caller's current capture.
pub async fn photo_bytes(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(capture_id): Path<CaptureId>,
) -> AppResult<impl IntoResponse> {
    let capture = state
        .store
        .photo_if_current(&auth.user_id, &capture_id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Capture",
            id: capture_id,
        }))?;

    Ok(([(header::CONTENT_TYPE, capture.mime_type)], capture.data))
}

/// GET /api/v1/photos/{capture_id}/detections
///
/// The stored detection result for the caller's current capture.
/// Ownership is checked first (404 `NOT_FOUND`); once ownership passes, a
/// result that has not been computed yet answers 404 `DETECTIONS_PENDING`
/// so the client keeps retrying. A computed result is returned with its
/// count, which may be zero.
pub async fn detections(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(capture_id): Path<CaptureId>,
) -> AppResult<Json<serde_json::Value>> {
    match state
        .store
        .detections_if_current(&auth.user_id, &capture_id)
        .await
    {
        DetectionLookup::NotOwned => Err(AppError::Core(CoreError::NotFound {
            entity: "Capture",
            id: capture_id,
        })),
        DetectionLookup::Pending => Err(AppError::DetectionsPending),
        DetectionLookup::Ready(detections) => {
            let count = detections.len();
            Ok(Json(serde_json::json!({
                "data": {
                    "detections": detections,
                    "count": count,
                }
            })))
        }
    }
}
