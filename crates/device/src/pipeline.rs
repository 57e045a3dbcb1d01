//! The capture pipeline: photo acquisition through detection storage.
//!
//! [`CapturePipeline::capture_once`] is the single entry point for both
//! manual (button) and automatic (scheduler) captures. The inference call
//! is fire-and-forget: it runs in its own task keyed by the capture id and
//! writes its result independently of the photo cache's current head.

use std::sync::Arc;
use std::time::Duration;

use facelens_core::types::{Capture, CaptureId};
use facelens_events::bus::{kinds, DeviceEvent, EventBus};
use facelens_inference::FaceDetector;
use facelens_store::SessionStore;

use crate::error::DeviceError;
use crate::session::DeviceSession;

/// How long HUD feedback stays on the device display.
const FEEDBACK_DURATION: Duration = Duration::from_secs(3);

/// Orchestrates one capture from device to caches.
pub struct CapturePipeline {
    store: Arc<SessionStore>,
    detector: Arc<dyn FaceDetector>,
    bus: Arc<EventBus>,
}

impl CapturePipeline {
    /// Create a pipeline over the shared store, detector, and event bus.
    pub fn new(
        store: Arc<SessionStore>,
        detector: Arc<dyn FaceDetector>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            detector,
            bus,
        }
    }

    /// Take one photo and run it through the pipeline.
    ///
    /// On success the capture is already in the photo cache and an
    /// inference task has been spawned for it; the returned id can be
    /// polled for detections. A device failure is returned to the caller,
    /// which logs it and moves on -- no user-visible photo update happens.
    pub async fn capture_once(
        &self,
        session: &Arc<dyn DeviceSession>,
    ) -> Result<CaptureId, DeviceError> {
        let raw = session.request_photo().await?;
        let user_id = session.user_id().to_string();

        let capture = Capture::new(
            user_id.clone(),
            raw.data,
            raw.mime_type,
            raw.captured_at,
        );
        let capture_id = capture.id.clone();
        let image = capture.data.clone();

        tracing::info!(
            user_id = %user_id,
            capture_id = %capture_id,
            size = capture.size,
            mime_type = %capture.mime_type,
            "Capture stored"
        );

        self.store.put_photo(capture).await;
        // Results for superseded captures are unreachable from here on.
        self.store.sweep_detached().await;

        self.bus.publish(
            DeviceEvent::new(kinds::CAPTURE_STORED, user_id.clone()).with_capture(&capture_id),
        );

        // Fire-and-forget: the detection task outlives this call and is
        // not cancelled if the session ends; the sweep reclaims its
        // output once the capture is superseded.
        let store = Arc::clone(&self.store);
        let detector = Arc::clone(&self.detector);
        let bus = Arc::clone(&self.bus);
        let session = Arc::clone(session);
        let task_capture_id = capture_id.clone();
        tokio::spawn(async move {
            run_detection(store, detector, bus, session, user_id, task_capture_id, image).await;
        });

        Ok(capture_id)
    }
}

/// Run the inference call for one capture and store its result.
///
/// A failed call is logged and substituted with an empty list so every
/// known capture reaches a terminal "computed" state.
async fn run_detection(
    store: Arc<SessionStore>,
    detector: Arc<dyn FaceDetector>,
    bus: Arc<EventBus>,
    session: Arc<dyn DeviceSession>,
    user_id: String,
    capture_id: CaptureId,
    image: Vec<u8>,
) {
    let detections = match detector.detect(&image).await {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(
                user_id = %user_id,
                capture_id = %capture_id,
                error = %e,
                "Inference call failed; substituting empty result"
            );
            Vec::new()
        }
    };

    let count = detections.len();
    store.put_detections(&capture_id, detections).await;

    bus.publish(
        DeviceEvent::new(kinds::DETECTIONS_READY, user_id.clone())
            .with_capture(&capture_id)
            .with_payload(serde_json::json!({ "count": count })),
    );

    tracing::info!(
        user_id = %user_id,
        capture_id = %capture_id,
        count,
        "Detection result stored"
    );

    // Best-effort HUD feedback; the session may already be gone.
    let text = match count {
        0 => "No faces found".to_string(),
        1 => "1 face found".to_string(),
        n => format!("{n} faces found"),
    };
    if let Err(e) = session.display_text(&text, FEEDBACK_DURATION).await {
        tracing::debug!(user_id = %user_id, error = %e, "Could not show detection feedback");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
