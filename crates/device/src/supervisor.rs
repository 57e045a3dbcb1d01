//! Session registry: reacts to SDK lifecycle and button events.
//!
//! One [`AutoCaptureLoop`] runs per live session; the supervisor owns the
//! cancellation tokens and tears state down when a session ends.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use facelens_events::bus::{kinds, DeviceEvent, EventBus};
use facelens_store::SessionStore;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::pipeline::CapturePipeline;
use crate::scheduler::{AutoCaptureConfig, AutoCaptureLoop};
use crate::session::{ButtonPress, DeviceSession};

/// How long mode-toggle feedback stays on the device display.
const TOGGLE_FEEDBACK_DURATION: Duration = Duration::from_secs(2);

/// Handle to one session's background work.
struct SessionTask {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

/// Owns per-session background loops and translates SDK events into
/// pipeline and store operations.
pub struct SessionSupervisor {
    store: Arc<SessionStore>,
    pipeline: Arc<CapturePipeline>,
    bus: Arc<EventBus>,
    config: AutoCaptureConfig,
    tasks: Mutex<HashMap<String, SessionTask>>,
}

impl SessionSupervisor {
    /// Create a supervisor over the shared store, pipeline, and bus.
    pub fn new(
        store: Arc<SessionStore>,
        pipeline: Arc<CapturePipeline>,
        bus: Arc<EventBus>,
        config: AutoCaptureConfig,
    ) -> Self {
        Self {
            store,
            pipeline,
            bus,
            config,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// A device session came online: start its auto-capture loop.
    ///
    /// A reconnect for the same user replaces (and cancels) the previous
    /// loop.
    pub async fn on_session_started(&self, session: Arc<dyn DeviceSession>) {
        let user_id = session.user_id().to_string();

        let auto_loop = AutoCaptureLoop::new(
            Arc::clone(&self.store),
            Arc::clone(&self.pipeline),
            Arc::clone(&session),
            self.config.clone(),
        );

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(auto_loop.run(cancel.clone()));

        let previous = self
            .tasks
            .lock()
            .await
            .insert(user_id.clone(), SessionTask { cancel, handle });
        if let Some(previous) = previous {
            previous.cancel.cancel();
            tracing::debug!(user_id = %user_id, "Replaced auto-capture loop for reconnected session");
        }

        self.bus
            .publish(DeviceEvent::new(kinds::SESSION_STARTED, user_id.clone()));
        tracing::info!(user_id = %user_id, "Session started");
    }

    /// A device session went away: stop its loop and drop its flags.
    ///
    /// In-flight inference tasks are left running; their results land in
    /// the face-result cache and are reclaimed by a later sweep.
    pub async fn on_session_ended(&self, user_id: &str) {
        if let Some(task) = self.tasks.lock().await.remove(user_id) {
            task.cancel.cancel();
            // Detach rather than await: the loop may be mid-capture.
            drop(task.handle);
        }

        self.store.clear_session(user_id).await;

        self.bus
            .publish(DeviceEvent::new(kinds::SESSION_ENDED, user_id));
        tracing::info!(user_id = %user_id, "Session ended");
    }

    /// Primary-button press from the SDK.
    ///
    /// Short press: one immediate capture. Long press: toggle
    /// continuous-capture mode, marking the user immediately due when the
    /// mode turns on.
    pub async fn on_button_pressed(&self, session: &Arc<dyn DeviceSession>, press: ButtonPress) {
        let user_id = session.user_id().to_string();

        self.bus.publish(
            DeviceEvent::new(kinds::BUTTON_PRESSED, user_id.clone())
                .with_payload(serde_json::json!({ "press": press.as_str() })),
        );

        match press {
            ButtonPress::Short => {
                if let Err(e) = self.pipeline.capture_once(session).await {
                    tracing::warn!(user_id = %user_id, error = %e, "Manual capture failed");
                }
            }
            ButtonPress::Long => {
                let enabled = !self.store.is_streaming(&user_id).await;
                self.store.set_streaming(&user_id, enabled).await;
                if enabled {
                    self.store.schedule_next(&user_id, chrono::Utc::now()).await;
                }

                tracing::info!(user_id = %user_id, enabled, "Continuous-capture mode toggled");

                let text = if enabled {
                    "Continuous capture: on"
                } else {
                    "Continuous capture: off"
                };
                if let Err(e) = session.display_text(text, TOGGLE_FEEDBACK_DURATION).await {
                    tracing::debug!(user_id = %user_id, error = %e, "Could not show toggle feedback");
                }
            }
        }
    }

    /// Cancel every session loop (process shutdown).
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        for (user_id, task) in tasks.drain() {
            task.cancel.cancel();
            tracing::debug!(user_id = %user_id, "Cancelled auto-capture loop");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
