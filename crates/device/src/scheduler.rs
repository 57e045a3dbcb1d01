//! Per-session automatic capture loop.
//!
//! While continuous-capture mode is on, a fixed tick checks whether the
//! user is due for a capture and dispatches at most one. Throttling uses a
//! lease-extension policy: the next-allowed time is pushed forward by a
//! fallback window *before* dispatching and pulled back to "now" only when
//! the capture completes, so a stuck or slow device call is bounded at one
//! dispatch per window instead of a tight retry storm.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use facelens_store::SessionStore;
use tokio_util::sync::CancellationToken;

use crate::pipeline::CapturePipeline;
use crate::session::DeviceSession;

/// Timing knobs for the automatic capture loop.
#[derive(Debug, Clone)]
pub struct AutoCaptureConfig {
    /// Interval between due-checks.
    pub tick: Duration,
    /// Pessimistic lease window applied when a capture is dispatched.
    pub fallback_window: chrono::Duration,
}

impl Default for AutoCaptureConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            fallback_window: chrono::Duration::seconds(30),
        }
    }
}

impl AutoCaptureConfig {
    /// Build a config from plain second counts (as read from the
    /// environment).
    pub fn from_secs(tick_secs: u64, fallback_secs: i64) -> Self {
        Self {
            tick: Duration::from_secs(tick_secs),
            fallback_window: chrono::Duration::seconds(fallback_secs),
        }
    }
}

/// The per-session scheduler driving automatic captures.
pub struct AutoCaptureLoop {
    store: Arc<SessionStore>,
    pipeline: Arc<CapturePipeline>,
    session: Arc<dyn DeviceSession>,
    config: AutoCaptureConfig,
}

impl AutoCaptureLoop {
    /// Create a loop for one session.
    pub fn new(
        store: Arc<SessionStore>,
        pipeline: Arc<CapturePipeline>,
        session: Arc<dyn DeviceSession>,
        config: AutoCaptureConfig,
    ) -> Self {
        Self {
            store,
            pipeline,
            session,
            config,
        }
    }

    /// Run until the token is cancelled.
    ///
    /// The manual capture path may race this loop for the same user; the
    /// lease window bounds, but does not eliminate, double dispatch under
    /// adversarial timing.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.tick);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(user_id = %self.session.user_id(), "Auto-capture loop cancelled");
                    break;
                }
                _ = interval.tick() => {
                    self.tick_once().await;
                }
            }
        }
    }

    /// One due-check: dispatch at most one capture.
    async fn tick_once(&self) {
        let user_id = self.session.user_id();

        if !self.store.is_streaming(user_id).await {
            return;
        }

        let now = Utc::now();
        if !self.store.due_now(user_id, now).await {
            return;
        }

        // Assume failure: extend the lease before dispatching.
        self.store
            .schedule_next(user_id, now + self.config.fallback_window)
            .await;

        match self.pipeline.capture_once(&self.session).await {
            Ok(capture_id) => {
                // Success: the next due tick may fire immediately.
                self.store.schedule_next(user_id, Utc::now()).await;
                tracing::debug!(
                    user_id = %user_id,
                    capture_id = %capture_id,
                    "Automatic capture stored"
                );
            }
            Err(e) => {
                // The lease stays extended; the loop retries once the
                // fallback window elapses.
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Automatic capture failed; retrying after the fallback window"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubDetector, StubSession};
    use facelens_events::EventBus;
    use facelens_inference::FaceDetector;

    fn fixture(
        session: StubSession,
        config: AutoCaptureConfig,
    ) -> (Arc<SessionStore>, Arc<StubSession>, AutoCaptureLoop) {
        let store = Arc::new(SessionStore::new());
        let bus = Arc::new(EventBus::default());
        let detector: Arc<dyn FaceDetector> = Arc::new(StubDetector::with_faces(0));
        let pipeline = Arc::new(CapturePipeline::new(
            Arc::clone(&store),
            detector,
            bus,
        ));

        let session = Arc::new(session);
        let session_dyn: Arc<dyn DeviceSession> = session.clone();
        let auto_loop = AutoCaptureLoop::new(Arc::clone(&store), pipeline, session_dyn, config);
        (store, session, auto_loop)
    }

    #[tokio::test(start_paused = true)]
    async fn no_dispatch_while_streaming_is_off() {
        let (_store, session, auto_loop) =
            fixture(StubSession::new("user-1"), AutoCaptureConfig::default());

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(auto_loop.run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(session.photo_calls(), 0);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_capture_is_bounded_to_one_dispatch_per_window() {
        // A capture that takes far longer than the fallback window.
        let session = StubSession::new("user-1").with_photo_delay(Duration::from_secs(120));
        let (store, session, auto_loop) = fixture(session, AutoCaptureConfig::default());

        store.set_streaming("user-1", true).await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(auto_loop.run(cancel.clone()));

        // Well within the first 30s window: exactly one dispatch, even
        // though the device call has not returned.
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(session.photo_calls(), 1);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn successful_capture_resets_the_lease() {
        // Slower than the tick but much faster than the fallback window;
        // the success reset is what allows back-to-back captures.
        let session = StubSession::new("user-1").with_photo_delay(Duration::from_secs(5));
        let (store, session, auto_loop) = fixture(session, AutoCaptureConfig::default());

        store.set_streaming("user-1", true).await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(auto_loop.run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(13)).await;
        assert!(
            session.photo_calls() >= 2,
            "expected the lease reset to allow a second dispatch, got {}",
            session.photo_calls()
        );

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_capture_keeps_streaming_and_retries_after_window() {
        let session = StubSession::new("user-1").failing_capture();
        let (store, session, auto_loop) = fixture(session, AutoCaptureConfig::default());

        store.set_streaming("user-1", true).await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(auto_loop.run(cancel.clone()));

        // First dispatch fails immediately; the extended lease holds until
        // the window elapses.
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(session.photo_calls(), 1);

        // Past the window: one retry, not a burst.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(session.photo_calls(), 2);

        // Failure never clears the continuous-capture flag.
        assert!(store.is_streaming("user-1").await);

        cancel.cancel();
        handle.await.unwrap();
    }
}
