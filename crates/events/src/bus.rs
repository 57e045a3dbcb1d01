//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DeviceEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use facelens_core::types::{CaptureId, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// Well-known event names, dot-separated by convention.
pub mod kinds {
    /// A device session came online.
    pub const SESSION_STARTED: &str = "session.started";
    /// A device session went away.
    pub const SESSION_ENDED: &str = "session.ended";
    /// The primary button was pressed (payload carries the press kind).
    pub const BUTTON_PRESSED: &str = "button.pressed";
    /// A capture was written to the photo cache.
    pub const CAPTURE_STORED: &str = "capture.stored";
    /// A detection result was written to the face-result cache.
    pub const DETECTIONS_READY: &str = "detections.ready";
}

// ---------------------------------------------------------------------------
// DeviceEvent
// ---------------------------------------------------------------------------

/// An event in the device/capture lifecycle.
///
/// Constructed via [`DeviceEvent::new`] and enriched with the builder
/// methods [`with_capture`](DeviceEvent::with_capture) and
/// [`with_payload`](DeviceEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEvent {
    /// Dot-separated event name, e.g. `"capture.stored"`.
    pub event_type: String,

    /// The user whose session the event belongs to.
    pub user_id: UserId,

    /// Capture the event refers to, when applicable.
    pub capture_id: Option<CaptureId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DeviceEvent {
    /// Create a new event for a user with only the required `event_type`.
    pub fn new(event_type: impl Into<String>, user_id: impl Into<UserId>) -> Self {
        Self {
            event_type: event_type.into(),
            user_id: user_id.into(),
            capture_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the capture this event refers to.
    pub fn with_capture(mut self, capture_id: impl Into<CaptureId>) -> Self {
        self.capture_id = Some(capture_id.into());
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DeviceEvent`].
pub struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: DeviceEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = DeviceEvent::new(kinds::CAPTURE_STORED, "user-1")
            .with_capture("cap-42")
            .with_payload(serde_json::json!({"size": 1024}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, kinds::CAPTURE_STORED);
        assert_eq!(received.user_id, "user-1");
        assert_eq!(received.capture_id.as_deref(), Some("cap-42"));
        assert_eq!(received.payload["size"], 1024);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DeviceEvent::new(kinds::SESSION_STARTED, "user-1"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, kinds::SESSION_STARTED);
        assert_eq!(e2.event_type, kinds::SESSION_STARTED);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers -- this must not panic.
        bus.publish(DeviceEvent::new(kinds::SESSION_ENDED, "user-1"));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = DeviceEvent::new(kinds::BUTTON_PRESSED, "user-1");
        assert_eq!(event.event_type, kinds::BUTTON_PRESSED);
        assert!(event.capture_id.is_none());
        assert!(event.payload.is_object());
    }
}
