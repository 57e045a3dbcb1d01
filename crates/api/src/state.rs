use std::sync::Arc;

use facelens_events::EventBus;
use facelens_store::SessionStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// All in-memory session state (flags, schedule, photo and
    /// face-result caches).
    pub store: Arc<SessionStore>,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for device/pipeline events.
    pub event_bus: Arc<EventBus>,
}
