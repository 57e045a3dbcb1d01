//! The seam between this backend and the wearable SDK.
//!
//! The SDK owns the transport, authentication, and webhook handshake for a
//! device session; we only see it through [`DeviceSession`]. Production
//! wires the real SDK connection behind this trait; tests substitute stubs.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DeviceError;

/// A photo as delivered by the device, before it becomes a cache entry.
#[derive(Debug, Clone)]
pub struct RawPhoto {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Content type reported by the device, when it reports one.
    pub mime_type: Option<String>,
    /// Device-side acquisition timestamp (UTC).
    pub captured_at: DateTime<Utc>,
}

/// Primary-button press kinds delivered by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPress {
    /// Short press: take one photo now.
    Short,
    /// Long press: toggle continuous-capture mode.
    Long,
}

impl ButtonPress {
    /// Wire name used in event payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonPress::Short => "short",
            ButtonPress::Long => "long",
        }
    }
}

/// One live device session, as exposed by the wearable SDK.
///
/// Commands are executed by the SDK on the device; their transport is not
/// our concern. Both calls can fail per-request without ending the session.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// The cloud-assigned id of the user this session belongs to.
    fn user_id(&self) -> &str;

    /// Ask the device to take one photo and deliver it.
    async fn request_photo(&self) -> Result<RawPhoto, DeviceError>;

    /// Show a line of text on the device display for `duration`.
    async fn display_text(&self, text: &str, duration: Duration) -> Result<(), DeviceError>;
}
