//! Core domain types: captures and face detections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque user identifier assigned by the device cloud.
pub type UserId = String;

/// Opaque capture identifier, unique per acquired photo (UUID v4 text).
pub type CaptureId = String;

/// MIME type assumed when the image header cannot be identified. The
/// glasses camera produces JPEG unless configured otherwise.
const FALLBACK_MIME: &str = "image/jpeg";

/// One acquired image and its metadata for a user.
///
/// A user owns at most one live capture at a time; storing a newer one
/// supersedes (does not archive) the previous.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Unique id for this capture.
    pub id: CaptureId,
    /// The user this capture belongs to.
    pub user_id: UserId,
    /// Raw image bytes as received from the device.
    pub data: Vec<u8>,
    /// Content type of `data`, e.g. `image/jpeg`.
    pub mime_type: String,
    /// Byte size of `data`.
    pub size: usize,
    /// When the image was acquired (UTC).
    pub captured_at: DateTime<Utc>,
}

impl Capture {
    /// Build a capture with a freshly generated id.
    ///
    /// When the device did not report a content type, the MIME type is
    /// sniffed from the image header (falling back to JPEG, which is what
    /// the glasses camera produces).
    pub fn new(
        user_id: impl Into<UserId>,
        data: Vec<u8>,
        mime_type: Option<String>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        let mime_type = mime_type.unwrap_or_else(|| Self::sniff_mime(&data));
        let size = data.len();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            data,
            mime_type,
            size,
            captured_at,
        }
    }

    /// Identify the MIME type from the image magic bytes.
    ///
    /// Only the header is inspected; the payload is never decoded.
    pub fn sniff_mime(data: &[u8]) -> String {
        image::guess_format(data)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| FALLBACK_MIME.to_string())
    }
}

/// One predicted face region with confidence and label.
///
/// `x`/`y` are the *center* of the bounding box in source-image pixel
/// space; `width`/`height` are the box dimensions in the same space.
/// Field names follow the hosted inference API's prediction records so
/// the wire payload deserializes directly into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Box center, horizontal, in source-image pixels.
    pub x: f64,
    /// Box center, vertical, in source-image pixels.
    pub y: f64,
    /// Box width in source-image pixels.
    pub width: f64,
    /// Box height in source-image pixels.
    pub height: f64,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    /// Class label, e.g. `"face"`.
    pub class: String,
    /// Numeric class identifier.
    pub class_id: i64,
    /// Opaque per-detection identifier assigned by the inference service.
    pub detection_id: String,
}
