//! Shared stubs for device and pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use facelens_core::types::Detection;
use facelens_inference::{FaceDetector, InferenceError};

use crate::error::DeviceError;
use crate::session::{DeviceSession, RawPhoto};

/// Scripted device session: counts photo requests, optionally delays or
/// fails them.
pub struct StubSession {
    user_id: String,
    photo_delay: Option<Duration>,
    fail_capture: bool,
    photo_calls: AtomicUsize,
}

impl StubSession {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            photo_delay: None,
            fail_capture: false,
            photo_calls: AtomicUsize::new(0),
        }
    }

    /// Every `request_photo` waits this long before completing.
    pub fn with_photo_delay(mut self, delay: Duration) -> Self {
        self.photo_delay = Some(delay);
        self
    }

    /// Every `request_photo` fails.
    pub fn failing_capture(mut self) -> Self {
        self.fail_capture = true;
        self
    }

    /// Number of `request_photo` calls dispatched so far.
    pub fn photo_calls(&self) -> usize {
        self.photo_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceSession for StubSession {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    async fn request_photo(&self) -> Result<RawPhoto, DeviceError> {
        self.photo_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.photo_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_capture {
            return Err(DeviceError::Capture("stub camera failure".into()));
        }

        Ok(RawPhoto {
            data: vec![0xFF, 0xD8, 0xFF, 0xE0],
            mime_type: None,
            captured_at: Utc::now(),
        })
    }

    async fn display_text(&self, _text: &str, _duration: Duration) -> Result<(), DeviceError> {
        Ok(())
    }
}

/// Detector returning a fixed number of identical face boxes.
pub struct StubDetector {
    faces: usize,
}

impl StubDetector {
    pub fn with_faces(faces: usize) -> Self {
        Self { faces }
    }
}

#[async_trait]
impl FaceDetector for StubDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<Detection>, InferenceError> {
        Ok((0..self.faces)
            .map(|i| Detection {
                x: 160.0 + i as f64 * 10.0,
                y: 120.0,
                width: 48.0,
                height: 56.0,
                confidence: 0.9,
                class: "face".to_string(),
                class_id: 0,
                detection_id: format!("stub-{i}"),
            })
            .collect())
    }
}

/// Detector that always fails, simulating a network error.
pub struct FailingDetector;

#[async_trait]
impl FaceDetector for FailingDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<Detection>, InferenceError> {
        Err(InferenceError::Api {
            status: 502,
            body: "stub upstream failure".to_string(),
        })
    }
}
