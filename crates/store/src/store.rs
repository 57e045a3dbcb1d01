//! The session store: four parallel key-partitioned in-memory tables.
//!
//! - streaming flags (continuous-capture on/off per user)
//! - capture scheduling (earliest next automatic capture per user)
//! - photo cache (single most recent capture per user)
//! - face-result cache (detection list per capture id, write-once)
//!
//! Each user's entries are only ever written by that user's own flow, so
//! per-table `RwLock`s are sufficient; writes are last-write-wins on keys
//! exclusive to the writing context.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use facelens_core::types::{Capture, CaptureId, Detection, UserId};
use serde::Serialize;
use tokio::sync::RwLock;

/// Metadata of a user's current capture, as exposed to the polling client.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoDescriptor {
    /// Id of the user's current capture.
    pub capture_id: CaptureId,
    /// When the capture was acquired (UTC).
    pub captured_at: DateTime<Utc>,
    /// Content type of the capture payload.
    pub mime_type: String,
}

/// Outcome of looking up detections for a (user, capture id) pair.
///
/// Ownership is checked before availability: an id that is not the user's
/// current capture is `NotOwned` whether it is stale or never existed.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionLookup {
    /// The id does not match the user's current capture.
    NotOwned,
    /// The id is current but the inference result has not been stored yet.
    Pending,
    /// The stored (possibly empty) detection list.
    Ready(Vec<Detection>),
}

/// Owner of all per-session state.
///
/// Shared as `Arc<SessionStore>`; absent entries read as default-off /
/// immediately-due / not-found.
#[derive(Default)]
pub struct SessionStore {
    /// user id -> continuous-capture enabled.
    streaming: RwLock<HashMap<UserId, bool>>,
    /// user id -> earliest time the next automatic capture may occur.
    next_capture_at: RwLock<HashMap<UserId, DateTime<Utc>>>,
    /// user id -> single most recent capture.
    photos: RwLock<HashMap<UserId, Capture>>,
    /// capture id -> stored detection list (write-once).
    detections: RwLock<HashMap<CaptureId, Vec<Detection>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Session flags ------------------------------------------------------

    /// Turn continuous-capture mode on or off for a user.
    pub async fn set_streaming(&self, user_id: &str, enabled: bool) {
        self.streaming
            .write()
            .await
            .insert(user_id.to_string(), enabled);
    }

    /// Whether continuous-capture mode is on. Absent reads as off.
    pub async fn is_streaming(&self, user_id: &str) -> bool {
        self.streaming
            .read()
            .await
            .get(user_id)
            .copied()
            .unwrap_or(false)
    }

    /// Set the earliest time the next automatic capture may occur.
    pub async fn schedule_next(&self, user_id: &str, at: DateTime<Utc>) {
        self.next_capture_at
            .write()
            .await
            .insert(user_id.to_string(), at);
    }

    /// Whether an automatic capture is allowed at `now`.
    /// Absent reads as immediately due.
    pub async fn due_now(&self, user_id: &str, now: DateTime<Utc>) -> bool {
        self.next_capture_at
            .read()
            .await
            .get(user_id)
            .map(|at| now >= *at)
            .unwrap_or(true)
    }

    /// Drop a user's session flags when their session ends.
    ///
    /// The photo and face-result caches are left alone; captures are only
    /// bounded by the single-slot-per-user policy and the cleanup sweep.
    pub async fn clear_session(&self, user_id: &str) {
        self.streaming.write().await.remove(user_id);
        self.next_capture_at.write().await.remove(user_id);
    }

    // -- Photo cache --------------------------------------------------------

    /// Store a capture in the owner's single slot, superseding any
    /// previous capture. Returns the id of the displaced capture, if any.
    pub async fn put_photo(&self, capture: Capture) -> Option<CaptureId> {
        let user_id = capture.user_id.clone();
        let displaced = self
            .photos
            .write()
            .await
            .insert(user_id.clone(), capture)
            .map(|old| old.id);

        if let Some(old_id) = &displaced {
            tracing::debug!(user_id = %user_id, superseded = %old_id, "Photo slot overwritten");
        }

        displaced
    }

    /// Descriptor of the user's current capture, if one exists.
    pub async fn latest_photo(&self, user_id: &str) -> Option<PhotoDescriptor> {
        self.photos.read().await.get(user_id).map(|c| PhotoDescriptor {
            capture_id: c.id.clone(),
            captured_at: c.captured_at,
            mime_type: c.mime_type.clone(),
        })
    }

    /// The user's capture, but only if `capture_id` matches the current
    /// slot. A stale or unknown id reads the same as "no capture".
    pub async fn photo_if_current(&self, user_id: &str, capture_id: &str) -> Option<Capture> {
        self.photos
            .read()
            .await
            .get(user_id)
            .filter(|c| c.id == capture_id)
            .cloned()
    }

    // -- Face-result cache --------------------------------------------------

    /// Store the detection list for a capture. Write-once: a second write
    /// for the same id is ignored.
    pub async fn put_detections(&self, capture_id: &str, detections: Vec<Detection>) {
        let mut table = self.detections.write().await;
        if table.contains_key(capture_id) {
            tracing::debug!(capture_id = %capture_id, "Detection result already stored, ignoring");
            return;
        }
        table.insert(capture_id.to_string(), detections);
    }

    /// Look up detections for a (user, capture id) pair.
    ///
    /// Ownership is checked first; only an id matching the user's current
    /// capture can observe `Pending` vs `Ready`.
    pub async fn detections_if_current(&self, user_id: &str, capture_id: &str) -> DetectionLookup {
        let owned = self
            .photos
            .read()
            .await
            .get(user_id)
            .map(|c| c.id == capture_id)
            .unwrap_or(false);

        if !owned {
            return DetectionLookup::NotOwned;
        }

        match self.detections.read().await.get(capture_id) {
            Some(list) => DetectionLookup::Ready(list.clone()),
            None => DetectionLookup::Pending,
        }
    }

    /// Drop face-result entries whose capture id is no longer any user's
    /// current capture. Returns the number of dropped entries.
    ///
    /// Reachability is recomputed from scratch on every sweep; at this
    /// scale the O(tracked x users) scan is acceptable.
    pub async fn sweep_detached(&self) -> usize {
        let live_ids: std::collections::HashSet<CaptureId> = self
            .photos
            .read()
            .await
            .values()
            .map(|c| c.id.clone())
            .collect();

        let mut table = self.detections.write().await;
        let before = table.len();
        table.retain(|id, _| live_ids.contains(id));
        let dropped = before - table.len();

        if dropped > 0 {
            tracing::debug!(dropped, "Swept detached detection results");
        }

        dropped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
