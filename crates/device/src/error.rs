/// Errors surfaced by the device-session seam.
///
/// All of these are per-request: a failed capture or display call never
/// tears down the session or its loops.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The SDK failed to take or deliver a photo.
    #[error("Capture request failed: {0}")]
    Capture(String),

    /// The SDK failed to show text on the device display.
    #[error("Display request failed: {0}")]
    Display(String),

    /// The session connection is gone.
    #[error("Session is no longer connected")]
    Disconnected,
}
