//! Device-facing half of the Facelens backend.
//!
//! The wearable SDK delivers session lifecycle and button events and
//! executes photo/display commands; this crate consumes those through the
//! [`session::DeviceSession`] seam and drives the capture pipeline:
//!
//! - [`pipeline::CapturePipeline`] -- photo acquisition, cache write,
//!   fire-and-forget inference, HUD feedback.
//! - [`scheduler::AutoCaptureLoop`] -- the per-session timer that takes
//!   captures while continuous-capture mode is on, throttled by a
//!   lease-extension window.
//! - [`supervisor::SessionSupervisor`] -- session registry reacting to
//!   SDK events.

pub mod error;
pub mod pipeline;
pub mod scheduler;
pub mod session;
pub mod supervisor;

#[cfg(test)]
mod testing;

pub use error::DeviceError;
pub use pipeline::CapturePipeline;
pub use scheduler::{AutoCaptureConfig, AutoCaptureLoop};
pub use session::{ButtonPress, DeviceSession, RawPhoto};
pub use supervisor::SessionSupervisor;
