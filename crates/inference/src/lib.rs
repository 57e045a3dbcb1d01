//! Client for the hosted face-detection inference endpoint.
//!
//! [`HostedDetector`] performs the one-shot HTTP call that turns a raw
//! image into a list of [`facelens_core::types::Detection`]s. The
//! [`FaceDetector`] trait is the seam the capture pipeline depends on, so
//! tests can substitute a stub.

pub mod client;

pub use client::{FaceDetector, HostedDetector, InferenceError};
