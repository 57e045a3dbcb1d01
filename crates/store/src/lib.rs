//! In-memory session state for the Facelens backend.
//!
//! All state lives in one [`SessionStore`] passed by handle to request
//! handlers and background loops. Nothing is persisted; a process restart
//! starts from empty.

pub mod store;

pub use store::{DetectionLookup, PhotoDescriptor, SessionStore};
