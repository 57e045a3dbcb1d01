//! Shared domain types and errors for the Facelens backend.

pub mod error;
pub mod types;

pub use error::CoreError;
