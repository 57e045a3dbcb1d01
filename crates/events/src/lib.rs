//! In-process event infrastructure for the Facelens backend.
//!
//! Device sessions and the capture pipeline publish [`DeviceEvent`]s on a
//! shared [`EventBus`]; interested components (and tests) subscribe.

pub mod bus;

pub use bus::{DeviceEvent, EventBus};
