//! Touch widget controllers
//!
//! A [`Controller`] joins one input source with a fixed LED set and a
//! [`PositionPolicy`] that interprets events:
//!
//! ```text
//! InputSource ──► Controller::drain ──► PositionPolicy::on_event ──► LedSlot / Position
//! ```

pub mod controller;
pub mod policy;

pub use controller::{Controller, ControllerSpec};
pub use policy::{Accumulator, BarGraph, Bitmask, KeyMirror, Position, PositionPolicy};
