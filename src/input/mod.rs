//! Touch input decoding
//!
//! ```text
//! /dev/input/* ──► InputBackend::open ──► InputBackend::bind ──► InputSource
//!                  (O_NONBLOCK fd)        (EventDecoder)          (identity + drain)
//! ```
//!
//! [`evdev_backend`] talks to the kernel; tests substitute scripted decoders.

pub mod event;
pub mod evdev_backend;
pub mod source;

pub use event::{EventKind, InputEvent};
pub use evdev_backend::{EvdevDecoder, EvdevInput};
pub use source::{DecodeError, EventDecoder, InputBackend, InputSource};
