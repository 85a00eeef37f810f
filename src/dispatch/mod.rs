//! Multiplexed wait and dispatch
//!
//! ```text
//! DispatchLoop<Assembling> ──register()──► DispatchLoop<Assembling>
//!          │
//!        arm()
//!          ▼
//! DispatchLoop<Running> ──wait_and_dispatch()──► Multiplexer::wait ──► Drain::drain (ready slots)
//! ```
//!
//! The loop never recovers from an error: wait failures, unexpected
//! readiness bits, sync loss and decode errors all end it.

pub mod event_loop;
pub mod multiplexer;

pub use event_loop::{Assembling, DispatchLoop, Drain, LoopState, Running};
pub use multiplexer::{Multiplexer, Poll, Readiness};
