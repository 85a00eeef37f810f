//! Output actuators driven by touch policies
//!
//! Two families of outputs exist:
//!
//! 1. Discrete LEDs behind an [`ActuatorBackend`] ([`gpio::GpioLines`] on real
//!    hardware, [`NoLeds`] for boards that feed an accumulator instead)
//! 2. The bulk [`matrix::LedMatrix`], refreshed once per wait-loop iteration
//!    outside the event path

pub mod gpio;
pub mod matrix;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{trace, warn};

/// Failure reported by an output line
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct LineError(pub String);

impl LineError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Compiled-in description of one LED: its logical index and the pin driving it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedDesc {
    pub led_id: u32,
    pub pin: u32,
}

impl LedDesc {
    pub const fn new(led_id: u32, pin: u32) -> Self {
        Self { led_id, pin }
    }
}

/// One acquired output line
pub trait Actuator {
    fn set(&mut self, active: bool) -> Result<(), LineError>;
}

/// Source of output lines; dropping a line releases it
pub trait ActuatorBackend {
    type Line: Actuator;

    fn request(&mut self, led: &LedDesc) -> Result<Self::Line, LineError>;
}

/// An LED description plus its line, if one is currently held
#[derive(Debug)]
pub struct LedSlot<L> {
    desc: LedDesc,
    line: Option<L>,
}

impl<L> LedSlot<L> {
    pub fn new(desc: LedDesc, line: L) -> Self {
        Self {
            desc,
            line: Some(line),
        }
    }

    pub fn led_id(&self) -> u32 {
        self.desc.led_id
    }

    pub fn is_acquired(&self) -> bool {
        self.line.is_some()
    }

    /// Drop the line if held. Returns whether anything was released.
    pub fn release(&mut self) -> bool {
        self.line.take().is_some()
    }
}

impl<L: Actuator> LedSlot<L> {
    /// Set the line level; slots without a line are skipped
    pub fn drive(&mut self, active: bool) {
        let Some(line) = self.line.as_mut() else {
            return;
        };
        trace!("led {} (pin {}) -> {}", self.desc.led_id, self.desc.pin, active);
        if let Err(e) = line.set(active) {
            warn!(
                "Failed to drive led {} (pin {}): {}",
                self.desc.led_id, self.desc.pin, e
            );
        }
    }
}

/// Uninhabited line type for boards without discrete LEDs
#[derive(Debug)]
pub enum NoLine {}

impl Actuator for NoLine {
    fn set(&mut self, _active: bool) -> Result<(), LineError> {
        match *self {}
    }
}

/// Backend for boards whose touch state is not shown on per-LED lines
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLeds;

impl ActuatorBackend for NoLeds {
    type Line = NoLine;

    fn request(&mut self, led: &LedDesc) -> Result<NoLine, LineError> {
        Err(LineError::new(format!(
            "no output lines on this board (pin {})",
            led.pin
        )))
    }
}
