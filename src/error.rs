//! Error taxonomy for touch wing controllers and the dispatch loop.
//!
//! Construction errors ([`WingError::Open`], [`WingError::Device`],
//! [`WingError::Actuator`]) are reported after every resource acquired so far
//! has been released. Runtime errors ([`WingError::SyncLost`],
//! [`WingError::Device`], [`WingError::Wait`], [`WingError::Descriptor`])
//! terminate the dispatch loop; none of them is retried.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::output::matrix::MatrixError;
use crate::output::LineError;

/// Errors raised while building or running touch wing controllers
#[derive(Debug, Error)]
pub enum WingError {
    /// The input device node does not exist or cannot be opened
    #[error("Can't open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Decoder binding failed, the device is not a touch wing, or decoding failed
    #[error("Input device {}: {reason}", path.display())]
    Device { path: PathBuf, reason: String },

    /// The kernel event queue overflowed and events were dropped
    #[error("Cannot keep up with {device}: kernel dropped input events")]
    SyncLost { device: String },

    /// An output line could not be acquired
    #[error("Can't get output line {pin} for led {index}: {reason}")]
    Actuator {
        index: usize,
        pin: u32,
        reason: String,
    },

    /// The GPIO controller itself is unavailable
    #[error("GPIO controller unavailable: {0}")]
    Gpio(#[source] LineError),

    /// The multiplexed wait itself failed
    #[error("Waiting for input failed: {0}")]
    Wait(#[source] io::Error),

    /// A watched descriptor reported something other than plain readability
    #[error("Unexpected readiness on {device}: revents = {revents:#06x}")]
    Descriptor { device: String, revents: i16 },

    /// The I2C LED matrix rejected a register write
    #[error("LED matrix error: {0}")]
    Matrix(#[from] MatrixError),

    /// The demo configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
