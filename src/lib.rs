//! Touch wing demos: evdev touch input mapped onto GPIO and I2C driven LEDs.

pub mod board;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod output;

#[cfg(test)]
pub(crate) mod testing;

pub use board::BoardKind;
pub use config::{ConfigError, DemoConfig};
pub use error::WingError;
