//! LED lines on a GPIO character device (`/dev/gpiochipN`).
//!
//! The chip is opened once and every LED is requested as its own output
//! line, starting inactive. Active-low wiring is set in the line settings,
//! so callers only ever deal in active/inactive.

use std::fmt;
use std::path::{Path, PathBuf};

use gpiocdev::chip::Chip;
use gpiocdev::line::Value;
use gpiocdev::Request;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::output::{Actuator, ActuatorBackend, LedDesc, LineError};

pub const DEFAULT_CHIP: &str = "/dev/gpiochip0";
const CONSUMER: &str = "ptc-wings";

/// Electrical level that lights an LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    pub fn from_active_low(active_low: bool) -> Self {
        if active_low {
            Polarity::ActiveLow
        } else {
            Polarity::ActiveHigh
        }
    }
}

fn line_value(active: bool) -> Value {
    if active {
        Value::Active
    } else {
        Value::Inactive
    }
}

/// The GPIO chip handle, opened once and passed to every controller
#[derive(Debug)]
pub struct GpioLines {
    chip: PathBuf,
    num_lines: u32,
    polarity: Polarity,
}

impl GpioLines {
    pub fn open(chip: &Path, polarity: Polarity) -> Result<Self, LineError> {
        let info = Chip::from_path(chip)
            .and_then(|chip| chip.info())
            .map_err(|e| LineError::new(format!("{}: {}", chip.display(), e)))?;
        info!(
            "GPIO chip {} ({}, {} lines, {:?})",
            info.name, info.label, info.num_lines, polarity
        );
        Ok(Self {
            chip: chip.to_path_buf(),
            num_lines: info.num_lines,
            polarity,
        })
    }

    /// Reject offsets the chip does not have before asking the kernel
    fn check_offset(&self, offset: u32) -> Result<(), LineError> {
        if offset >= self.num_lines {
            return Err(LineError::new(format!(
                "line {} out of range, {} has {} lines",
                offset,
                self.chip.display(),
                self.num_lines
            )));
        }
        Ok(())
    }
}

impl ActuatorBackend for GpioLines {
    type Line = GpioLed;

    fn request(&mut self, led: &LedDesc) -> Result<GpioLed, LineError> {
        self.check_offset(led.pin)?;

        let mut builder = Request::builder();
        builder
            .on_chip(self.chip.clone())
            .with_consumer(CONSUMER)
            .with_line(led.pin)
            .as_output(line_value(false));
        if self.polarity == Polarity::ActiveLow {
            builder.as_active_low();
        }
        let request = builder
            .request()
            .map_err(|e| LineError::new(e.to_string()))?;
        debug!("Requested line {} for led {}", led.pin, led.led_id);

        Ok(GpioLed {
            request,
            offset: led.pin,
        })
    }
}

/// One LED line; dropping it releases the line request
pub struct GpioLed {
    request: Request,
    offset: u32,
}

impl fmt::Debug for GpioLed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpioLed")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl Actuator for GpioLed {
    fn set(&mut self, active: bool) -> Result<(), LineError> {
        self.request
            .set_value(self.offset, line_value(active))
            .map_err(|e| LineError::new(e.to_string()))
    }
}
