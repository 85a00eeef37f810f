//! PTC QT1 wing, mutual and self capacitance variants.
//!
//! Buttons mirror onto their LEDs, the slider is shown as a filled bar and
//! the wheel angle as a 3-bit code.

use std::path::Path;

use tracing::{error, info};

use crate::board::pick;
use crate::config::DemoConfig;
use crate::controller::{BarGraph, Bitmask, Controller, ControllerSpec, KeyMirror};
use crate::dispatch::{DispatchLoop, Multiplexer, Poll, Running};
use crate::error::WingError;
use crate::input::evdev_backend::EvdevInput;
use crate::input::source::InputBackend;
use crate::output::gpio::{GpioLines, Polarity};
use crate::output::{ActuatorBackend, LedDesc};

pub const BUTTONS_INPUT: &str = "/dev/input/atmel_ptc0";
pub const SLIDER_INPUT: &str = "/dev/input/atmel_ptc1";
pub const WHEEL_INPUT: &str = "/dev/input/atmel_ptc2";

// Slider positions run 0..=63 and are split into 8 display levels
const SLIDER_RANGE: u32 = 64;
const SLIDER_LEVELS: u32 = 8;
// Wheel angle 0..=63 split into 7 codes
const WHEEL_STEP: u32 = 10;

/// LED and keycode tables for one QT1 variant
#[derive(Debug)]
pub struct Qt1Layout {
    pub name: &'static str,
    pub button_keycodes: &'static [u16],
    pub button_leds: &'static [LedDesc],
    pub slider_leds: &'static [LedDesc],
    pub wheel_leds: &'static [LedDesc],
}

pub const MUTCAP: Qt1Layout = Qt1Layout {
    name: "QT1 mutual capacitance",
    button_keycodes: &[0x108, 0x109],
    button_leds: &[
        LedDesc::new(0, 103), // PD7
        LedDesc::new(1, 104), // PD8
    ],
    slider_leds: &[
        LedDesc::new(0, 107), // PD11
        LedDesc::new(1, 108), // PD12
        LedDesc::new(2, 41),  // PB9
        LedDesc::new(3, 64),  // PC0
        LedDesc::new(4, 113), // PD17
        LedDesc::new(5, 114), // PD18
        LedDesc::new(6, 122), // PD26
    ],
    wheel_leds: &WHEEL_LEDS,
};

pub const SELFCAP: Qt1Layout = Qt1Layout {
    name: "QT1 self capacitance",
    button_keycodes: &[0x106],
    button_leds: &[
        LedDesc::new(0, 104), // PD8
    ],
    slider_leds: &[
        LedDesc::new(0, 41),  // PB9
        LedDesc::new(1, 64),  // PC0
        LedDesc::new(2, 113), // PD17
        LedDesc::new(3, 122), // PD26
        LedDesc::new(4, 99),  // PD3
        LedDesc::new(5, 100), // PD4
        LedDesc::new(6, 101), // PD5
        LedDesc::new(7, 102), // PD6
    ],
    wheel_leds: &WHEEL_LEDS,
};

const WHEEL_LEDS: [LedDesc; 3] = [
    LedDesc::new(0, 105), // PD9
    LedDesc::new(1, 106), // PD10
    LedDesc::new(2, 57),  // PB25
];

/// Input nodes for the three QT1 widgets
#[derive(Debug, Clone, Copy)]
pub struct Qt1Inputs<'a> {
    pub buttons: &'a Path,
    pub slider: &'a Path,
    pub wheel: &'a Path,
}

/// Build buttons, slider and wheel controllers and arm a loop over them
pub fn assemble<B, O>(
    layout: &Qt1Layout,
    inputs: &Qt1Inputs<'_>,
    name_prefix: &str,
    input: &B,
    outputs: &mut O,
    multiplexer: Box<dyn Multiplexer>,
) -> Result<DispatchLoop<Running>, WingError>
where
    B: InputBackend,
    B::Decoder: 'static,
    O: ActuatorBackend,
    O::Line: 'static,
{
    let buttons = Controller::initialize(
        &ControllerSpec {
            label: "buttons",
            input_path: inputs.buttons,
            name_prefix,
            leds: layout.button_leds,
        },
        input,
        outputs,
        KeyMirror::new(layout.button_keycodes),
    )?;
    let slider = Controller::initialize(
        &ControllerSpec {
            label: "slider",
            input_path: inputs.slider,
            name_prefix,
            leds: layout.slider_leds,
        },
        input,
        outputs,
        BarGraph::new(SLIDER_RANGE, SLIDER_LEVELS),
    )?;
    let wheel = Controller::initialize(
        &ControllerSpec {
            label: "wheel",
            input_path: inputs.wheel,
            name_prefix,
            leds: layout.wheel_leds,
        },
        input,
        outputs,
        Bitmask::new(WHEEL_STEP),
    )?;

    let mut dispatch = DispatchLoop::create(multiplexer);
    dispatch.register(buttons)?;
    dispatch.register(slider)?;
    dispatch.register(wheel)?;
    Ok(dispatch.arm())
}

pub fn run(layout: &Qt1Layout, config: &DemoConfig) -> WingError {
    let polarity = Polarity::from_active_low(config.gpio_active_low);
    let mut gpio = match GpioLines::open(&config.gpio_chip, polarity) {
        Ok(gpio) => gpio,
        Err(e) => {
            error!("gpio controller open failed: {}", e);
            return WingError::Gpio(e);
        }
    };

    let overrides = &config.inputs;
    let buttons = pick(BUTTONS_INPUT, overrides.buttons.as_ref());
    let slider = pick(SLIDER_INPUT, overrides.slider.as_ref());
    let wheel = pick(WHEEL_INPUT, overrides.wheel.as_ref());
    let inputs = Qt1Inputs {
        buttons: &buttons,
        slider: &slider,
        wheel: &wheel,
    };

    info!("{} wing", layout.name);
    let mut dispatch = match assemble(
        layout,
        &inputs,
        config.name_prefix(),
        &EvdevInput,
        &mut gpio,
        Box::new(Poll),
    ) {
        Ok(dispatch) => dispatch,
        Err(e) => return e,
    };

    let err = dispatch.run(|| Ok(()));
    dispatch.shutdown();
    err
}
