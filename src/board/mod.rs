//! Compiled-in wing boards and their demo wiring
//!
//! | Board          | Inputs                      | Outputs                         |
//! |----------------|-----------------------------|---------------------------------|
//! | `qt1-mutcap`   | buttons, slider, wheel      | GPIO LEDs                       |
//! | `qt1-selfcap`  | button, slider, wheel       | GPIO LEDs                       |
//! | `qt6`          | X and Y sliders             | log line per wake               |
//! | `atqt2`        | X and Y sliders             | IS31FL3728 matrix per wake      |

pub mod atqt2;
pub mod qt1;
pub mod qt6;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DemoConfig;
use crate::controller::{Accumulator, Controller, ControllerSpec, Position};
use crate::dispatch::{DispatchLoop, Multiplexer, Running};
use crate::error::WingError;
use crate::input::source::InputBackend;
use crate::output::NoLeds;

/// Name prefix reported by the PTC touch driver
pub const DEFAULT_NAME_PREFIX: &str = "atmel_ptc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoardKind {
    #[default]
    Qt1Mutcap,
    Qt1Selfcap,
    Qt6,
    Atqt2,
}

impl BoardKind {
    /// Run the demo for this board until the first fatal error
    pub fn run(self, config: &DemoConfig) -> WingError {
        info!("Starting {:?} demo", self);
        match self {
            BoardKind::Qt1Mutcap => qt1::run(&qt1::MUTCAP, config),
            BoardKind::Qt1Selfcap => qt1::run(&qt1::SELFCAP, config),
            BoardKind::Qt6 => qt6::run(config),
            BoardKind::Atqt2 => atqt2::run(config),
        }
    }
}

pub(crate) fn pick(default: &str, custom: Option<&PathBuf>) -> PathBuf {
    custom.cloned().unwrap_or_else(|| PathBuf::from(default))
}

/// Two sliders whose latest positions are read after every wake
#[derive(Debug)]
pub struct XySliders {
    pub dispatch: DispatchLoop<Running>,
    pub x: Position,
    pub y: Position,
}

/// Build accumulator controllers for an X/Y slider pair, in that dispatch order
pub fn assemble_xy<B>(
    x_path: &Path,
    y_path: &Path,
    name_prefix: &str,
    input: &B,
    multiplexer: Box<dyn Multiplexer>,
) -> Result<XySliders, WingError>
where
    B: InputBackend,
    B::Decoder: 'static,
{
    let x = Position::new();
    let y = Position::new();

    let slider_x = Controller::initialize(
        &ControllerSpec {
            label: "slider x",
            input_path: x_path,
            name_prefix,
            leds: &[],
        },
        input,
        &mut NoLeds,
        Accumulator::new(x.clone()),
    )?;
    let slider_y = Controller::initialize(
        &ControllerSpec {
            label: "slider y",
            input_path: y_path,
            name_prefix,
            leds: &[],
        },
        input,
        &mut NoLeds,
        Accumulator::new(y.clone()),
    )?;

    let mut dispatch = DispatchLoop::create(multiplexer);
    dispatch.register(slider_x)?;
    dispatch.register(slider_y)?;

    Ok(XySliders {
        dispatch: dispatch.arm(),
        x,
        y,
    })
}
