//! PTC QT6 wing: two sliders reported as an X/Y pair.

use std::path::Path;

use tracing::info;

use crate::board::{assemble_xy, pick};
use crate::config::DemoConfig;
use crate::controller::Position;
use crate::dispatch::Poll;
use crate::error::WingError;
use crate::input::evdev_backend::EvdevInput;

pub const SLIDER_X_INPUT: &str = "/dev/input/atmel_ptc0";
pub const SLIDER_Y_INPUT: &str = "/dev/input/atmel_ptc1";

fn report(x: &Position, y: &Position) -> String {
    format!("x={} - y={}", x.get(), y.get())
}

pub fn run(config: &DemoConfig) -> WingError {
    let x_path = pick(SLIDER_X_INPUT, config.inputs.slider_x.as_ref());
    let y_path = pick(SLIDER_Y_INPUT, config.inputs.slider_y.as_ref());

    let sliders = assemble_xy(
        Path::new(&x_path),
        Path::new(&y_path),
        config.name_prefix(),
        &EvdevInput,
        Box::new(Poll),
    );
    let mut sliders = match sliders {
        Ok(sliders) => sliders,
        Err(e) => return e,
    };

    let (x, y) = (sliders.x.clone(), sliders.y.clone());
    let err = sliders.dispatch.run(|| {
        info!("{}", report(&x, &y));
        Ok(())
    });
    sliders.dispatch.shutdown();
    err
}
