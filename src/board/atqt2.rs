//! ATQT2 wing: an X/Y slider pair shown as one lit cell on an IS31FL3728
//! 8x8 matrix.

use tracing::{error, info};

use crate::board::{assemble_xy, pick};
use crate::config::DemoConfig;
use crate::controller::Position;
use crate::dispatch::Poll;
use crate::error::WingError;
use crate::input::evdev_backend::EvdevInput;
use crate::output::matrix::{LedMatrix, RegisterBus};

pub const SLIDER_X_INPUT: &str = "/dev/input/event1";
pub const SLIDER_Y_INPUT: &str = "/dev/input/event2";

/// Redraw the matrix from the latest slider positions
pub fn refresh<B: RegisterBus>(
    matrix: &mut LedMatrix<B>,
    x: &Position,
    y: &Position,
) -> Result<(), WingError> {
    matrix.show_position(x.get(), y.get())?;
    Ok(())
}

pub fn run(config: &DemoConfig) -> WingError {
    let mut matrix = match LedMatrix::open(config.matrix.bus, config.matrix.address) {
        Ok(matrix) => matrix,
        Err(e) => {
            error!("{}", e);
            return e.into();
        }
    };
    if let Err(e) = matrix.clear_all() {
        return e.into();
    }

    let x_path = pick(SLIDER_X_INPUT, config.inputs.slider_x.as_ref());
    let y_path = pick(SLIDER_Y_INPUT, config.inputs.slider_y.as_ref());
    let mut sliders = match assemble_xy(
        &x_path,
        &y_path,
        config.name_prefix(),
        &EvdevInput,
        Box::new(Poll),
    ) {
        Ok(sliders) => sliders,
        Err(e) => return e,
    };

    let (x, y) = (sliders.x.clone(), sliders.y.clone());
    let err = sliders.dispatch.run(|| refresh(&mut matrix, &x, &y));
    sliders.dispatch.shutdown();

    info!("blanking matrix");
    if let Err(e) = matrix.clear_all() {
        error!("{}", e);
    }
    err
}
