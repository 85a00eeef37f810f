//! IS31FL3728 8x8 LED matrix driver over I2C.
//!
//! Registers `0x00..=0x07` hold one column each (a row bitmask); writing `0x01`
//! to the update register latches all column data onto the LEDs.

use rppal::i2c::I2c;
use thiserror::Error;
use tracing::{debug, info, trace};

pub const DEFAULT_BUS: u8 = 1;
pub const DEFAULT_ADDRESS: u16 = 0x60;

pub const COLUMNS: u8 = 8;
const UPDATE_COLUMN_REG: u8 = 0x0c;

// Slider ranges on the ATQT2 wing: x 0..=63 over columns 1..=7, y 0..=57 over 7 rows
const X_STEP: u32 = 10;
const Y_STEP: u32 = 9;
const TOP_ROW: u8 = 0b0100_0000;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Can't open I2C bus {bus}: {source}")]
    Open {
        bus: u8,
        #[source]
        source: rppal::i2c::Error,
    },

    #[error("Failed to acquire bus access to slave {address:#04x}: {source}")]
    Address {
        address: u16,
        #[source]
        source: rppal::i2c::Error,
    },

    #[error("Failed to write to the i2c bus: {0}")]
    Bus(#[from] rppal::i2c::Error),

    #[error("Short write to register {register:#04x}: {written} of 2 bytes")]
    ShortWrite { register: u8, written: usize },

    #[error("Column {0} is outside the matrix")]
    ColumnOutOfRange(u8),
}

/// Single-register write access to the matrix chip
pub trait RegisterBus {
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), MatrixError>;
}

impl RegisterBus for I2c {
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), MatrixError> {
        let written = self.write(&[register, value])?;
        if written != 2 {
            return Err(MatrixError::ShortWrite { register, written });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct LedMatrix<B> {
    bus: B,
}

impl LedMatrix<I2c> {
    pub fn open(bus: u8, address: u16) -> Result<Self, MatrixError> {
        let mut i2c = I2c::with_bus(bus).map_err(|source| MatrixError::Open { bus, source })?;
        i2c.set_slave_address(address)
            .map_err(|source| MatrixError::Address { address, source })?;
        info!("LED matrix on i2c-{} at {:#04x}", bus, address);
        Ok(Self::new(i2c))
    }
}

impl<B: RegisterBus> LedMatrix<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Blank every column and latch
    pub fn clear_all(&mut self) -> Result<(), MatrixError> {
        for column in 0..COLUMNS {
            self.bus.write_register(column, 0)?;
        }
        self.commit()
    }

    /// Stage one column's row bitmask; not visible until [`commit`](Self::commit)
    pub fn set_cell(&mut self, column: u8, row_mask: u8) -> Result<(), MatrixError> {
        if column >= COLUMNS {
            return Err(MatrixError::ColumnOutOfRange(column));
        }
        trace!("column {} <- {:#010b}", column, row_mask);
        self.bus.write_register(column, row_mask)
    }

    pub fn commit(&mut self) -> Result<(), MatrixError> {
        self.bus.write_register(UPDATE_COLUMN_REG, 0x01)
    }

    /// Light the single cell under an `(x, y)` touch, or nothing when both are 0
    pub fn show_position(&mut self, x: u32, y: u32) -> Result<(), MatrixError> {
        self.clear_all()?;
        if x == 0 && y == 0 {
            return Ok(());
        }

        let (column, row_mask) = cell_for(x, y);
        debug!("touch ({}, {}) -> column {} rows {:#010b}", x, y, column, row_mask);
        self.set_cell(column, row_mask)?;
        self.commit()
    }

    pub fn into_inner(self) -> B {
        self.bus
    }
}

fn cell_for(x: u32, y: u32) -> (u8, u8) {
    let column = (1 + x / X_STEP).min(u32::from(COLUMNS - 1)) as u8;
    let row_mask = TOP_ROW.checked_shr(y / Y_STEP).unwrap_or(0);
    (column, row_mask)
}
