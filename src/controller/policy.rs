//! Interpretation policies: how a decoded event changes the LEDs (or an
//! accumulator) of one controller.
//!
//! | Policy        | Absolute event                    | Key release      | Key press |
//! |---------------|-----------------------------------|------------------|-----------|
//! | [`BarGraph`]  | light every led_id <= value/div   | all off          | no-op     |
//! | [`Bitmask`]   | light led i iff bit i of code set | all off          | no-op     |
//! | [`Accumulator`] | store value                     | store 0          | no-op     |
//! | [`KeyMirror`] | ignored                           | matching led off | matching led on |

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::input::event::{EventKind, InputEvent};
use crate::output::{Actuator, LedSlot};

/// Maps one decoded event onto a controller's LED set
pub trait PositionPolicy {
    fn on_event<L: Actuator>(&mut self, leds: &mut [LedSlot<L>], event: &InputEvent);
}

fn all_off<L: Actuator>(leds: &mut [LedSlot<L>]) {
    for led in leds.iter_mut() {
        led.drive(false);
    }
}

/// Filled bar: a slider position lights every LED up to its level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGraph {
    divisor: u32,
}

impl BarGraph {
    /// Split `range` raw positions into `levels` display steps
    pub fn new(range: u32, levels: u32) -> Self {
        Self::with_divisor(range / levels.max(1))
    }

    pub fn with_divisor(divisor: u32) -> Self {
        Self {
            divisor: divisor.max(1),
        }
    }

    pub fn level(&self, value: u32) -> u32 {
        value / self.divisor
    }
}

impl PositionPolicy for BarGraph {
    fn on_event<L: Actuator>(&mut self, leds: &mut [LedSlot<L>], event: &InputEvent) {
        match event.kind {
            EventKind::Key if event.value == 0 => all_off(leds),
            EventKind::Absolute => {
                let level = self.level(event.magnitude());
                for led in leds.iter_mut() {
                    let lit = led.led_id() <= level;
                    led.drive(lit);
                }
            }
            _ => {}
        }
    }
}

/// Wheel display: a small code derived from the angle, shown bit by bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmask {
    step: u32,
}

impl Bitmask {
    pub fn new(step: u32) -> Self {
        Self { step: step.max(1) }
    }

    pub fn code(&self, value: u32) -> u32 {
        value / self.step + 1
    }
}

impl PositionPolicy for Bitmask {
    fn on_event<L: Actuator>(&mut self, leds: &mut [LedSlot<L>], event: &InputEvent) {
        match event.kind {
            EventKind::Key if event.value == 0 => all_off(leds),
            EventKind::Absolute => {
                let code = self.code(event.magnitude());
                for (bit, led) in leds.iter_mut().enumerate() {
                    let lit = u32::try_from(bit)
                        .ok()
                        .and_then(|bit| code.checked_shr(bit))
                        .is_some_and(|shifted| shifted & 1 == 1);
                    led.drive(lit);
                }
            }
            _ => {}
        }
    }
}

/// Shared handle to the latest position of one slider
#[derive(Debug, Clone, Default)]
pub struct Position(Rc<Cell<u32>>);

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    fn set(&self, value: u32) {
        self.0.set(value);
    }
}

/// Stores the latest position for a consumer that refreshes at its own pace
#[derive(Debug, Clone)]
pub struct Accumulator {
    position: Position,
}

impl Accumulator {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

impl PositionPolicy for Accumulator {
    fn on_event<L: Actuator>(&mut self, _leds: &mut [LedSlot<L>], event: &InputEvent) {
        match event.kind {
            EventKind::Key if event.value == 0 => self.position.set(0),
            EventKind::Absolute => self.position.set(event.magnitude()),
            _ => {}
        }
    }
}

/// Buttons: `key_codes[i]` mirrors its state onto LED `i`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMirror {
    key_codes: Vec<u16>,
}

impl KeyMirror {
    pub fn new(key_codes: impl Into<Vec<u16>>) -> Self {
        Self {
            key_codes: key_codes.into(),
        }
    }
}

impl PositionPolicy for KeyMirror {
    fn on_event<L: Actuator>(&mut self, leds: &mut [LedSlot<L>], event: &InputEvent) {
        if event.kind != EventKind::Key {
            return;
        }
        for (code, led) in self.key_codes.iter().zip(leds.iter_mut()) {
            if *code == event.code {
                debug!("key {:#x} -> {}", code, event.value);
                led.drive(event.value != 0);
            }
        }
    }
}
