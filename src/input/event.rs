use chrono::{DateTime, Local};
use std::time::SystemTime;

/// Raw `EV_SYN` type number
pub const EV_SYN: u16 = 0x00;
/// Raw `EV_KEY` type number
pub const EV_KEY: u16 = 0x01;
/// Raw `EV_ABS` type number
pub const EV_ABS: u16 = 0x03;
/// `SYN_DROPPED`: the kernel event buffer overflowed
pub const SYN_DROPPED: u16 = 0x03;

// Event class, as reported in the `type` field of a kernel input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Sync,
    Key,
    Absolute,
    Other(u16),
}

impl From<u16> for EventKind {
    fn from(raw: u16) -> Self {
        match raw {
            EV_SYN => EventKind::Sync,
            EV_KEY => EventKind::Key,
            EV_ABS => EventKind::Absolute,
            other => EventKind::Other(other),
        }
    }
}

/// One decoded `(type, code, value)` triple with its kernel timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
    pub timestamp: DateTime<Local>,
}

impl InputEvent {
    pub fn new(kind: EventKind, code: u16, value: i32) -> Self {
        Self::at(kind, code, value, SystemTime::now())
    }

    pub fn at(kind: EventKind, code: u16, value: i32, time: SystemTime) -> Self {
        Self {
            kind,
            code,
            value,
            timestamp: DateTime::<Local>::from(time),
        }
    }

    pub fn key(code: u16, value: i32) -> Self {
        Self::new(EventKind::Key, code, value)
    }

    pub fn absolute(code: u16, value: i32) -> Self {
        Self::new(EventKind::Absolute, code, value)
    }

    pub fn is_sync_dropped(&self) -> bool {
        self.kind == EventKind::Sync && self.code == SYN_DROPPED
    }

    /// Key release: a key event with value 0
    pub fn is_release(&self) -> bool {
        self.kind == EventKind::Key && self.value == 0
    }

    /// Value clamped to the non-negative range used by position policies
    pub fn magnitude(&self) -> u32 {
        self.value.max(0) as u32
    }
}
