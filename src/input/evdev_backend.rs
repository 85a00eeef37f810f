//! Kernel input backend: `/dev/input` nodes decoded with the `evdev` crate.
//!
//! The raw (unsynchronised) stream is used so that a `SYN_DROPPED` record
//! reaches us and can be reported as sync loss instead of being papered over
//! by a resync.

use std::collections::VecDeque;
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use evdev::raw_stream::RawDevice;
use tracing::{debug, warn};

use crate::input::event::{EventKind, InputEvent};
use crate::input::source::{DecodeError, EventDecoder, InputBackend};

/// Opens `/dev/input/*` nodes non-blocking and decodes them with evdev
#[derive(Debug, Default, Clone, Copy)]
pub struct EvdevInput;

impl InputBackend for EvdevInput {
    type Descriptor = OwnedFd;
    type Decoder = EvdevDecoder;

    fn open(&self, path: &Path) -> io::Result<OwnedFd> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        Ok(OwnedFd::from(file))
    }

    fn bind(&self, descriptor: OwnedFd) -> io::Result<EvdevDecoder> {
        let device = RawDevice::from_fd(descriptor)?;
        debug!(
            "evdev bound to fd {} ({})",
            device.as_raw_fd(),
            device.name().unwrap_or("<unnamed>")
        );
        Ok(EvdevDecoder {
            device,
            pending: VecDeque::new(),
        })
    }
}

/// Decoder over one evdev device; buffers each fetched batch
pub struct EvdevDecoder {
    device: RawDevice,
    pending: VecDeque<InputEvent>,
}

impl fmt::Debug for EvdevDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvdevDecoder")
            .field("fd", &self.device.as_raw_fd())
            .field("name", &self.device.name())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl EventDecoder for EvdevDecoder {
    fn name(&self) -> Option<&str> {
        self.device.name()
    }

    fn raw_fd(&self) -> RawFd {
        self.device.as_raw_fd()
    }

    fn next_event(&mut self) -> Result<InputEvent, DecodeError> {
        if self.pending.is_empty() {
            let batch = self.device.fetch_events()?;
            self.pending.extend(batch.map(|ev| {
                InputEvent::at(
                    EventKind::from(ev.event_type().0),
                    ev.code(),
                    ev.value(),
                    ev.timestamp(),
                )
            }));
        }

        match self.pending.pop_front() {
            Some(event) if event.is_sync_dropped() => {
                warn!("SYN_DROPPED, discarding {} buffered events", self.pending.len());
                self.pending.clear();
                Err(DecodeError::SyncLost)
            }
            Some(event) => Ok(event),
            None => Err(DecodeError::Io(io::ErrorKind::WouldBlock.into())),
        }
    }
}
