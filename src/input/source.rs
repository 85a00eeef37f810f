use std::io;
use std::os::fd::RawFd;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, trace};

use crate::error::WingError;
use crate::input::event::InputEvent;

/// Failure reported by a decoder while producing the next event
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The kernel reported `SYN_DROPPED`
    #[error("event queue overflow, events were dropped")]
    SyncLost,

    /// Read failure; `WouldBlock` means no more data is ready
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// The non-blocking read has nothing more to offer for this poll cycle
    pub fn is_drained(&self) -> bool {
        matches!(self, DecodeError::Io(e) if e.kind() == io::ErrorKind::WouldBlock)
    }
}

/// Stateful decoder bound to one open input device.
///
/// The decoder owns the device descriptor; dropping it releases the decoder
/// state and closes the descriptor in that order.
pub trait EventDecoder {
    /// Name reported by the device driver
    fn name(&self) -> Option<&str>;

    /// Descriptor to watch for readability
    fn raw_fd(&self) -> RawFd;

    /// Next queued event, `Err(Io(WouldBlock))` once the queue is empty
    fn next_event(&mut self) -> Result<InputEvent, DecodeError>;
}

/// Opens input device nodes and binds decoders to them
pub trait InputBackend {
    type Descriptor;
    type Decoder: EventDecoder;

    /// Open the node for non-blocking reads
    fn open(&self, path: &Path) -> io::Result<Self::Descriptor>;

    /// Bind a decoder, transferring ownership of the descriptor to it
    fn bind(&self, descriptor: Self::Descriptor) -> io::Result<Self::Decoder>;
}

/// A validated touch input device producing decoded events
#[derive(Debug)]
pub struct InputSource<D> {
    path: PathBuf,
    name: String,
    decoder: D,
}

impl<D: EventDecoder> InputSource<D> {
    /// Open `path`, bind a decoder and check the device identity
    pub fn open<B>(backend: &B, path: &Path, required_prefix: &str) -> Result<Self, WingError>
    where
        B: InputBackend<Decoder = D>,
    {
        debug!("Opening input device {}", path.display());
        let descriptor = backend.open(path).map_err(|source| {
            error!("Can't open {}: {}", path.display(), source);
            WingError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let decoder = backend.bind(descriptor).map_err(|e| {
            error!("Can't bind event decoder for {}: {}", path.display(), e);
            WingError::Device {
                path: path.to_path_buf(),
                reason: format!("decoder binding failed: {}", e),
            }
        })?;

        Self::bind(path, decoder, required_prefix)
    }

    /// Wrap an already bound decoder after checking the device identity
    pub fn bind(path: &Path, decoder: D, required_prefix: &str) -> Result<Self, WingError> {
        let name = decoder.name().unwrap_or_default().to_string();
        if !name.starts_with(required_prefix) {
            error!(
                "{} is not a touch input device (name {:?}, expected prefix {:?})",
                path.display(),
                name,
                required_prefix
            );
            return Err(WingError::Device {
                path: path.to_path_buf(),
                reason: format!("device name {:?} does not start with {:?}", name, required_prefix),
            });
        }

        info!("Bound input device {} ({})", path.display(), name);
        Ok(Self {
            path: path.to_path_buf(),
            name,
            decoder,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_fd(&self) -> RawFd {
        self.decoder.raw_fd()
    }

    /// Dispatch every queued event, in order, until the device has no more data.
    ///
    /// Returns the number of dispatched events. Sync loss and read errors stop
    /// the drain immediately; events after the failing one are not dispatched.
    pub fn drain<F>(&mut self, mut dispatch: F) -> Result<usize, WingError>
    where
        F: FnMut(&InputEvent),
    {
        let mut dispatched = 0;
        loop {
            match self.decoder.next_event() {
                Ok(event) => {
                    trace!(
                        "{}: {:?} code={:#x} value={}",
                        self.name,
                        event.kind,
                        event.code,
                        event.value
                    );
                    dispatch(&event);
                    dispatched += 1;
                }
                Err(e) if e.is_drained() => {
                    trace!("{}: drained after {} events", self.name, dispatched);
                    return Ok(dispatched);
                }
                Err(DecodeError::SyncLost) => {
                    error!("{}: cannot keep up", self.path.display());
                    return Err(WingError::SyncLost {
                        device: self.path.display().to_string(),
                    });
                }
                Err(DecodeError::Io(e)) => {
                    error!("{}: {}", self.path.display(), e);
                    return Err(WingError::Device {
                        path: self.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}
