use std::fmt;
use std::io;
use std::os::fd::RawFd;

use statum::{machine, state};
use tracing::{debug, error, info};

use crate::controller::{Controller, PositionPolicy};
use crate::dispatch::multiplexer::{Multiplexer, Readiness};
use crate::error::WingError;
use crate::input::source::EventDecoder;
use crate::output::Actuator;

/// Something the loop can wait on and drain
pub trait Drain: fmt::Debug {
    fn label(&self) -> &str;

    fn raw_fd(&self) -> Option<RawFd>;

    /// Consume every queued event; returns how many were dispatched
    fn drain(&mut self) -> Result<usize, WingError>;
}

impl<D, L, P> Drain for Controller<D, L, P>
where
    D: EventDecoder,
    L: Actuator,
    P: PositionPolicy + fmt::Debug,
{
    fn label(&self) -> &str {
        Controller::label(self)
    }

    fn raw_fd(&self) -> Option<RawFd> {
        Controller::raw_fd(self)
    }

    fn drain(&mut self) -> Result<usize, WingError> {
        Controller::drain(self)
    }
}

#[state]
#[derive(Debug, Clone)]
pub enum LoopState {
    Assembling,
    Running,
}

/// Single-threaded dispatch over a fixed table of controllers.
///
/// Controllers are registered while `Assembling`; once armed the table is
/// frozen and every wake drains the ready controllers in registration order.
#[machine]
#[derive(Debug)]
pub struct DispatchLoop<S: LoopState> {
    multiplexer: Box<dyn Multiplexer>,
    sources: Vec<Box<dyn Drain>>,
    descriptors: Vec<RawFd>,
    iterations: u64,
}

impl<S: LoopState> DispatchLoop<S> {
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Tear down every controller, last registered first
    pub fn shutdown(self) {
        let mut sources = self.sources;
        while let Some(source) = sources.pop() {
            info!("Tearing down {}", source.label());
            drop(source);
        }
    }
}

impl DispatchLoop<Assembling> {
    pub fn create(multiplexer: Box<dyn Multiplexer>) -> Self {
        debug!("Creating dispatch loop over {:?}", multiplexer);
        Self::new(multiplexer, Vec::new(), Vec::new(), 0)
    }

    /// Append a controller to the table; its position is its dispatch order
    pub fn register<C>(&mut self, source: C) -> Result<(), WingError>
    where
        C: Drain + 'static,
    {
        let Some(fd) = source.raw_fd() else {
            error!("{} has no open descriptor", source.label());
            return Err(WingError::Descriptor {
                device: source.label().to_string(),
                revents: Readiness::IDLE.0,
            });
        };

        debug!("Slot {}: {} (fd {})", self.sources.len(), source.label(), fd);
        self.descriptors.push(fd);
        self.sources.push(Box::new(source));
        Ok(())
    }

    /// Freeze the table and start dispatching
    pub fn arm(self) -> DispatchLoop<Running> {
        info!("demo running... ({} inputs)", self.sources.len());
        self.transition()
    }
}

impl DispatchLoop<Running> {
    /// Block until input arrives, then drain every ready controller.
    ///
    /// Readiness is validated for all slots before any drain happens.
    pub fn wait_and_dispatch(&mut self) -> Result<usize, WingError> {
        let readiness = self.multiplexer.wait(&self.descriptors).map_err(|e| {
            error!("poll() failed: {}", e);
            WingError::Wait(e)
        })?;

        if readiness.len() != self.sources.len() {
            error!(
                "Multiplexer reported {} slots for {} descriptors",
                readiness.len(),
                self.sources.len()
            );
            return Err(WingError::Wait(io::Error::other(format!(
                "{} readiness slots for {} descriptors",
                readiness.len(),
                self.sources.len()
            ))));
        }

        for (source, ready) in self.sources.iter().zip(&readiness) {
            if !ready.is_idle() && !ready.is_readable_only() {
                error!("error, revents = {:#06x} on {}", ready.0, source.label());
                return Err(WingError::Descriptor {
                    device: source.label().to_string(),
                    revents: ready.0,
                });
            }
        }

        let mut dispatched = 0;
        for (source, ready) in self.sources.iter_mut().zip(&readiness) {
            if ready.is_idle() {
                continue;
            }
            let count = source.drain()?;
            debug!("{}: {} events", source.label(), count);
            dispatched += count;
        }

        self.iterations += 1;
        Ok(dispatched)
    }

    /// Dispatch forever, calling `after_each` once per completed wake.
    ///
    /// Only returns on the first error, which is handed back to the caller.
    pub fn run<F>(&mut self, mut after_each: F) -> WingError
    where
        F: FnMut() -> Result<(), WingError>,
    {
        loop {
            if let Err(e) = self.wait_and_dispatch().and_then(|_| after_each()) {
                error!("event error after {} iterations: {}", self.iterations, e);
                return e;
            }
        }
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
