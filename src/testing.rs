//! Fakes for input devices, output lines, the multiplexer and the I2C bus.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::os::fd::RawFd;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::dispatch::{Drain, Multiplexer, Readiness};
use crate::error::WingError;
use crate::input::event::InputEvent;
use crate::input::source::{DecodeError, EventDecoder, InputBackend};
use crate::output::matrix::{MatrixError, RegisterBus};
use crate::output::{Actuator, ActuatorBackend, LedDesc, LineError};

/// One scripted decoder result
#[derive(Debug)]
pub enum Step {
    Event(InputEvent),
    SyncLost,
    Fail(io::ErrorKind),
}

/// Descriptor handed out by [`FakeInput`]; closing it decrements the open count
#[derive(Debug)]
pub struct FakeDescriptor {
    path: PathBuf,
    fd: RawFd,
    open: Rc<Cell<usize>>,
}

impl Drop for FakeDescriptor {
    fn drop(&mut self) {
        self.open.set(self.open.get() - 1);
    }
}

/// Replays its steps, then reports `WouldBlock` forever
#[derive(Debug)]
pub struct ScriptedDecoder {
    name: String,
    fd: RawFd,
    steps: VecDeque<Step>,
    _descriptor: Option<FakeDescriptor>,
}

impl ScriptedDecoder {
    pub fn new(name: &str, steps: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            fd: 100,
            steps: steps.into(),
            _descriptor: None,
        }
    }
}

impl EventDecoder for ScriptedDecoder {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn raw_fd(&self) -> RawFd {
        self.fd
    }

    fn next_event(&mut self) -> Result<InputEvent, DecodeError> {
        match self.steps.pop_front() {
            Some(Step::Event(event)) => Ok(event),
            Some(Step::SyncLost) => Err(DecodeError::SyncLost),
            Some(Step::Fail(kind)) => Err(DecodeError::Io(kind.into())),
            None => Err(DecodeError::Io(io::ErrorKind::WouldBlock.into())),
        }
    }
}

/// Input backend over a table of scripted devices
#[derive(Debug, Default)]
pub struct FakeInput {
    devices: RefCell<HashMap<PathBuf, (String, Vec<Step>)>>,
    failing_bind: HashSet<PathBuf>,
    open: Rc<Cell<usize>>,
    next_fd: Cell<RawFd>,
}

impl FakeInput {
    pub fn new() -> Self {
        Self {
            next_fd: Cell::new(20),
            ..Self::default()
        }
    }

    pub fn with_device(self, path: &str, name: &str, steps: Vec<Step>) -> Self {
        self.devices
            .borrow_mut()
            .insert(PathBuf::from(path), (name.to_string(), steps));
        self
    }

    pub fn failing_bind(mut self, path: &str) -> Self {
        self.failing_bind.insert(PathBuf::from(path));
        self
    }

    pub fn open_descriptors(&self) -> usize {
        self.open.get()
    }
}

impl InputBackend for FakeInput {
    type Descriptor = FakeDescriptor;
    type Decoder = ScriptedDecoder;

    fn open(&self, path: &Path) -> io::Result<FakeDescriptor> {
        if !self.devices.borrow().contains_key(path) {
            return Err(io::ErrorKind::NotFound.into());
        }
        let fd = self.next_fd.get();
        self.next_fd.set(fd + 1);
        self.open.set(self.open.get() + 1);
        Ok(FakeDescriptor {
            path: path.to_path_buf(),
            fd,
            open: self.open.clone(),
        })
    }

    fn bind(&self, descriptor: FakeDescriptor) -> io::Result<ScriptedDecoder> {
        if self.failing_bind.contains(&descriptor.path) {
            return Err(io::Error::new(io::ErrorKind::Other, "not an event device"));
        }
        let (name, steps) = self
            .devices
            .borrow_mut()
            .get_mut(&descriptor.path)
            .map(|(name, steps)| (name.clone(), std::mem::take(steps)))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;

        Ok(ScriptedDecoder {
            name,
            fd: descriptor.fd,
            steps: steps.into(),
            _descriptor: Some(descriptor),
        })
    }
}

#[derive(Debug, Default)]
struct LineBook {
    levels: HashMap<u32, bool>,
    releases: HashMap<u32, usize>,
    live: usize,
    requested: usize,
}

/// GPIO stand-in recording levels and line lifetimes per pin
#[derive(Debug, Default)]
pub struct FakeLines {
    book: Rc<RefCell<LineBook>>,
    failing_request: HashSet<u32>,
    failing_set: HashSet<u32>,
}

impl FakeLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_request(mut self, pin: u32) -> Self {
        self.failing_request.insert(pin);
        self
    }

    pub fn failing_set(mut self, pin: u32) -> Self {
        self.failing_set.insert(pin);
        self
    }

    pub fn level(&self, pin: u32) -> Option<bool> {
        self.book.borrow().levels.get(&pin).copied()
    }

    /// Lines currently held
    pub fn live(&self) -> usize {
        self.book.borrow().live
    }

    /// Successful requests so far
    pub fn requested(&self) -> usize {
        self.book.borrow().requested
    }

    pub fn releases(&self, pin: u32) -> usize {
        self.book.borrow().releases.get(&pin).copied().unwrap_or(0)
    }
}

impl ActuatorBackend for FakeLines {
    type Line = FakeLine;

    fn request(&mut self, led: &LedDesc) -> Result<FakeLine, LineError> {
        if self.failing_request.contains(&led.pin) {
            return Err(LineError::new(format!("pin {} busy", led.pin)));
        }
        let mut book = self.book.borrow_mut();
        book.requested += 1;
        book.live += 1;
        book.levels.insert(led.pin, false);
        Ok(FakeLine {
            pin: led.pin,
            fail_set: self.failing_set.contains(&led.pin),
            book: self.book.clone(),
        })
    }
}

#[derive(Debug)]
pub struct FakeLine {
    pin: u32,
    fail_set: bool,
    book: Rc<RefCell<LineBook>>,
}

impl Actuator for FakeLine {
    fn set(&mut self, active: bool) -> Result<(), LineError> {
        if self.fail_set {
            return Err(LineError::new("write failed"));
        }
        self.book.borrow_mut().levels.insert(self.pin, active);
        Ok(())
    }
}

impl Drop for FakeLine {
    fn drop(&mut self) {
        let mut book = self.book.borrow_mut();
        book.live -= 1;
        *book.releases.entry(self.pin).or_insert(0) += 1;
    }
}

/// Multiplexer replaying readiness rounds; fails once the script runs out
#[derive(Debug, Default)]
pub struct ScriptedMultiplexer {
    rounds: VecDeque<io::Result<Vec<Readiness>>>,
    watched: Rc<RefCell<Vec<Vec<RawFd>>>>,
}

impl ScriptedMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn round(mut self, readiness: Vec<Readiness>) -> Self {
        self.rounds.push_back(Ok(readiness));
        self
    }

    pub fn failure(mut self, kind: io::ErrorKind) -> Self {
        self.rounds.push_back(Err(kind.into()));
        self
    }

    /// Descriptor sets passed to each `wait` call
    pub fn watched(&self) -> Rc<RefCell<Vec<Vec<RawFd>>>> {
        self.watched.clone()
    }
}

impl Multiplexer for ScriptedMultiplexer {
    fn wait(&mut self, fds: &[RawFd]) -> io::Result<Vec<Readiness>> {
        self.watched.borrow_mut().push(fds.to_vec());
        self.rounds
            .pop_front()
            .unwrap_or_else(|| Err(io::Error::new(io::ErrorKind::Other, "script exhausted")))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ProbeOutcome {
    Drained(usize),
    SyncLost,
}

/// Drain stand-in that records its label into a shared log
#[derive(Debug)]
pub struct Probe {
    label: String,
    fd: RawFd,
    log: Rc<RefCell<Vec<String>>>,
    outcome: ProbeOutcome,
}

impl Probe {
    pub fn new(label: &str, fd: RawFd) -> Self {
        Self {
            label: label.to_string(),
            fd,
            log: Rc::default(),
            outcome: ProbeOutcome::Drained(1),
        }
    }

    pub fn shared_log(&self) -> Rc<RefCell<Vec<String>>> {
        self.log.clone()
    }

    pub fn with_log(mut self, log: Rc<RefCell<Vec<String>>>) -> Self {
        self.log = log;
        self
    }

    pub fn outcome(mut self, outcome: ProbeOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

impl Drain for Probe {
    fn label(&self) -> &str {
        &self.label
    }

    fn raw_fd(&self) -> Option<RawFd> {
        Some(self.fd)
    }

    fn drain(&mut self) -> Result<usize, WingError> {
        self.log.borrow_mut().push(self.label.clone());
        match self.outcome {
            ProbeOutcome::Drained(count) => Ok(count),
            ProbeOutcome::SyncLost => Err(WingError::SyncLost {
                device: self.label.clone(),
            }),
        }
    }
}

/// Register bus recording every write; optionally fails at the n-th write
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub writes: Vec<(u8, u8)>,
    fail_at: Option<usize>,
}

impl RecordingBus {
    pub fn failing_after(writes: usize) -> Self {
        Self {
            writes: Vec::new(),
            fail_at: Some(writes),
        }
    }
}

impl RegisterBus for RecordingBus {
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), MatrixError> {
        if self.fail_at == Some(self.writes.len()) {
            return Err(MatrixError::ShortWrite {
                register,
                written: 1,
            });
        }
        self.writes.push((register, value));
        Ok(())
    }
}
