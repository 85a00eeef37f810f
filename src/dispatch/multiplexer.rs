use std::fmt;
use std::io;
use std::os::fd::RawFd;

/// `revents` reported for one watched descriptor
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Readiness(pub i16);

impl Readiness {
    pub const IDLE: Readiness = Readiness(0);
    pub const READABLE: Readiness = Readiness(libc::POLLIN);

    pub fn is_idle(self) -> bool {
        self.0 == 0
    }

    /// Plain readability with no error, hang-up or invalid bits
    pub fn is_readable_only(self) -> bool {
        self == Self::READABLE
    }
}

impl fmt::Debug for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Readiness({:#06x})", self.0)
    }
}

/// Blocks until at least one descriptor is ready
pub trait Multiplexer: fmt::Debug {
    /// One [`Readiness`] per descriptor, in the order given
    fn wait(&mut self, fds: &[RawFd]) -> io::Result<Vec<Readiness>>;
}

/// `poll(2)` over the watched descriptors, without timeout
#[derive(Debug, Default, Clone, Copy)]
pub struct Poll;

impl Multiplexer for Poll {
    fn wait(&mut self, fds: &[RawFd]) -> io::Result<Vec<Readiness>> {
        let mut pollfds: Vec<libc::pollfd> = fds
            .iter()
            .map(|&fd| libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();

        // SAFETY: `pollfds` is a live, exclusively borrowed buffer of exactly
        // `pollfds.len()` entries for the duration of the call.
        let ret = unsafe { libc::poll(pollfds.as_mut_ptr(), pollfds.len() as libc::nfds_t, -1) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(pollfds.iter().map(|p| Readiness(p.revents)).collect())
    }
}
