//! A mock platform implementation

use core::cell::{Cell, RefCell};
use skywren::sat::SatPacket;
use skywren::{Error, Host, SatRadio};

/// A mock host with scriptable uptime, RNG and sequence numbers
#[derive(Debug, Default)]
pub struct MockHost {
    /// The reported uptime in milliseconds
    pub uptime: Cell<u64>,
    /// The byte the RNG repeats, or `None` to make it fail
    pub rand_byte: Cell<Option<u8>>,
    /// Scripted sequence numbers, drained front first; empty falls back to
    /// the device-internal counter
    pub sequence: RefCell<Vec<u16>>,
}
impl MockHost {
    /// Creates a mock host with a working RNG and no scripted sequences
    pub fn new() -> Self {
        Self { uptime: Cell::new(0), rand_byte: Cell::new(Some(0)), sequence: RefCell::new(Vec::new()) }
    }

    /// Creates a mock host that yields the given sequence numbers
    pub fn with_sequence(sequence: &[u16]) -> Self {
        let host = Self::new();
        *host.sequence.borrow_mut() = sequence.to_vec();
        host
    }
}
impl Host for &MockHost {
    fn uptime_ms(&self) -> u64 {
        self.uptime.get()
    }

    fn rand(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        match self.rand_byte.get() {
            Some(byte) => {
                buf.fill(byte);
                Ok(())
            }
            None => Err(Error::Crypto),
        }
    }

    fn sequence_counter(&mut self) -> Option<u16> {
        let mut sequence = self.sequence.borrow_mut();
        match sequence.is_empty() {
            true => None,
            false => Some(sequence.remove(0)),
        }
    }
}

/// A radio that records every send instead of transmitting
#[derive(Debug, Default)]
pub struct CountingRadio {
    /// The `(transmissions, interval_s)` arguments of every send call
    pub sends: Vec<(u8, u8)>,
}
impl SatRadio for CountingRadio {
    fn init(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn send(&mut self, _packet: &SatPacket, transmissions: u8, interval_s: u8) -> Result<(), Error> {
        self.sends.push((transmissions, interval_s));
        Ok(())
    }
}
