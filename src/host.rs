//! Capability traits implemented by the embedding platform

use crate::error::Error;
use crate::sat::SatPacket;

/// Platform services consumed by the beacon builders
///
/// The SDK holds exactly one implementation per [`Device`](crate::Device) and
/// calls into it synchronously; implementations do not need to be reentrant.
pub trait Host {
    /// Milliseconds since the platform booted
    ///
    /// Together with the UTC base set via [`Device::utc_set`](crate::Device::utc_set),
    /// this forms the wall clock that drives the day counter. It must be
    /// monotonic; it does not need to survive a reset.
    fn uptime_ms(&self) -> u64;

    /// Fills `buf` with cryptographically random bytes
    ///
    /// Randomness is only used to pick the satellite channel, never for key
    /// or nonce material. On failure the builders fall back to a fixed
    /// default channel.
    fn rand(&mut self, buf: &mut [u8]) -> Result<(), Error>;

    /// An application-supplied sequence counter in `[0, 1023]`
    ///
    /// Return `Some` to override the device-internal wrapping counter, e.g.
    /// to persist the sequence number in flash across resets. Returning
    /// `None` selects the internal counter.
    fn sequence_counter(&mut self) -> Option<u16> {
        None
    }
}

/// The satellite radio bearer
///
/// The core never touches the RF front-end; it hands finished packets to this
/// trait. Implementations typically serialise concurrent senders with a
/// binary semaphore and jitter the inter-transmission sleep.
pub trait SatRadio {
    /// One-shot radio initialisation
    fn init(&mut self) -> Result<(), Error>;

    /// Transmits `packet` `transmissions` times, `interval_s` seconds apart
    ///
    /// Blocks the caller for the whole transmission. Every symbol is sent on
    /// the packet's channel; retransmissions may hop channels following the
    /// packet's hopping sequence.
    fn send(&mut self, packet: &SatPacket, transmissions: u8, interval_s: u8) -> Result<(), Error>;
}

impl<T> Host for &mut T
where
    T: Host,
{
    fn uptime_ms(&self) -> u64 {
        (**self).uptime_ms()
    }
    fn rand(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        (**self).rand(buf)
    }
    fn sequence_counter(&mut self) -> Option<u16> {
        (**self).sequence_counter()
    }
}
