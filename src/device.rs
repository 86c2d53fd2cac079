//! The device context that all beacon operations run on

use crate::crypto::{Aes, MasterKey};
use crate::error::Error;
use crate::host::Host;
use crate::nonce::{NonceMonitor, MAX_SEQUENCE};
use core::marker::PhantomData;

/// The day counter period in milliseconds
const DAY_MS: u64 = 86_400_000;

/// The default local-oscillator drift assumed for the retry budget, in ppm
const DEFAULT_DRIFT_PPM: u32 = 20;

/// A beacon-emitting device
///
/// Owns everything the builders need: the long-term key (erased on drop),
/// the wall-clock base, the nonce monitor and the default sequence counter.
/// All operations run to completion on the caller's thread; the context is
/// neither reentrant nor thread-safe, so the caller must serialise access.
pub struct Device<A, H>
where
    A: Aes,
    H: Host,
{
    /// The long-term key, if set already
    pub(crate) key: Option<MasterKey<A>>,
    /// UTC minus uptime as of the last synchronisation
    utc_base: u64,
    /// The UTC instant of the last synchronisation, for drift compensation
    utc_synced: u64,
    /// The nonce-reuse monitor
    pub(crate) monitor: NonceMonitor,
    /// The internal wrapping sequence counter
    sequence: u16,
    /// The assumed clock drift in parts per million
    drift_ppm: u32,
    /// The static device identifier for the deprecated satellite protocol
    #[cfg(feature = "sat-protocol-v0")]
    pub(crate) static_device_id: u64,
    /// The private sequence counter of the deprecated satellite protocol
    #[cfg(feature = "sat-protocol-v0")]
    pub(crate) v0_sequence: u16,
    /// The platform services
    pub(crate) host: H,
    /// A type reference to the underlying AES implementation
    _aes: PhantomData<A>,
}
impl<A, H> Device<A, H>
where
    A: Aes,
    H: Host,
{
    /// Creates a device context
    ///
    /// `utc_ms` is the current UTC time in milliseconds since the Unix epoch
    /// and must be non-zero; `key` may be deferred and set later via
    /// [`key_set`](Self::key_set). Wrong-sized keys are rejected.
    pub fn new(utc_ms: u64, key: Option<&[u8]>, host: H) -> Result<Self, Error> {
        let mut device = Self {
            key: None,
            utc_base: 0,
            utc_synced: 0,
            monitor: NonceMonitor::new(),
            sequence: 0,
            drift_ppm: DEFAULT_DRIFT_PPM,
            #[cfg(feature = "sat-protocol-v0")]
            static_device_id: 0,
            #[cfg(feature = "sat-protocol-v0")]
            v0_sequence: 0,
            host,
            _aes: PhantomData,
        };
        device.utc_set(utc_ms)?;
        if let Some(key) = key {
            device.key_set(key)?;
        }
        Ok(device)
    }

    /// Synchronises the wall clock
    ///
    /// `utc_ms` must be non-zero. Resets the UTC base and records the
    /// synchronisation instant used to grow the satellite retry budget with
    /// clock drift.
    pub fn utc_set(&mut self, utc_ms: u64) -> Result<(), Error> {
        if utc_ms == 0 {
            return Err(Error::InvalidArgument);
        }

        // It holds when the device synced UTC
        self.utc_synced = utc_ms;
        self.utc_base = utc_ms.saturating_sub(self.host.uptime_ms());
        Ok(())
    }

    /// Replaces the long-term key
    ///
    /// `key` must match the AES provider's key length; otherwise the call
    /// fails and the prior key stays in place. The old key is erased.
    pub fn key_set(&mut self, key: &[u8]) -> Result<(), Error> {
        let key = MasterKey::new(key)?;
        self.key = Some(key);
        Ok(())
    }

    /// Sets the assumed clock drift used for the satellite retry budget
    pub fn drift_ppm_set(&mut self, ppm: u32) {
        self.drift_ppm = ppm;
    }

    /// Releases the platform services
    pub fn into_host(self) -> H {
        self.host
    }

    /// The current UTC time in milliseconds
    pub(crate) fn now_ms(&self) -> u64 {
        self.utc_base.saturating_add(self.host.uptime_ms())
    }

    /// The day counter: whole days since the Unix epoch
    pub(crate) fn day_counter(&self) -> u32 {
        (self.now_ms() / DAY_MS) as u32
    }

    /// Milliseconds elapsed since the last UTC synchronisation
    pub(crate) fn since_sync_ms(&self) -> u64 {
        self.now_ms().saturating_sub(self.utc_synced)
    }

    /// The assumed clock drift in parts per million
    pub(crate) fn drift_ppm(&self) -> u32 {
        self.drift_ppm
    }

    /// The next sequence number, advancing the counter
    ///
    /// Taken from the host override if [`Host::sequence_counter`] provides
    /// one, otherwise from the internal counter that wraps within
    /// `[0, 1023]`. The builders call this once per broadcast.
    pub fn next_sequence(&mut self) -> u16 {
        if let Some(seq) = self.host.sequence_counter() {
            return seq;
        }

        // Sequence number used to rotate keys
        if self.sequence > MAX_SEQUENCE {
            self.sequence = 0;
        }
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        sequence
    }
}
impl<A, H> core::fmt::Debug for Device<A, H>
where
    A: Aes,
    H: Host,
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("key", &self.key)
            .field("utc_base", &self.utc_base)
            .field("utc_synced", &self.utc_synced)
            .field("monitor", &self.monitor)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
