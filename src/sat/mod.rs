//! The satellite uplink: packet assembly, channel hopping and transmission
//!
//! A satellite packet is a run of six-bit symbols; each symbol selects a
//! frequency step relative to the packet's reference channel. The fixed
//! preamble is formed by the bearer from the reference frequency and
//! transmission pauses, so it is not part of the packet data.

pub mod ephemeris;
mod math;
pub mod packet;
pub mod rs;
pub mod whiten;

#[cfg(feature = "sat-protocol-v0")]
pub mod deprecated;

use crate::device::Device;
use crate::error::Error;
use crate::host::{Host, SatRadio};

/// The maximum number of symbols in a packet
pub const MAX_SYMBOLS: usize = 52;

/// The number of transmission channels
pub const NUM_CHANNELS: u8 = 19;

/// The number of pre-computed frequency-hopping sequences
pub const NUM_HOPPING_SEQUENCES: u8 = 4;

/// The preamble pattern prepended by the bearer
///
/// `0` is the reference frequency, `-1` a transmission pause.
pub const PREAMBLE_SEQUENCE: [i8; 8] = [0, -1, 0, -1, 0, -1, 0, 0];

/// The on-air duration of one symbol in microseconds
pub const SYMBOL_DURATION_US: u32 = 8000;

/// The pause between symbols in microseconds
pub const SYMBOL_OFF_DURATION_US: u32 = 1600;

/// The extra pause after the preamble in microseconds
pub const PREAMBLE_WAIT_US: u32 = 9600;

/// The channel used when the platform RNG fails
pub(crate) const DEFAULT_CHANNEL: u8 = 5;

/// The per-sequence channel-hop tables
///
/// Each table is a full cycle over all 19 channels, so consecutive hops
/// visit every channel once before repeating. Receivers share these tables.
#[rustfmt::skip]
const HOP_TABLES: [[u8; NUM_CHANNELS as usize]; NUM_HOPPING_SEQUENCES as usize] = [
    [ 7,  8,  9, 10, 11, 12, 13, 14, 15, 16, 17, 18,  0,  1,  2,  3,  4,  5,  6],
    [11, 12, 13, 14, 15, 16, 17, 18,  0,  1,  2,  3,  4,  5,  6,  7,  8,  9, 10],
    [ 5,  6,  7,  8,  9, 10, 11, 12, 13, 14, 15, 16, 17, 18,  0,  1,  2,  3,  4],
    [ 3,  4,  5,  6,  7,  8,  9, 10, 11, 12, 13, 14, 15, 16, 17, 18,  0,  1,  2],
];

/// A finished satellite packet
///
/// `data` holds `length` six-bit symbols, one per byte in the low bits. The
/// preamble is not included.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SatPacket {
    /// The packet symbols
    pub data: [u8; MAX_SYMBOLS],
    /// The number of symbols in the packet
    pub length: usize,
    /// The channel encoded in the packet that must be used to transmit
    pub channel: u8,
    /// The hopping sequence to follow across retransmissions
    pub hopping_sequence: u8,
}
impl SatPacket {
    /// An empty packet for e.g. array initialisation
    pub const EMPTY: Self = Self { data: [0; MAX_SYMBOLS], length: 0, channel: 0, hopping_sequence: 0 };

    /// The valid symbols of the packet
    pub fn symbols(&self) -> &[u8] {
        self.data.get(..self.length).unwrap_or_default()
    }
}
impl Default for SatPacket {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// The transmission reliability profile
///
/// Selects how often a packet is retransmitted and how far apart the
/// transmissions are spaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reliability {
    /// A single transmission
    None,
    /// Eight transmissions, twenty seconds apart
    Normal,
    /// Sixteen transmissions, ten seconds apart
    High,
}
impl Reliability {
    /// The `(transmissions, interval seconds)` schedule of this profile
    const fn schedule(self) -> (u8, u8) {
        match self {
            Self::None => (1, 0),
            Self::Normal => (8, 20),
            Self::High => (16, 10),
        }
    }
}
impl TryFrom<u8> for Reliability {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Normal),
            2 => Ok(Self::High),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// The next channel of a hopping sequence
///
/// `sequence` selects one of the four hop tables, `channel` is the current
/// channel. Fails on out-of-range indices.
pub fn channel_next_hop(sequence: u8, channel: u8) -> Result<u8, Error> {
    let table = HOP_TABLES.get(sequence as usize).ok_or(Error::InvalidArgument)?;
    table.get(channel as usize).copied().ok_or(Error::InvalidArgument)
}

impl<A, H> Device<A, H>
where
    A: crate::crypto::Aes,
    H: Host,
{
    /// Transmits a packet with the given reliability profile
    ///
    /// Maps the profile to a transmission schedule, grows the transmission
    /// count with the time elapsed since the last UTC synchronisation and
    /// hands the packet to the radio. The radio blocks until all
    /// transmissions are done.
    pub fn sat_send<R>(&mut self, radio: &mut R, packet: &SatPacket, reliability: Reliability) -> Result<(), Error>
    where
        R: SatRadio,
    {
        let (count, interval_s) = reliability.schedule();
        let transmissions = count.saturating_add(self.drift_transmissions(interval_s));
        radio.send(packet, transmissions, interval_s)
    }

    /// Configures the static device identifier of the deprecated protocol
    ///
    /// Only the low 34 bits go on the air. The current protocol derives an
    /// ephemeral identifier from the long-term key instead, so this is only
    /// available with the `sat-protocol-v0` feature.
    #[cfg(feature = "sat-protocol-v0")]
    pub fn sat_static_device_id_set(&mut self, id: u64) -> Result<(), Error> {
        self.static_device_id = id;
        Ok(())
    }

    /// Configures the static device identifier of the deprecated protocol
    ///
    /// The deprecated protocol is not compiled in (`sat-protocol-v0` is
    /// disabled), and the current protocol derives an ephemeral identifier
    /// from the long-term key, so this always fails.
    #[cfg(not(feature = "sat-protocol-v0"))]
    pub fn sat_static_device_id_set(&mut self, _id: u64) -> Result<(), Error> {
        Err(Error::Unsupported)
    }

    /// Additional transmissions to compensate for clock drift
    ///
    /// The local clock drifts by `drift_ppm` against UTC; once the
    /// accumulated drift spans a whole retransmission interval, one more
    /// transmission is appended per interval. Zero when the interval is
    /// zero.
    fn drift_transmissions(&self, interval_s: u8) -> u8 {
        if interval_s == 0 {
            return 0;
        }
        let drift_s =
            (self.since_sync_ms() / 1000).saturating_mul(u64::from(self.drift_ppm())) / 1_000_000;
        let additional = drift_s / u64::from(interval_s);
        additional.min(255) as u8
    }
}
