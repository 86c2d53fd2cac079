//! The deprecated satellite packet builder (protocol v0)
//!
//! The first protocol generation carries a caller-configured 34-bit static
//! device identifier instead of the derived ephemeral id and does not run
//! the key-derivation or sealing machinery. The packet is padded to one of
//! eight frame sizes, Reed–Solomon protected and carries its length code
//! replicated at three fixed positions. There is no whitening.

use crate::bitarray::BitArray;
use crate::crypto::Aes;
use crate::device::Device;
use crate::error::Error;
use crate::host::Host;
use crate::sat::rs::{self, ReedSolomon};
use crate::sat::{SatPacket, DEFAULT_CHANNEL, MAX_SYMBOLS, NUM_CHANNELS};

/// The number of bits carrying the static device id
const DEVICE_ID_BITS: usize = 34;

/// The number of bits carrying the sequence number
const SEQUENCE_BITS: usize = 10;

/// The number of bits reserved for the (zero) authentication tag
const AUTH_TAG_BITS: usize = 16;

/// The fixed header size in symbols (device id, tag and sequence number)
const HEADER_SYMBOLS: usize = 10;

/// The positions carrying the replicated length-code symbol
const LENGTH_POSITIONS: [usize; 3] = [0, 9, 18];

/// Frame sizes in data symbols, by length code
const FRAME_SYMBOLS: [usize; 8] = [11, 13, 15, 17, 19, 21, 23, 25];
/// Parity symbols, by length code
const PARITY_SYMBOLS: [usize; 8] = [10, 10, 12, 12, 14, 14, 16, 16];
/// Total packet sizes in symbols, by length code
const TOTAL_SYMBOLS: [usize; 8] = [24, 26, 30, 32, 36, 38, 42, 44];

/// The maximum payload length in bytes
pub const MAX_PAYLOAD: usize = (FRAME_SYMBOLS[7] - HEADER_SYMBOLS) * 6 / 8;

/// The smallest length code whose frame holds `symbols` data symbols
fn length_code(symbols: usize) -> Result<usize, Error> {
    FRAME_SYMBOLS.iter().position(|&frame| symbols <= frame).ok_or(Error::InvalidArgument)
}

impl<A, H> Device<A, H>
where
    A: Aes,
    H: Host,
{
    /// Builds a deprecated-protocol satellite packet from `payload`
    ///
    /// Uses the static device id configured via
    /// [`sat_static_device_id_set`](Self::sat_static_device_id_set) and a
    /// private sequence counter. The payload may be up to eleven bytes.
    pub fn sat_packet_v0(&mut self, payload: &[u8]) -> Result<SatPacket, Error> {
        if payload.len() > MAX_PAYLOAD {
            return Err(Error::InvalidArgument);
        }

        // Pack the fixed header and the payload
        let mut bits = BitArray::new();
        bits.append(&self.static_device_id.to_le_bytes(), DEVICE_ID_BITS)?;
        bits.append(&self.v0_sequence.to_le_bytes(), SEQUENCE_BITS)?;
        self.v0_sequence = self.v0_sequence.wrapping_add(1);
        bits.append(&[0, 0], AUTH_TAG_BITS)?;
        bits.append(payload, payload.len() * 8)?;

        // Alignment bit, then zero bits up to the next symbol boundary
        bits.append(&[1], 1)?;
        bits.append(&[0], 6 - (bits.len() % 6))?;

        // Pad with zero symbols up to the next frame size
        let mut symbol_count = bits.len() / 6;
        let code = length_code(symbol_count)?;
        #[allow(clippy::indexing_slicing, reason = "The length code indexes the fixed tables")]
        let (frame, parity_count, total) = (FRAME_SYMBOLS[code], PARITY_SYMBOLS[code], TOTAL_SYMBOLS[code]);
        while symbol_count < frame {
            bits.append(&[0], 6)?;
            symbol_count += 1;
        }

        let mut symbols = [0; MAX_SYMBOLS];
        let count = bits.symbols(&mut symbols)?;
        debug_assert_eq!(count, frame);

        // Generate the error-control symbols
        let encoder = ReedSolomon::new(parity_count / 2)?;
        let mut parity = [0; rs::MAX_PARITY];
        #[allow(clippy::indexing_slicing, reason = "Symbol counts are bounded by the frame tables")]
        encoder.encode(&symbols[..count], &mut parity)?;

        // Interleave the length code with data and parity symbols
        let mut packet = SatPacket { data: [0; MAX_SYMBOLS], length: total, channel: 0, hopping_sequence: 0 };
        let mut data_index = 0;
        let mut parity_index = 0;
        #[allow(clippy::indexing_slicing, reason = "All indices are bounded by the total size")]
        for position in 0..total {
            if LENGTH_POSITIONS.contains(&position) {
                packet.data[position] = code as u8;
            } else if data_index < frame {
                packet.data[position] = symbols[data_index];
                data_index += 1;
            } else {
                packet.data[position] = parity[parity_index];
                parity_index += 1;
            }
        }

        // Pick a random transmission channel
        let mut random = [0; 1];
        packet.channel = match self.host.rand(&mut random) {
            Ok(()) => random[0] % NUM_CHANNELS,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("could not get a random channel, falling back to the default channel");
                DEFAULT_CHANNEL
            }
        };

        Ok(packet)
    }
}
