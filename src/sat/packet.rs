//! The satellite packet builder (protocol v1)
//!
//! A packet starts with a six-symbol physical header (two header symbols
//! plus four Reed–Solomon parity symbols) followed by the sealed payload
//! block. The payload block carries the protocol version, the sequence
//! number, the daily ephemeral device id, the truncated authentication tag
//! and the AES-CTR ciphertext, expanded to six-bit symbols, Reed–Solomon
//! protected and whitened with a channel-seeded LFSR.

use crate::bitarray::BitArray;
use crate::crypto::{self, derive, TAG_SIZE};
use crate::device::Device;
use crate::error::Error;
use crate::host::Host;
use crate::sat::rs::{self, ReedSolomon};
use crate::sat::whiten::Whitener;
use crate::sat::{SatPacket, DEFAULT_CHANNEL, MAX_SYMBOLS, NUM_CHANNELS, NUM_HOPPING_SEQUENCES};

/// The physical-layer protocol version (four header bits)
const PHY_PROTOCOL_VERSION: u8 = 1;

/// The number of physical header symbols before parity
const PHY_SYMBOLS: usize = 2;

/// The number of parity symbols protecting the physical header
const PHY_PARITY: usize = 4;

/// The payload-layer protocol version (two payload bits)
const PAYLOAD_PROTOCOL_VERSION: u8 = 0;

/// The number of bits carrying the sequence number
const SEQUENCE_BITS: usize = 10;

/// The number of bits carrying the ephemeral device id
const DEVICE_ID_BITS: usize = 32;

/// The number of bits carrying the authentication tag
const AUTH_TAG_BITS: usize = 32;

/// The maximum payload length in bytes
pub const MAX_PAYLOAD: usize = 13;

/// The framing parameters for a valid payload length
///
/// Returns `(payload symbols, size code, parity symbols)`. Only lengths
/// 0, 4, 9 and 13 have a frame.
const fn frame_parameters(len: usize) -> Option<(usize, u8, usize)> {
    match len {
        0 => Some((13, 0b00, 10)),
        4 => Some((18, 0b01, 12)),
        9 => Some((25, 0b10, 14)),
        13 => Some((30, 0b11, 16)),
        _ => None,
    }
}

impl<A, H> Device<A, H>
where
    A: crypto::Aes,
    H: Host,
{
    /// Builds a satellite packet from `payload`
    ///
    /// The payload length must be 0, 4, 9 or 13 bytes. Fails if no key is
    /// set or emitting the packet would reuse a `(day, sequence)` pair.
    /// Consumes one sequence number per successful nonce check.
    pub fn sat_packet(&mut self, payload: &[u8]) -> Result<SatPacket, Error> {
        if self.key.is_none() {
            #[cfg(feature = "defmt")]
            defmt::warn!("key not set");
            return Err(Error::KeyNotSet);
        }
        let Some((payload_symbols, size_code, parity_symbols)) = frame_parameters(payload.len()) else {
            return Err(Error::InvalidArgument);
        };

        let seq = self.next_sequence();
        let day = self.day_counter();
        if !self.monitor.check(day, seq) {
            #[cfg(feature = "defmt")]
            defmt::warn!("re-using the same nonce is insecure");
            return Err(Error::NonceReuse);
        }

        // Pick a random channel; both the channel and the hopping sequence
        // come from the same byte
        let mut random = [0; 1];
        let random = match self.host.rand(&mut random) {
            Ok(()) => random[0],
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("could not pick a random channel");
                DEFAULT_CHANNEL
            }
        };
        let channel = random % NUM_CHANNELS;
        let hopping_sequence = random % NUM_HOPPING_SEQUENCES;

        let mut packet =
            SatPacket { data: [0; MAX_SYMBOLS], length: 0, channel, hopping_sequence };
        let mut symbols = [0; MAX_SYMBOLS];
        let mut parity = [0; rs::MAX_PARITY];

        // Physical header: version, payload-size code, hopping sequence and
        // channel, then four parity symbols
        let mut bits = BitArray::new();
        bits.append(&[PHY_PROTOCOL_VERSION], 4)?;
        bits.append(&[size_code], 2)?;
        bits.append(&[hopping_sequence], 2)?;
        bits.append(&[channel], 4)?;
        let header_len = bits.symbols(&mut symbols)?;
        debug_assert_eq!(header_len, PHY_SYMBOLS);

        let encoder = ReedSolomon::new(PHY_PARITY / 2)?;
        #[allow(clippy::indexing_slicing, reason = "Header and parity fit the packet buffer")]
        {
            encoder.encode(&symbols[..header_len], &mut parity)?;
            packet.data[..header_len].copy_from_slice(&symbols[..header_len]);
            packet.data[header_len..header_len + PHY_PARITY].copy_from_slice(&parity[..PHY_PARITY]);
        }
        packet.length = header_len + PHY_PARITY;

        // Payload block: seal the payload and pack the fields
        let master = match self.key.as_ref() {
            Some(key) => key.raw(),
            None => return Err(Error::KeyNotSet),
        };
        let device_id = derive::device_id::<A>(master, day)?;
        let mut ciphertext = [0; MAX_PAYLOAD];
        let Some(ciphertext) = ciphertext.get_mut(..payload.len()) else {
            return Err(Error::InvalidArgument);
        };
        let mut tag = [0; TAG_SIZE];
        crypto::seal::<A>(master, day, seq, payload, ciphertext, &mut tag)?;

        let mut bits = BitArray::new();
        bits.append(&[PAYLOAD_PROTOCOL_VERSION], 2)?;
        bits.append(&seq.to_le_bytes(), SEQUENCE_BITS)?;
        bits.append(&device_id, DEVICE_ID_BITS)?;
        bits.append(&tag, AUTH_TAG_BITS)?;
        bits.append(ciphertext, payload.len() * 8)?;
        let count = bits.symbols(&mut symbols)?;
        debug_assert_eq!(count, payload_symbols);

        // Parity is appended before whitening: the LFSR state runs
        // continuously across payload and parity symbols
        let encoder = ReedSolomon::new(parity_symbols / 2)?;
        #[allow(clippy::indexing_slicing, reason = "Symbol counts are bounded by the frame tables")]
        {
            encoder.encode(&symbols[..count], &mut parity)?;
            symbols[count..count + parity_symbols].copy_from_slice(&parity[..parity_symbols]);

            let mut whitener = Whitener::new(packet.channel);
            whitener.apply(&mut symbols[..count + parity_symbols]);

            packet.data[packet.length..packet.length + count + parity_symbols]
                .copy_from_slice(&symbols[..count + parity_symbols]);
        }
        packet.length += count + parity_symbols;

        Ok(packet)
    }
}
