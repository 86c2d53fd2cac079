//! The BLE advertisement builder
//!
//! Builds the service-data payload of a non-connectable advertisement. The
//! outer advertisement framing (AD length/type bytes and the 16-bit service
//! class UUID list) is added by the BLE stack; the bytes produced here go
//! into a Service Data - 16 bit UUID field (AD type `0x16`).

use crate::crypto::{self, derive, TAG_SIZE};
use crate::device::Device;
use crate::error::Error;
use crate::host::Host;

/// The reserved 16-bit service UUID carried in every advertisement
pub const SERVICE_UUID: u16 = 0xFCA6;

/// The maximum payload length in bytes
pub const MAX_PAYLOAD: usize = 13;

/// The fixed advertisement overhead preceding the ciphertext
///
/// Two UUID bytes, the version/sequence word, the four-byte ephemeral device
/// id and the four-byte truncated authentication tag.
pub const OVERHEAD: usize = 12;

/// The wire protocol version (upper six bits of the version/sequence word)
const PROTOCOL_VERSION: u8 = 0b0000_0000;

impl<A, H> Device<A, H>
where
    A: crypto::Aes,
    H: Host,
{
    /// Builds one BLE service-data blob from `payload` into `output`
    ///
    /// Returns the number of bytes written (`12 + payload.len()`). Fails if
    /// no key is set, the payload exceeds [`MAX_PAYLOAD`], the output buffer
    /// is too small, or emitting the broadcast would reuse a
    /// `(day, sequence)` pair.
    ///
    /// This function is neither reentrant nor thread-safe: it advances the
    /// sequence counter and the nonce monitor. The caller must ensure proper
    /// synchronisation.
    pub fn ble_advertise(&mut self, payload: &[u8], output: &mut [u8]) -> Result<usize, Error> {
        if self.key.is_none() {
            return Err(Error::KeyNotSet);
        }
        if payload.len() > MAX_PAYLOAD {
            return Err(Error::InvalidArgument);
        }
        let total = OVERHEAD + payload.len();
        let Some(output) = output.get_mut(..total) else {
            // The output buffer cannot hold the advertisement
            return Err(Error::InvalidArgument);
        };

        let seq = self.next_sequence();
        let day = self.day_counter();
        if !self.monitor.check(day, seq) {
            #[cfg(feature = "defmt")]
            defmt::warn!("re-using the same nonce is insecure");
            return Err(Error::NonceReuse);
        }

        let master = match self.key.as_ref() {
            Some(key) => key.raw(),
            None => return Err(Error::KeyNotSet),
        };

        // Service UUID, little-endian
        let (header, ciphertext) = output.split_at_mut(OVERHEAD);
        #[allow(clippy::indexing_slicing, reason = "The header is exactly the overhead size")]
        {
            header[..2].copy_from_slice(&SERVICE_UUID.to_le_bytes());

            // Version/sequence word and the daily ephemeral device id
            let device_id = derive::device_id::<A>(master, day)?;
            header[2] = PROTOCOL_VERSION | ((seq >> 8) & 0x03) as u8;
            header[3] = (seq & 0xFF) as u8;
            header[4..8].copy_from_slice(&device_id);

            // Encrypt the payload and append the truncated tag
            let mut tag = [0; TAG_SIZE];
            crypto::seal::<A>(master, day, seq, payload, ciphertext, &mut tag)?;
            header[8..12].copy_from_slice(&tag);
        }
        Ok(total)
    }
}
