//! Two-stage derivation of per-broadcast values from the long-term key
//!
//! Stage one stretches the long-term key into a per-day subkey; stage two
//! derives the per-broadcast value from that subkey. Contexts are the ASCII
//! decimal representations of the day counter and the sequence number.

use crate::crypto::{kbkdf, Aes, NONCE_SIZE};
use crate::error::Error;
use cipher::Key;
use zeroize::Zeroize;

/// The size of the formatted context buffer (enough for any `u32`)
const CONTEXT_SIZE: usize = 12;

/// The length of the ephemeral device identifier
pub const DEVICE_ID_SIZE: usize = 4;

/// A derived per-broadcast nonce, erased on drop
pub struct Nonce(pub(crate) [u8; NONCE_SIZE]);
impl Drop for Nonce {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
impl core::fmt::Debug for Nonce {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // Never print nonce material
        f.debug_struct("Nonce").finish_non_exhaustive()
    }
}

/// Formats `value` as ASCII decimal into `buf` and returns the digits
#[allow(clippy::indexing_slicing, reason = "A u32 has at most ten decimal digits")]
fn decimal(buf: &mut [u8; CONTEXT_SIZE], mut value: u32) -> &[u8] {
    let mut pos = CONTEXT_SIZE;
    loop {
        pos -= 1;
        buf[pos] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    &buf[pos..]
}

/// Derives the per-day subkey for the given stage-one label
fn subkey<A>(master: &Key<A>, label: &[u8], day: u32) -> Result<Key<A>, Error>
where
    A: Aes,
{
    let mut context = [0; CONTEXT_SIZE];
    let context = decimal(&mut context, day);

    let mut subkey = Key::<A>::default();
    kbkdf::derive::<A>(master, label, context, subkey.as_mut_slice())?;
    Ok(subkey)
}

/// Runs both derivation stages for one labelled value
fn derived_value<A>(
    master: &Key<A>,
    key_label: &[u8],
    value_label: &[u8],
    day: u32,
    seq: u16,
    output: &mut [u8],
) -> Result<(), Error>
where
    A: Aes,
{
    let mut subkey = subkey::<A>(master, key_label, day)?;
    let mut context = [0; CONTEXT_SIZE];
    let context = decimal(&mut context, u32::from(seq));

    let result = kbkdf::derive::<A>(&subkey, value_label, context, output);

    // Clear sensitive information
    subkey.as_mut_slice().zeroize();
    result
}

/// The ephemeral device identifier for the given day
///
/// Rotates daily, not per broadcast: the second derivation stage always runs
/// with sequence number zero. The four bytes are an opaque token; they carry
/// no internal structure and must not be reinterpreted.
pub fn device_id<A>(master: &Key<A>, day: u32) -> Result<[u8; DEVICE_ID_SIZE], Error>
where
    A: Aes,
{
    let mut id = [0; DEVICE_ID_SIZE];
    derived_value::<A>(master, b"DeviceKey", b"DeviceID", day, 0, &mut id)?;
    Ok(id)
}

/// The AES-CTR nonce for the given `(day, seq)` broadcast
pub fn nonce<A>(master: &Key<A>, day: u32, seq: u16) -> Result<Nonce, Error>
where
    A: Aes,
{
    let mut nonce = Nonce([0; NONCE_SIZE]);
    derived_value::<A>(master, b"NonceKey", b"Nonce", day, seq, &mut nonce.0)?;
    Ok(nonce)
}

/// The one-shot encryption key for the given `(day, seq)` broadcast
///
/// The caller is responsible for erasing the returned key after use.
pub fn encryption_key<A>(master: &Key<A>, day: u32, seq: u16) -> Result<Key<A>, Error>
where
    A: Aes,
{
    let mut key = Key::<A>::default();
    let result = derived_value::<A>(master, b"EncryptionKey", b"Key", day, seq, key.as_mut_slice());
    match result {
        Ok(()) => Ok(key),
        Err(e) => {
            key.as_mut_slice().zeroize();
            Err(e)
        }
    }
}
