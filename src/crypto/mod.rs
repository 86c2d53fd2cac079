//! Cryptographic core shared by the BLE and satellite packet builders

pub mod derive;
pub mod kbkdf;

// Re-export the basic `cipher`-crate as its traits are used in public APIs
pub use cipher;
// Re-export the `aes`-crate if the feature is enabled
#[cfg(feature = "aes")]
pub use aes;

use crate::error::Error;
use cipher::generic_array::typenum::U16;
use cipher::generic_array::GenericArray;
use cipher::{BlockCipher, BlockEncrypt, Key, KeyInit, KeyIvInit, StreamCipher};
use cmac::{Cmac, Mac};
use ctr::Ctr32BE;
use zeroize::Zeroize;

/// A marker trait for raw AES implementations usable as beacon key provider
///
/// The key size of the implementation defines the long-term key length; both
/// 16-byte (AES-128) and 32-byte (AES-256) keys are supported.
///
/// # ⚠️ HAZMAT ⚠️
/// **With this trait, it is possible to inject faulty or incompatible
/// implementations. Faulty or incompatible implementations may result in a
/// total and utter loss of any security.**
pub trait Aes
where
    Self: BlockCipher<BlockSize = U16> + BlockEncrypt + KeyInit + Clone,
{
    // No member functions
}
#[cfg(feature = "aes")]
impl Aes for aes::Aes128 {
    // Nothing to implement here
}
#[cfg(feature = "aes")]
impl Aes for aes::Aes256 {
    // Nothing to implement here
}

/// The length of a derived per-broadcast nonce
pub const NONCE_SIZE: usize = 12;
/// The length of the truncated authentication tag carried in a broadcast
pub const TAG_SIZE: usize = 4;

/// An owned copy of the device's long-term key, erased on drop
pub struct MasterKey<A>
where
    A: Aes,
{
    /// The raw key bytes
    key: Key<A>,
}
impl<A> MasterKey<A>
where
    A: Aes,
{
    /// Copies the given key bytes
    ///
    /// Fails if `key` does not match the provider's key length.
    pub fn new(key: &[u8]) -> Result<Self, Error> {
        let key = Key::<A>::from_exact_iter(key.iter().copied()).ok_or(Error::InvalidArgument)?;
        Ok(Self { key })
    }

    /// The raw key bytes
    pub(crate) fn raw(&self) -> &Key<A> {
        &self.key
    }
}
impl<A> Drop for MasterKey<A>
where
    A: Aes,
{
    fn drop(&mut self) {
        self.key.as_mut_slice().zeroize();
    }
}
impl<A> core::fmt::Debug for MasterKey<A>
where
    A: Aes,
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // Never print key material
        f.debug_struct("MasterKey").finish_non_exhaustive()
    }
}

/// Encrypts `payload` for one broadcast and computes its truncated tag
///
/// Derives the per-broadcast nonce and encryption key for `(day, seq)`,
/// applies AES-CTR with the nonce in the leading 12 bytes of the counter
/// block (the trailing 32 bits start at zero and advance per block), and
/// writes the first four bytes of the CMAC over the ciphertext into `tag`.
/// All intermediate key material is erased before returning.
pub(crate) fn seal<A>(
    master: &Key<A>,
    day: u32,
    seq: u16,
    payload: &[u8],
    ciphertext: &mut [u8],
    tag: &mut [u8; TAG_SIZE],
) -> Result<(), Error>
where
    A: Aes,
{
    debug_assert_eq!(payload.len(), ciphertext.len());
    let nonce = derive::nonce::<A>(master, day, seq)?;
    let mut key = derive::encryption_key::<A>(master, day, seq)?;

    // Build the initial counter block: nonce followed by a zero counter
    let mut block = [0; 16];
    #[allow(clippy::indexing_slicing, reason = "Nonce is shorter than the counter block")]
    block[..NONCE_SIZE].copy_from_slice(&nonce.0);

    // Encrypt the payload in place
    let iv = GenericArray::from_slice(&block);
    let mut ctr: Ctr32BE<A> = Ctr32BE::new(&key, iv);
    ciphertext.copy_from_slice(payload);
    ctr.apply_keystream(ciphertext);

    // Authenticate the ciphertext and truncate the tag
    let mut cmac: Cmac<A> = KeyInit::new(&key);
    cmac.update(ciphertext);
    let mut mac = cmac.finalize().into_bytes();
    #[allow(clippy::indexing_slicing, reason = "MAC is longer than the truncated tag")]
    tag.copy_from_slice(&mac[..TAG_SIZE]);

    // Clear sensitive information
    mac.as_mut_slice().zeroize();
    key.as_mut_slice().zeroize();
    block.zeroize();
    Ok(())
}
