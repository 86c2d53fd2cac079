//! A counter-mode key-based key-derivation function (NIST SP800-108) with an
//! AES-CMAC PRF

use crate::crypto::Aes;
use crate::error::Error;
use cipher::Key;
use cmac::{Cmac, Mac};
use zeroize::Zeroize;

/// The fixed size of the KDF message buffer
///
/// Label and context must fit into this buffer together with the four-byte
/// counter, the separation byte and the four-byte output length; larger
/// inputs are an input error.
const MESSAGE_SIZE: usize = 64;

/// The PRF output width (one AES-CMAC block)
const PRF_SIZE: usize = 16;

/// Derives `output.len()` bytes from `key` under the given label and context
///
/// The PRF input for block `i` (counted from 1) is
/// `BE32(i) || label || 0x00 || context || BE32(output_bits)`, and the
/// output is the concatenation of the PRF blocks, truncated to the requested
/// length. Both the message buffer and the PRF block are erased on every
/// exit path.
pub fn derive<A>(key: &Key<A>, label: &[u8], context: &[u8], output: &mut [u8]) -> Result<(), Error>
where
    A: Aes,
{
    let mut message = [0; MESSAGE_SIZE];
    let result = derive_into::<A>(key, label, context, output, &mut message);

    // Clear sensitive information
    message.zeroize();
    result
}

/// The KDF loop, operating on the caller-provided message buffer
fn derive_into<A>(
    key: &Key<A>,
    label: &[u8],
    context: &[u8],
    output: &mut [u8],
    message: &mut [u8; MESSAGE_SIZE],
) -> Result<(), Error>
where
    A: Aes,
{
    // Message format: Counter + Label + Separator + Context + Length (in bits)
    let message_len = (4 + 1 + 4_usize).saturating_add(label.len()).saturating_add(context.len());
    if message_len >= MESSAGE_SIZE {
        // The label/context combination does not fit the message buffer
        return Err(Error::InvalidArgument);
    }

    // Assemble the static part of the message; the separation byte after the
    // label stays zero
    let length_bits = u32::try_from(output.len()).map_err(|_| Error::InvalidArgument)?.saturating_mul(8);
    #[allow(clippy::indexing_slicing, reason = "Offsets are bounded by the message length check")]
    {
        message[4..4 + label.len()].copy_from_slice(label);
        message[5 + label.len()..5 + label.len() + context.len()].copy_from_slice(context);
        message[message_len - 4..message_len].copy_from_slice(&length_bits.to_be_bytes());
    }

    // Produce the output block by block
    let mut counter: u32 = 1;
    for chunk in output.chunks_mut(PRF_SIZE) {
        #[allow(clippy::indexing_slicing, reason = "The counter occupies the first message bytes")]
        message[..4].copy_from_slice(&counter.to_be_bytes());

        // Perform AES-CMAC with the key and the prepared message
        let mut prf: Cmac<A> = Cmac::new(key);
        #[allow(clippy::indexing_slicing, reason = "Message length is within the buffer")]
        prf.update(&message[..message_len]);
        let mut block = prf.finalize().into_bytes();

        // Copy the output and clear the block
        #[allow(clippy::indexing_slicing, reason = "Chunks are at most one PRF block long")]
        chunk.copy_from_slice(&block[..chunk.len()]);
        block.as_mut_slice().zeroize();
        counter = counter.saturating_add(1);
    }
    Ok(())
}
