//! A systematic Reed–Solomon encoder over GF(2^6)
//!
//! The satellite frame protects its six-bit symbols with parity symbols from
//! a Reed–Solomon code over GF(64) with primitive polynomial
//! `x^6 + x + 1`. The generator polynomial is `∏ (x − α^i)` for
//! `i = 1..=2t`. Encoding is systematic: the codeword is the data followed
//! by `2t` parity symbols.

use crate::error::Error;

/// The number of non-zero field elements
const FIELD: usize = 63;

/// The maximum number of parity symbols (`t = 8`)
pub const MAX_PARITY: usize = 16;

/// The log/antilog tables of GF(64), built from `x^6 + x + 1`
const fn gf_tables() -> ([u8; FIELD], [u8; FIELD + 1]) {
    let mut alpha_to = [0; FIELD];
    let mut index_of = [0; FIELD + 1];
    let mut x: u8 = 1;
    let mut i = 0;
    while i < FIELD {
        alpha_to[i] = x;
        index_of[x as usize] = i as u8;

        // Multiply by alpha; x^6 reduces to x + 1
        x <<= 1;
        if x & 0x40 != 0 {
            x = (x & 0x3F) ^ 0x03;
        }
        i += 1;
    }
    (alpha_to, index_of)
}

/// Antilog table: `ALPHA_TO[i] = α^i`
const ALPHA_TO: [u8; FIELD] = gf_tables().0;
/// Log table: `INDEX_OF[α^i] = i`; entry 0 is unused
const INDEX_OF: [u8; FIELD + 1] = gf_tables().1;

/// Multiplies two field elements
const fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    ALPHA_TO[(INDEX_OF[a as usize] as usize + INDEX_OF[b as usize] as usize) % FIELD]
}

/// A Reed–Solomon encoder for a fixed error-correction capability
#[derive(Debug, Clone, Copy)]
pub struct ReedSolomon {
    /// The generator polynomial coefficients, `gen[i]` for `x^i`
    gen: [u8; MAX_PARITY + 1],
    /// The number of parity symbols (`2t`)
    parity: usize,
}
impl ReedSolomon {
    /// Creates an encoder that appends `2t` parity symbols
    ///
    /// `t` is the number of correctable symbol errors and must be in
    /// `[1, 8]`.
    pub fn new(t: usize) -> Result<Self, Error> {
        if t == 0 || t * 2 > MAX_PARITY {
            return Err(Error::InvalidArgument);
        }

        // Build the generator polynomial by multiplying in one root at a
        // time, starting from the constant polynomial 1
        let mut gen = [0; MAX_PARITY + 1];
        gen[0] = 1;
        #[allow(clippy::indexing_slicing, reason = "Degrees are bounded by MAX_PARITY")]
        for degree in 1..=t * 2 {
            let root = ALPHA_TO[degree % FIELD];
            for j in (1..=degree).rev() {
                gen[j] = gen[j - 1] ^ gf_mul(root, gen[j]);
            }
            gen[0] = gf_mul(root, gen[0]);
        }
        Ok(Self { gen, parity: t * 2 })
    }

    /// The number of parity symbols this encoder appends
    pub const fn parity_len(&self) -> usize {
        self.parity
    }

    /// Computes the parity symbols for `data`
    ///
    /// `data` symbols are processed in transmission order; the parity is
    /// written to `parity` in transmission order as well, so the on-air
    /// codeword is `data || parity`. Fails if the codeword would exceed the
    /// field size or the parity buffer is too small.
    pub fn encode(&self, data: &[u8], parity: &mut [u8]) -> Result<(), Error> {
        if data.len() + self.parity > FIELD || parity.len() < self.parity {
            return Err(Error::InvalidArgument);
        }

        // Polynomial division by the generator; the remainder is the parity
        let mut reg = [0; MAX_PARITY];
        #[allow(clippy::indexing_slicing, reason = "Register and generator are parity-sized")]
        for &symbol in data {
            let feedback = symbol ^ reg[self.parity - 1];
            for j in (1..self.parity).rev() {
                reg[j] = reg[j - 1] ^ gf_mul(self.gen[j], feedback);
            }
            reg[0] = gf_mul(self.gen[0], feedback);
        }

        // Highest-degree coefficient is transmitted first
        #[allow(clippy::indexing_slicing, reason = "The parity buffer length is checked above")]
        for (i, out) in parity[..self.parity].iter_mut().enumerate() {
            *out = reg[self.parity - 1 - i];
        }
        Ok(())
    }
}
