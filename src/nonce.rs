//! A monitor that refuses reuse of a `(day, sequence)` pair
//!
//! Key and nonce material is derived from the day counter and the sequence
//! number, so emitting two broadcasts with the same pair would reuse a
//! nonce. The monitor assumes an incrementally advancing sequence; wrapping
//! within a day is allowed as long as the sequence does not catch up with
//! the first value used on that day.

/// The largest valid sequence number (10 bits)
pub const MAX_SEQUENCE: u16 = (1 << 10) - 1;

/// Per-day reuse-detection state
///
/// Created with no history; reset implicitly whenever the day counter
/// changes. The check is compiled out without the `nonce-check` feature, in
/// which case every pair is accepted.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NonceMonitor {
    /// The day counter the state below refers to
    day: Option<u32>,
    /// The first sequence number used on this day
    first_seq: u16,
    /// The most recently accepted sequence number
    last_seq: u16,
    /// Whether the sequence has wrapped on this day
    wrapped: bool,
}
impl NonceMonitor {
    /// Creates a monitor with no history
    pub const fn new() -> Self {
        Self { day: None, first_seq: 0, last_seq: 0, wrapped: false }
    }

    /// Checks whether `(day, seq)` is fresh and records it if so
    ///
    /// Returns `true` if the pair has not been used before on this device
    /// and `false` otherwise. Accepted pairs are committed immediately.
    #[cfg(feature = "nonce-check")]
    pub fn check(&mut self, day: u32, seq: u16) -> bool {
        if seq > MAX_SEQUENCE {
            return false;
        }

        // A new day resets the state; any sequence number is valid and
        // becomes the daily reference for wrap detection
        if self.day != Some(day) {
            self.day = Some(day);
            self.first_seq = seq;
            self.last_seq = seq;
            self.wrapped = false;
            return true;
        }

        // Reject repeats, and anything that has lapped the daily reference
        // after a wrap
        if seq == self.last_seq || (self.wrapped && seq >= self.first_seq) {
            return false;
        }

        // A smaller sequence than the last accepted one means it just
        // wrapped; the first value after wrapping must still be below the
        // daily reference
        if seq < self.last_seq {
            self.wrapped = true;
            if seq >= self.first_seq {
                return false;
            }
        }

        self.last_seq = seq;
        true
    }

    /// Checks whether `(day, seq)` is fresh and records it if so
    ///
    /// The `nonce-check` feature is disabled, so this is the identity
    /// predicate: every pair is accepted.
    #[cfg(not(feature = "nonce-check"))]
    pub fn check(&mut self, _day: u32, _seq: u16) -> bool {
        true
    }
}
