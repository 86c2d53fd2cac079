//! Error types shared by all beacon builders

use core::fmt::{self, Display, Formatter};

/// An error raised by a beacon operation
///
/// All operations are synchronous and fallible; an error always refers to the
/// failing invocation only and is never retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An argument is out of range, or an output buffer is too small
    InvalidArgument,
    /// Building the broadcast would reuse a (day, sequence) pair
    ///
    /// This is fatal for the current invocation only; the caller may retry
    /// once the sequence counter has advanced.
    NonceReuse,
    /// No long-term key has been configured yet
    KeyNotSet,
    /// The operation is not available with the compiled protocol selection
    Unsupported,
    /// The underlying cryptographic provider reported a failure
    Crypto,
}
impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument or undersized buffer"),
            Self::NonceReuse => write!(f, "(day, sequence) pair has already been used"),
            Self::KeyNotSet => write!(f, "long-term key is not set"),
            Self::Unsupported => write!(f, "operation is not supported by this build"),
            Self::Crypto => write!(f, "cryptographic provider failure"),
        }
    }
}
impl core::error::Error for Error {
    // Nothing to implement here
}
