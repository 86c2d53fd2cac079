#![doc = include_str!("../README.md")]
#![no_std]
// Clippy lints
#![warn(clippy::large_stack_arrays)]
#![warn(clippy::arithmetic_side_effects)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::indexing_slicing)]
#![warn(clippy::panic)]
#![warn(clippy::todo)]
#![warn(clippy::unimplemented)]
#![warn(clippy::unreachable)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::allow_attributes_without_reason)]
#![warn(clippy::cognitive_complexity)]

pub mod ble;
pub mod bitarray;
pub mod crypto;
pub mod device;
pub mod error;
pub mod host;
pub mod nonce;
pub mod sat;

pub use crate::device::Device;
pub use crate::error::Error;
pub use crate::host::{Host, SatRadio};

/// A device emitting beacons keyed with AES-128 (16-byte long-term key)
#[cfg(feature = "aes")]
pub type Device128<Host> = Device<aes::Aes128, Host>;

/// A device emitting beacons keyed with AES-256 (32-byte long-term key)
#[cfg(feature = "aes")]
pub type Device256<Host> = Device<aes::Aes256, Host>;
