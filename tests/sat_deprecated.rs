//! Tests the deprecated satellite protocol surface
#![cfg(feature = "aes")]

mod host;

use host::MockHost;
use skywren::{Device128, Error};

/// The 16-byte long-term key shared with the test receivers
pub const KEY: [u8; 16] =
    *b"\xcd\x15\xa5\xab\xc0\x60\xb6\x72\x88\xa6\x1e\x44\xe9\x95\xba\x77";

/// Creates a keyed device
fn device(host: &MockHost) -> Device128<&MockHost> {
    Device128::new(1_000_000_000_000, Some(&KEY), host).expect("cannot create device")
}

/// Without the deprecated protocol, static device ids are unsupported
#[cfg(not(feature = "sat-protocol-v0"))]
#[test]
pub fn static_id_unsupported() {
    let host = MockHost::new();
    let mut device = device(&host);
    assert_eq!(device.sat_static_device_id_set(0x1337), Err(Error::Unsupported), "static id accepted");
}

/// Deprecated packets use the fixed frame tables
#[cfg(feature = "sat-protocol-v0")]
#[test]
pub fn packet_sizes() {
    let host = MockHost::new();
    let mut device = device(&host);
    device.sat_static_device_id_set(0x1337).expect("cannot set static id");

    // (payload length, total symbols)
    let frames = [(0, 24), (4, 32), (11, 44)];
    let payload = [0x42; 11];
    for (len, total) in frames {
        let packet = device.sat_packet_v0(&payload[..len]).expect("cannot build packet");
        assert_eq!(packet.length, total, "invalid packet length for payload {len}");
        assert!(packet.symbols().iter().all(|&symbol| symbol < 64), "symbol out of range");
    }

    // Payloads beyond eleven bytes have no frame
    let err = device.sat_packet_v0(&[0; 12]);
    assert!(matches!(err, Err(Error::InvalidArgument)), "oversized payload accepted");
}

/// The length code is replicated at the three fixed positions
#[cfg(feature = "sat-protocol-v0")]
#[test]
pub fn length_code_positions() {
    let host = MockHost::new();
    let mut device = device(&host);
    device.sat_static_device_id_set(0x1337).expect("cannot set static id");

    let packet = device.sat_packet_v0(&[0xAB; 4]).expect("cannot build packet");
    assert_eq!(packet.data[0], 3, "invalid length code at position 0");
    assert_eq!(packet.data[9], 3, "invalid length code at position 9");
    assert_eq!(packet.data[18], 3, "invalid length code at position 18");
}

/// Channel selection works like the current protocol, without hopping
#[cfg(feature = "sat-protocol-v0")]
#[test]
pub fn channel_selection() {
    let host = MockHost::new();
    host.rand_byte.set(Some(40));
    let mut device = device(&host);
    device.sat_static_device_id_set(0x1337).expect("cannot set static id");

    let packet = device.sat_packet_v0(&[]).expect("cannot build packet");
    assert_eq!(packet.channel, 40 % 19, "invalid channel");

    host.rand_byte.set(None);
    let packet = device.sat_packet_v0(&[]).expect("cannot build packet");
    assert_eq!(packet.channel, 5, "invalid fallback channel");
}
