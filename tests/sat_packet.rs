//! Tests building satellite packets
#![cfg(feature = "aes")]

mod host;

use host::MockHost;
use skywren::sat::whiten::Whitener;
use skywren::sat::{self, SatPacket};
use skywren::{Device128, Error};

/// The 16-byte long-term key shared with the test receivers
pub const KEY: [u8; 16] =
    *b"\xcd\x15\xa5\xab\xc0\x60\xb6\x72\x88\xa6\x1e\x44\xe9\x95\xba\x77";

/// The day counter period in milliseconds
const DAY_MS: u64 = 86_400_000;

/// Creates a keyed device on day 20
fn device(host: &MockHost) -> Device128<&MockHost> {
    Device128::new(20 * DAY_MS, Some(&KEY), host).expect("cannot create device")
}

/// Packet sizes for every valid payload length
#[test]
pub fn packet_sizes() {
    // (payload length, payload symbols, parity symbols)
    let frames = [(0, 13, 10), (4, 18, 12), (9, 25, 14), (13, 30, 16)];
    let payload = [0x42; 13];

    let host = MockHost::new();
    let mut device = device(&host);
    for (len, symbols, parity) in frames {
        let packet = device.sat_packet(&payload[..len]).expect("cannot build packet");
        assert_eq!(packet.length, 6 + symbols + parity, "invalid packet length for payload {len}");
        assert_eq!(packet.symbols().len(), packet.length, "symbol slice disagrees with length");

        // Every symbol is six bits wide
        assert!(packet.symbols().iter().all(|&symbol| symbol < 64), "symbol out of range");
    }
}

/// Only payload lengths 0, 4, 9 and 13 have a frame
#[test]
pub fn invalid_payload_lengths() {
    let host = MockHost::new();
    let mut device = device(&host);

    let payload = [0; 14];
    for len in [1, 2, 3, 5, 8, 10, 12, 14] {
        let err = device.sat_packet(&payload[..len]);
        assert!(matches!(err, Err(Error::InvalidArgument)), "invalid payload length {len} accepted");
    }
}

/// Channel and hopping sequence come from the same random byte
#[test]
pub fn channel_selection() {
    let host = MockHost::new();
    host.rand_byte.set(Some(40));
    let mut device = device(&host);

    let packet = device.sat_packet(&[]).expect("cannot build packet");
    assert_eq!(packet.channel, 40 % 19, "invalid channel");
    assert_eq!(packet.hopping_sequence, 40 % 4, "invalid hopping sequence");

    // A failing RNG falls back to the default channel
    host.rand_byte.set(None);
    let packet = device.sat_packet(&[]).expect("cannot build packet");
    assert_eq!(packet.channel, 5, "invalid fallback channel");
    assert_eq!(packet.hopping_sequence, 1, "invalid fallback hopping sequence");
}

/// The physical header carries version, size code, hop index and channel
#[test]
pub fn header_symbols() {
    let host = MockHost::new();
    host.rand_byte.set(Some(40));
    let mut device = device(&host);

    // Version 1, size code 0b00, hopping 0b00, channel 2 packs into the
    // bit string 000100 000010
    let packet = device.sat_packet(&[]).expect("cannot build packet");
    assert_eq!(packet.data[0], 0b000100, "invalid first header symbol");
    assert_eq!(packet.data[1], 0b000010, "invalid second header symbol");

    // Size code 0b11 for the largest frame
    let packet = device.sat_packet(&[0; 13]).expect("cannot build packet");
    assert_eq!(packet.data[0], 0b000111, "invalid first header symbol");
}

/// Whitening with the same seed is an involution
#[test]
pub fn whitening_self_inverse() {
    let mut symbols: Vec<u8> = (0..46u8).map(|i| (i * 5 + 1) % 64).collect();
    let original = symbols.clone();

    let mut whitener = Whitener::new(7);
    whitener.apply(&mut symbols);
    assert_ne!(symbols, original, "whitening is a no-op");

    let mut whitener = Whitener::new(7);
    whitener.apply(&mut symbols);
    assert_eq!(symbols, original, "whitening is not self-inverse");
}

/// The builder rejects reused sequence numbers and a missing key
#[test]
pub fn guards() {
    let host = MockHost::with_sequence(&[9, 9]);
    let mut device = device(&host);
    device.sat_packet(&[]).expect("cannot build packet");
    let err = device.sat_packet(&[]);
    assert!(matches!(err, Err(Error::NonceReuse)), "nonce reuse accepted");

    let host = MockHost::new();
    let mut unkeyed = Device128::new(20 * DAY_MS, None, &host).expect("cannot create device");
    let err = unkeyed.sat_packet(&[]);
    assert!(matches!(err, Err(Error::KeyNotSet)), "missing key not detected");
}

/// The hop tables are permutations and indices are validated
#[test]
pub fn channel_hopping() {
    for sequence in 0..4u8 {
        let mut seen = [false; 19];
        for channel in 0..19u8 {
            let next = sat::channel_next_hop(sequence, channel).expect("cannot look up hop");
            assert!(next < 19, "hop target out of range");
            assert!(!seen[next as usize], "hop table is not a permutation");
            seen[next as usize] = true;
        }
    }

    assert!(sat::channel_next_hop(4, 0).is_err(), "invalid sequence accepted");
    assert!(sat::channel_next_hop(0, 19).is_err(), "invalid channel accepted");
}

/// Packets from identical state are identical, and the default packet is empty
#[test]
pub fn determinism() {
    let build = || {
        let host = MockHost::with_sequence(&[3]);
        host.rand_byte.set(Some(11));
        let mut device = device(&host);
        device.sat_packet(b"\xde\xad\xbe\xef").expect("cannot build packet")
    };

    let first = build();
    let second = build();
    assert_eq!(first.symbols(), second.symbols(), "builder is not deterministic");
    assert_eq!(first.channel, second.channel, "channel is not deterministic");

    assert_eq!(SatPacket::default().symbols().len(), 0, "default packet is not empty");
}
