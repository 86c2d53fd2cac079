//! Tests building BLE advertisements against the receiver-shared vectors
#![cfg(feature = "aes")]

mod host;

use host::MockHost;
use skywren::{Device128, Error};

/// The 16-byte long-term key shared with the test receivers
pub const KEY: [u8; 16] =
    *b"\xcd\x15\xa5\xab\xc0\x60\xb6\x72\x88\xa6\x1e\x44\xe9\x95\xba\x77";

/// The day counter period in milliseconds
const DAY_MS: u64 = 86_400_000;

/// Creates a device pinned to the given day and sequence number
fn device(host: &MockHost, day: u64, seq: u16) -> Device128<&MockHost> {
    host.sequence.borrow_mut().push(seq);
    Device128::new(day * DAY_MS, Some(&KEY), host).expect("cannot create device")
}

/// Builds one advertisement and returns the written bytes
fn advertise(day: u64, seq: u16, payload: &[u8]) -> Vec<u8> {
    let host = MockHost::new();
    let mut device = device(&host, day, seq);

    let mut output = [0; 32];
    let written = device.ble_advertise(payload, &mut output).expect("cannot build advertisement");
    output[..written].to_vec()
}

/// The advertisement vectors shared with the backend
#[test]
pub fn vectors() {
    // (day, seq, payload, expected advertisement)
    let vectors: [(u64, u16, &[u8], &[u8]); 10] = [
        (20, 0, b"", b"\xa6\xfc\x00\x00\x60\xdb\x85\x95\x8f\xd7\x43\x9c"),
        (20, 1, b"\xaa", b"\xa6\xfc\x00\x01\x60\xdb\x85\x95\xd2\x1b\xb5\x71\x82"),
        (20, 100, b"Hello", b"\xa6\xfc\x00\x64\x60\xdb\x85\x95\xa2\xa4\xc7\x70\x8a\x6d\xc7\x2a\x6b"),
        (20, 255, b"\xde\xad\xbe\xef", b"\xa6\xfc\x00\xff\x60\xdb\x85\x95\x75\xe6\x93\xea\x75\x6f\x58\x7d"),
        (
            20,
            256,
            b"\x00\x00\x00\x00\x00\x00\x00\x00",
            b"\xa6\xfc\x01\x00\x60\xdb\x85\x95\xff\x87\x32\xc0\x65\x0e\x09\x37\x25\x84\x70\x61",
        ),
        (
            20,
            512,
            b"\xff\xff\xff\xff\xff\xff\xff\xff",
            b"\xa6\xfc\x02\x00\x60\xdb\x85\x95\x8b\x85\x45\x1e\x22\x66\x39\xc4\x3f\x4a\x7c\x5f",
        ),
        (
            20,
            1023,
            b"Hello World!!",
            b"\xa6\xfc\x03\xff\x60\xdb\x85\x95\x8b\x21\x17\x2f\xb4\xb9\x85\x35\x9a\xe4\xce\x1a\xa0\x8b\xe5\xe3\x73",
        ),
        (
            1,
            0,
            b"\x00\x01\x02\x03\x04\x05\x06\x07\x08\x09\x0a\x0b\x0c",
            b"\xa6\xfc\x00\x00\xc9\xf3\x09\xbc\x4b\xeb\x66\xb6\xef\xf3\x09\x0d\xdc\x7b\x38\x94\x93\xf8\x40\x53\x28",
        ),
        (
            1000,
            500,
            b"Test123",
            b"\xa6\xfc\x01\xf4\xa1\x08\x77\x49\x39\x8c\x87\x9d\x3e\xed\xb3\x9f\xb4\xdc\x79",
        ),
        (
            5000,
            42,
            b"\x01\x02\x03\x04\x05\x06\x07\x08\x09\x0a",
            b"\xa6\xfc\x00\x2a\xd6\x1e\xa0\x75\xb2\x34\x5b\xf5\x5f\xb7\x38\x5d\xe0\x56\x94\xce\x4f\x35",
        ),
    ];

    for (day, seq, payload, expected) in vectors {
        let advertisement = advertise(day, seq, payload);
        assert_eq!(advertisement, expected, "invalid advertisement for day {day}, seq {seq}");
    }
}

/// The builder is deterministic for a fixed `(key, day, seq, payload)`
#[test]
pub fn deterministic() {
    let first = advertise(20, 77, b"Testolope");
    let second = advertise(20, 77, b"Testolope");
    assert_eq!(first, second, "builder is not deterministic");
}

/// Output length is always `12 + payload length`, with the UUID up front
#[test]
pub fn length_and_prefix() {
    let payload = [0x5A; 13];
    for len in 0..=13 {
        let advertisement = advertise(20, len as u16, &payload[..len]);
        assert_eq!(advertisement.len(), 12 + len, "invalid advertisement length");
        assert_eq!(&advertisement[..2], b"\xa6\xfc", "invalid service UUID prefix");
    }
}

/// Oversized payloads and undersized output buffers are rejected
#[test]
pub fn invalid_arguments() {
    let host = MockHost::new();
    let mut device = device(&host, 20, 0);

    let mut output = [0; 32];
    let err = device.ble_advertise(&[0; 14], &mut output);
    assert_eq!(err, Err(Error::InvalidArgument), "oversized payload accepted");

    let mut small = [0; 12];
    let err = device.ble_advertise(&[0; 4], &mut small);
    assert_eq!(err, Err(Error::InvalidArgument), "undersized buffer accepted");
}

/// Building without a key fails
#[test]
pub fn key_not_set() {
    let host = MockHost::new();
    let mut device = Device128::new(20 * DAY_MS, None, &host).expect("cannot create device");

    let mut output = [0; 32];
    let err = device.ble_advertise(b"", &mut output);
    assert_eq!(err, Err(Error::KeyNotSet), "missing key not detected");

    // A wrong-sized key is rejected and leaves the device without a key
    let err = device.key_set(&[0; 15]);
    assert_eq!(err, Err(Error::InvalidArgument), "wrong-sized key accepted");
    let err = device.ble_advertise(b"", &mut output);
    assert_eq!(err, Err(Error::KeyNotSet), "missing key not detected");

    // Setting a proper key makes the builder work
    device.key_set(&KEY).expect("cannot set key");
    device.ble_advertise(b"", &mut output).expect("cannot build advertisement");
}
