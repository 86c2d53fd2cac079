//! Tests the bit array and the six-bit symbol packer

use skywren::bitarray::BitArray;
use skywren::Error;

/// Appending past the capacity fails
#[test]
pub fn overflow() {
    let mut bits = BitArray::new();
    let data = [0x0F];

    for _ in 0..(77 * 8) - 1 {
        bits.append(&data, 1).expect("cannot append bit");
    }

    // Ok, any attempt to append more data should fail
    assert_eq!(bits.append(&data, 8), Err(Error::InvalidArgument), "overflow not detected");
}

/// Out-of-range bit accesses fail
#[test]
pub fn invalid_access() {
    let mut bits = BitArray::new();

    assert_eq!(bits.get(1), Err(Error::InvalidArgument), "out-of-range read accepted");
    assert_eq!(bits.get(usize::MAX), Err(Error::InvalidArgument), "out-of-range read accepted");
    bits.append(&[0xFF], 8).expect("cannot append byte");
    assert_eq!(bits.get(usize::MAX), Err(Error::InvalidArgument), "out-of-range read accepted");
    assert_eq!(bits.set(8, true), Err(Error::InvalidArgument), "out-of-range write accepted");
}

/// Appending, reading and modifying bits
#[test]
pub fn regular_usage() {
    let mut bits = BitArray::new();

    bits.append(&[0xFF], 8).expect("cannot append byte");
    assert_eq!(bits.get(1), Ok(true), "invalid bit");
    assert_eq!(bits.get(0), Ok(true), "invalid bit");
    assert_eq!(bits.get(7), Ok(true), "invalid bit");
    bits.set(1, false).expect("cannot set bit");
    assert_eq!(bits.get(1), Ok(false), "invalid bit");

    bits.append(&[0x00], 4).expect("cannot append nibble");
    bits.append(&[0xFF], 4).expect("cannot append nibble");

    // Reconstruct the appended bits as a little-endian word
    let mut test: u16 = 0;
    for i in 0..16 {
        let bit = bits.get(i).expect("cannot read bit");
        test |= u16::from(bit) << i;
    }
    // We have changed the bit in index 1 to 0
    assert_eq!(test, 0xF0FD, "invalid bit pattern");
}

/// Bits are appended last byte first, most significant bit first
#[test]
pub fn append_order() {
    let mut bits = BitArray::new();
    bits.append(&[0xAB, 0x03], 10).expect("cannot append bits");

    let expected = [true, true, true, false, true, false, true, false, true, true];
    for (i, expected) in expected.into_iter().enumerate() {
        assert_eq!(bits.get(i), Ok(expected), "invalid bit at index {i}");
    }
}

/// Six-bit symbols are packed first bit to highest position
#[test]
pub fn symbols() {
    let mut bits = BitArray::new();
    bits.append(&[0x04], 6).expect("cannot append symbol");
    bits.append(&[0x3F], 6).expect("cannot append symbol");

    let mut symbols = [0; 4];
    let count = bits.symbols(&mut symbols).expect("cannot pack symbols");
    assert_eq!(count, 2, "invalid symbol count");
    assert_eq!(&symbols[..count], &[0x04, 0x3F], "invalid symbols");

    // A trailing partial symbol is padded in its low bits
    bits.append(&[0x03], 2).expect("cannot append bits");
    let count = bits.symbols(&mut symbols).expect("cannot pack symbols");
    assert_eq!(count, 3, "invalid symbol count");
    assert_eq!(&symbols[..count], &[0x04, 0x3F, 0b11_0000], "invalid symbols");

    // A too-small symbol buffer is rejected
    let mut small = [0; 2];
    assert_eq!(bits.symbols(&mut small), Err(Error::InvalidArgument), "undersized buffer accepted");
}
