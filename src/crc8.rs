//! Checksum carried by every measurement word.

use crate::hw_def::{CRC_DATA_BITS, CRC_DIVISOR_24};

use crc::{Algorithm, Crc};

/// CRC-8 as computed by the Si70xx family: generator 0x31 (x^8 + x^5 + x^4 + 1), zero initial
/// value, no reflection, no final xor.
pub const CRC_8_SI70XX: Algorithm<u8> = Algorithm {
    width: 8,
    poly: 0x31,
    init: 0x00,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0xa2,
    residue: 0x00,
};

const CRC: Crc<u8> = Crc::<u8>::new(&CRC_8_SI70XX);

/// Compute the check byte the device sends after `value` (MSB first on the wire)
pub fn checksum(value: u16) -> u8 {
    CRC.checksum(&value.to_be_bytes())
}

/// Validate a received word against its check byte.
///
/// The word and check byte are lined up in a 24-bit row and divided by the generator polynomial
/// one data bit at a time.  The remainder is zero when no error is detectable.
pub fn is_crc_valid(value: u16, crc: u8) -> bool {
    let mut row = (value as u32) << 8 | crc as u32;
    let mut divisor = CRC_DIVISOR_24;

    for i in 0..CRC_DATA_BITS {
        if row & (1 << (23 - i)) != 0 {
            row ^= divisor;
        }
        divisor >>= 1;
    }

    row == 0
}
