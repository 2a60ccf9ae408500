//! Massa-K CRC16
//!
//! Reflected CRC-16 (polynomial 0x8005, processed LSB-first as 0xA001),
//! initial register 0xFFFF, no final XOR. Transmitted little-endian.

use tracing::trace;

/// Reflected form of polynomial 0x8005
pub const POLYNOMIAL: u16 = 0xA001;

/// Initial register value
pub const INITIAL: u16 = 0xFFFF;

/// Calculate the CRC16 of `data`, one bit at a time
///
/// # Examples
///
/// ```
/// use weighlink_core::checksum;
///
/// assert_eq!(checksum::crc16(b"123456789"), 0x4B37);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = INITIAL;

    for &byte in data {
        crc ^= byte as u16;

        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
        }
    }

    trace!(
        len = data.len(),
        crc = format!("0x{:04X}", crc),
        "Calculated CRC16"
    );

    crc
}

/// Verify a received checksum
pub fn verify(data: &[u8], expected: u16) -> bool {
    crc16(data) == expected
}
