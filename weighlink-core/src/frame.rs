//! Massa-K Protocol 100 frame encoding/decoding

use bytes::{Buf, BufMut, BytesMut};
use std::fmt;

use crate::{
    checksum,
    constants::{massak100, GRAMS_PER_KG},
    error::{Error, Result},
};

/// Weight response record of Massa-K Protocol 100
///
/// # Frame Structure
///
/// ```text
/// ┌──────────┬──────────┬─────────┬────────────┬─────────┬─────────┬──────────┐
/// │  Header  │  Length  │ Command │   Weight   │ Divisor │ Stable  │  CRC16   │
/// │ F8 55 CE │ (LE u16) │ 1 byte  │ (LE i32,g) │ 1 byte  │ 1 byte  │ (LE u16) │
/// └──────────┴──────────┴─────────┴────────────┴─────────┴─────────┴──────────┘
/// ```
///
/// The CRC covers everything between the header and the CRC itself.
#[derive(Clone, PartialEq, Eq)]
pub struct WeightFrame {
    /// Payload length as announced by the device
    pub length: u16,

    /// Response command code (0x10 for weight)
    pub command: u8,

    /// Signed weight in grams
    pub weight_raw: i32,

    /// Display division code
    pub division: u8,

    /// 1 when the weight is stable, anything else when not
    pub stable_flag: u8,

    /// Checksum as received
    pub crc: u16,
}

impl WeightFrame {
    /// Total record size, header and CRC included
    pub const LEN: usize = massak100::RECORD_LEN;

    /// Bytes between the header and the CRC
    const BODY_LEN: usize = Self::LEN - massak100::HEADER.len() - 2;

    /// Build a weight record the way a terminal would send it
    ///
    /// # Examples
    ///
    /// ```
    /// use weighlink_core::WeightFrame;
    ///
    /// let frame = WeightFrame::new(2000, true);
    /// assert_eq!(frame.encode().len(), WeightFrame::LEN);
    /// ```
    pub fn new(weight_raw: i32, stable: bool) -> Self {
        let mut frame = Self {
            length: 7,
            command: massak100::CMD_ACK_WEIGHT,
            weight_raw,
            division: 0,
            stable_flag: u8::from(stable),
            crc: 0,
        };
        frame.crc = checksum::crc16(&frame.body());
        frame
    }

    /// Position of the first synchronization header in `buf`
    pub fn find_header(buf: &[u8]) -> Option<usize> {
        buf.windows(massak100::HEADER.len())
            .position(|w| w == massak100::HEADER)
    }

    /// Decode the first weight record in `buf`
    ///
    /// Leading bytes before the header are skipped. The checksum is not
    /// enforced here, see [`WeightFrame::verify_checksum`].
    ///
    /// # Errors
    ///
    /// - [`Error::HeaderNotFound`] if no header occurs in `buf`
    /// - [`Error::FrameTooShort`] if fewer than 14 bytes follow the header
    ///   (the rest of the record may still be in flight)
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let start = Self::find_header(buf).ok_or(Error::HeaderNotFound {
            scanned: buf.len(),
        })?;

        let mut pkt = &buf[start..];
        if pkt.len() < Self::LEN {
            return Err(Error::FrameTooShort {
                expected: Self::LEN,
                actual: pkt.len(),
            });
        }

        pkt.advance(massak100::HEADER.len());

        Ok(Self {
            length: pkt.get_u16_le(),
            command: pkt.get_u8(),
            weight_raw: pkt.get_i32_le(),
            division: pkt.get_u8(),
            stable_flag: pkt.get_u8(),
            crc: pkt.get_u16_le(),
        })
    }

    /// Check the received CRC against the record body
    pub fn verify_checksum(&self) -> Result<()> {
        let calculated = checksum::crc16(&self.body());
        if calculated != self.crc {
            return Err(Error::ChecksumMismatch {
                expected: calculated,
                received: self.crc,
            });
        }
        Ok(())
    }

    /// Stable only when the flag byte is exactly 1
    pub fn is_stable(&self) -> bool {
        self.stable_flag == massak100::STABLE
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_raw as f64 / GRAMS_PER_KG
    }

    /// Encode the record to bytes
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::LEN);
        buf.put_slice(&massak100::HEADER);
        buf.put_slice(&self.body());
        buf.put_u16_le(self.crc);
        buf
    }

    fn body(&self) -> [u8; Self::BODY_LEN] {
        let mut body = [0u8; Self::BODY_LEN];
        let mut cursor = &mut body[..];
        cursor.put_u16_le(self.length);
        cursor.put_u8(self.command);
        cursor.put_i32_le(self.weight_raw);
        cursor.put_u8(self.division);
        cursor.put_u8(self.stable_flag);
        body
    }
}

/// Encode a host request: header, length, command, CRC16 of length+command
///
/// # Examples
///
/// ```
/// use weighlink_core::frame::encode_request;
///
/// let request = encode_request(0xA0);
/// assert_eq!(&request[..], &[0xF8, 0x55, 0xCE, 0x01, 0x00, 0xA0, 0x20, 0x78]);
/// ```
pub fn encode_request(command: u8) -> BytesMut {
    let mut payload = [0u8; 3];
    let mut cursor = &mut payload[..];
    cursor.put_u16_le(1);
    cursor.put_u8(command);

    let mut buf = BytesMut::with_capacity(massak100::HEADER.len() + payload.len() + 2);
    buf.put_slice(&massak100::HEADER);
    buf.put_slice(&payload);
    buf.put_u16_le(checksum::crc16(&payload));
    buf
}

impl fmt::Debug for WeightFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightFrame")
            .field("length", &self.length)
            .field("command", &format!("0x{:02X}", self.command))
            .field("weight_raw", &self.weight_raw)
            .field("division", &self.division)
            .field("stable_flag", &self.stable_flag)
            .field("crc", &format!("0x{:04X}", self.crc))
            .finish()
    }
}

impl fmt::Display for WeightFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WeightFrame({} g, stable={})",
            self.weight_raw,
            self.is_stable()
        )
    }
}
