//! Massa-K binary protocols
//!
//! - Protocol 100: header-synchronized 14-byte records with a CRC16 trailer,
//!   see [`WeightFrame`].
//! - Protocol "J" (SimplePacking): headerless 5-byte frames, status bits in
//!   byte 0 and a 16-bit gram count at offset 2.
//!
//! Both only accept raw bytes; text input yields no reading.

use bitflags::bitflags;
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use tracing::{debug, trace};
use weighlink_types::{DataBits, LineSettings, Parity, Reading, StopBits};

use super::{Payload, ProtocolDescriptor, ProtocolId};
use crate::{
    constants::{massak100, massak_j, GRAMS_PER_KG},
    error::Error,
    frame::{encode_request, WeightFrame},
};

pub static MASSAK_100: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::MassaK100,
    name: "Massa-K (Protocol 2 / 100)",
    description: "Binary protocol (100) for Massa-K terminals",
    polling_required: true,
    line: LineSettings::baud(19200)
        .parity(Parity::Even)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::One),
    parser: parse_100,
    weight_command: Some(|| encode_request(massak100::CMD_GET_WEIGHT).freeze()),
    zero_command: None,
    tare_command: None,
};

pub static MASSAK_J: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::MassaKJ,
    name: "Massa-K (SimplePacking Match)",
    description: "Special variant using \"J\" command at 4800 baud (Even parity)",
    polling_required: true,
    line: LineSettings::baud(4800)
        .parity(Parity::Even)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::One),
    parser: parse_j,
    weight_command: Some(|| Bytes::from_static(b"J")),
    zero_command: None,
    tare_command: None,
};

bitflags! {
    /// Status byte of a "J" frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct JStatus: u8 {
        const STABLE = 0x80;
        const NEGATIVE = 0x40;
    }
}

fn parse_100(payload: Payload<'_>) -> Option<Reading> {
    let buf = payload.bytes()?;

    let frame = match WeightFrame::decode(buf) {
        Ok(frame) => frame,
        Err(Error::HeaderNotFound { scanned }) => {
            if scanned > 0 {
                debug!(scanned, "Massa-K 100: header not found");
            }
            return None;
        }
        Err(Error::FrameTooShort { expected, actual }) => {
            debug!(expected, actual, "Massa-K 100: waiting for more data");
            return None;
        }
        Err(e) => {
            debug!("Massa-K 100: {}", e);
            return None;
        }
    };

    if let Err(e) = frame.verify_checksum() {
        trace!(frame = %hex::encode(frame.encode()), "Massa-K 100: {}", e);
    }

    debug!(
        weight_raw = frame.weight_raw,
        stable = frame.is_stable(),
        "Massa-K 100: parsed"
    );

    Some(Reading::kg(frame.weight_kg(), frame.is_stable()))
}

fn parse_j(payload: Payload<'_>) -> Option<Reading> {
    let buf = payload.bytes()?;

    if buf.len() < massak_j::FRAME_LEN {
        debug!(
            expected = massak_j::FRAME_LEN,
            actual = buf.len(),
            "Massa-K J: frame too short"
        );
        return None;
    }

    trace!(frame = %hex::encode(&buf[..massak_j::FRAME_LEN]), "Massa-K J: received");

    let status = JStatus::from_bits_truncate(buf[0]);
    let grams = LittleEndian::read_i16(&buf[massak_j::WEIGHT_OFFSET..]);

    let mut weight = grams as f64 / GRAMS_PER_KG;
    // The status bit wins over the sign of the raw value
    if status.contains(JStatus::NEGATIVE) && weight > 0.0 {
        weight = -weight;
    }

    Some(Reading::kg(weight, status.contains(JStatus::STABLE)))
}
