//! Mettler Toledo SICS (Standard Interface Command Set)
//!
//! The `S` command answers `S S    100.00 g` when stable and
//! `S D    100.00 g` while the weight is still moving. `S I` means the
//! balance cannot produce a value right now.

use bytes::Bytes;
use tracing::trace;
use weighlink_types::{LineSettings, Reading, Unit};

use super::{Payload, ProtocolDescriptor, ProtocolId};
use crate::text;

pub static METTLER_SICS: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::MettlerSics,
    name: "Mettler Toledo (SICS)",
    description: "Standard Interface Command Set",
    polling_required: true,
    line: LineSettings::baud(9600),
    parser: parse,
    weight_command: Some(|| Bytes::from_static(b"S\r\n")),
    zero_command: Some(|| Bytes::from_static(b"Z\r\n")),
    tare_command: Some(|| Bytes::from_static(b"T\r\n")),
};

fn parse(payload: Payload<'_>) -> Option<Reading> {
    let text = payload.text();
    let parts: Vec<&str> = text.split_whitespace().collect();

    if parts.len() < 3 || parts[0] != "S" {
        return None;
    }

    let status = parts[1];
    if status == "I" {
        trace!("SICS: balance reports invalid weight");
        return None;
    }

    let weight = text::parse_weight(parts[2])?;
    let unit = parts.get(3).map_or(Unit::Kg, |u| Unit::from_suffix(u));

    Some(Reading::new(weight, unit, status == "S"))
}
