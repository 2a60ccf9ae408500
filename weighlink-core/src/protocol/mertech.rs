//! Mertech universal protocol
//!
//! Frames look like `[STX]weight[CR]`; an `S` anywhere in the frame marks a
//! stable weight.

use bytes::Bytes;
use weighlink_types::{LineSettings, Reading};

use super::{Payload, ProtocolDescriptor, ProtocolId};
use crate::text;

pub static MERTECH: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::Mertech,
    name: "Mertech",
    description: "Universal Mertech Protocol",
    polling_required: true,
    line: LineSettings::baud(115200),
    parser: parse,
    weight_command: Some(|| Bytes::from_static(b"W")),
    zero_command: None,
    tare_command: None,
};

fn parse(payload: Payload<'_>) -> Option<Reading> {
    let text = payload.text();
    text::decimal_reading(&text, text.contains('S'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_marker() {
        let reading = MERTECH.parse(&b"\x02S 0.415\r"[..]).unwrap();
        assert_eq!(reading, Reading::kg(0.415, true));
    }

    #[test]
    fn test_without_marker() {
        let reading = MERTECH.parse(&b"\x020.415\r"[..]).unwrap();
        assert!(!reading.stable);
    }

    #[test]
    fn test_no_number() {
        assert!(MERTECH.parse("S----").is_none());
    }
}
