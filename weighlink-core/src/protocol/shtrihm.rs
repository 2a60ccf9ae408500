//! Shtrih-M POS2
//!
//! Only the print-mode text output is decoded; the binary POS2 answer is not.

use bytes::Bytes;
use weighlink_types::{LineSettings, Reading};

use super::{Payload, ProtocolDescriptor, ProtocolId};
use crate::{constants::ascii, text};

pub static SHTRIH_M: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::ShtrihM,
    name: "Shtrih-M (POS2)",
    description: "Standard POS2 protocol",
    polling_required: true,
    line: LineSettings::baud(9600),
    parser: parse,
    weight_command: Some(|| Bytes::from_static(&[ascii::STX, 0x05, 0x39, 0x3E])),
    zero_command: None,
    tare_command: None,
};

fn parse(payload: Payload<'_>) -> Option<Reading> {
    text::decimal_reading(&payload.text(), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_mode_text() {
        let reading = SHTRIH_M.parse(&b"NET   3.210 kg"[..]).unwrap();
        assert_eq!(reading, Reading::kg(3.21, true));
    }

    #[test]
    fn test_binary_answer_not_decoded() {
        assert!(SHTRIH_M.parse(&[0x06u8, 0x02, 0x0B, 0x39, 0x00][..]).is_none());
    }

    #[test]
    fn test_weight_command() {
        assert_eq!(
            &SHTRIH_M.weight_command().unwrap()[..],
            &[0x02, 0x05, 0x39, 0x3E]
        );
    }
}
