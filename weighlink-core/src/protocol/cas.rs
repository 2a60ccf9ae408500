//! CAS simple (PDS) protocol
//!
//! AD-1, ER and SW series answer a `W` request with lines such as
//! `ST,GS,+  1.500kg`: a two-letter status (`ST` stable, `US` unstable),
//! comma separated fields, then a signed weight glued to its unit.

use std::sync::LazyLock;

use bytes::Bytes;
use regex::Regex;
use weighlink_types::{LineSettings, Reading, Unit};

use super::{Payload, ProtocolDescriptor, ProtocolId};
use crate::text;

static CAS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z]{2}),.*,([+|\-]?\s*\d+\.\d+)([a-zA-Z]+)").expect("invalid regex pattern")
});

pub static CAS_SIMPLE: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::CasSimple,
    name: "CAS (Simple/PDS)",
    description: "Standard CAS protocol (AD-1, ER, SW models)",
    polling_required: true,
    line: LineSettings::baud(9600),
    parser: parse,
    weight_command: Some(|| Bytes::from_static(b"W")),
    zero_command: None,
    tare_command: None,
};

fn parse(payload: Payload<'_>) -> Option<Reading> {
    let text = payload.text();
    let caps = CAS_LINE.captures(text.trim())?;

    let weight = text::parse_weight(&caps[2])?;

    Some(Reading::new(
        weight,
        Unit::from_suffix(&caps[3]),
        &caps[1] == "ST",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stable_line() {
        let reading = CAS_SIMPLE.parse(&b"ST,GS,+  1.500kg\r\n"[..]).unwrap();
        assert_eq!(reading, Reading::kg(1.5, true));
    }

    #[test]
    fn test_unstable_negative_grams() {
        let reading = CAS_SIMPLE.parse("US,NT,-  250.0g").unwrap();
        assert_eq!(reading, Reading::new(-250.0, Unit::G, false));
    }

    #[test]
    fn test_unknown_unit_defaults_to_kg() {
        let reading = CAS_SIMPLE.parse("ST,GS,+0.750oz").unwrap();
        assert_eq!(reading.unit, Unit::Kg);
    }

    #[test]
    fn test_unrecognized() {
        assert!(CAS_SIMPLE.parse("1.500 kg").is_none());
        assert!(CAS_SIMPLE.parse("").is_none());
    }

    #[test]
    fn test_weight_command() {
        assert_eq!(CAS_SIMPLE.weight_command().unwrap(), Bytes::from_static(b"W"));
    }
}
