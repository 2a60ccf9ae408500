//! Fallback and placeholder descriptors

use bytes::Bytes;
use weighlink_types::{LineSettings, Reading};

use super::{Payload, ProtocolDescriptor, ProtocolId};
use crate::text;

/// Last-resort descriptor: first decimal number, kilograms, never stable
///
/// Used whenever a configured protocol id is not recognized.
pub static GENERIC: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::Generic,
    name: "Generic Text",
    description: "Parses first number found in output",
    polling_required: false,
    line: LineSettings::NONE,
    parser: parse_generic,
    weight_command: None,
    zero_command: None,
    tare_command: None,
};

/// Registry entry for a virtual scale
///
/// `parse` never yields a reading. Synthetic readings are produced by
/// whoever drives the device, which is expected to special-case this id
/// instead of opening a transport.
pub static SIMULATOR: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::Simulator,
    name: "Simulator (Virtual Scale)",
    description: "Generates random weight and toggles stability",
    polling_required: true,
    line: LineSettings::baud(9600),
    parser: parse_simulated,
    weight_command: Some(|| Bytes::from_static(b"SIM")),
    zero_command: None,
    tare_command: None,
};

fn parse_simulated(_: Payload<'_>) -> Option<Reading> {
    None
}

fn parse_generic(payload: Payload<'_>) -> Option<Reading> {
    text::decimal_reading(&payload.text(), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generic_first_number() {
        let reading = GENERIC.parse("abc 12.500 xyz").unwrap();
        assert_eq!(reading, Reading::kg(12.5, false));
    }

    #[test]
    fn test_generic_no_number() {
        assert!(GENERIC.parse("abc xyz").is_none());
        assert!(GENERIC.parse("weight: 12").is_none());
    }

    #[test]
    fn test_simulator_never_parses() {
        assert!(SIMULATOR.parse("1.000 kg").is_none());
        assert!(SIMULATOR.parse(&b"S S 1.000 kg"[..]).is_none());
        assert!(SIMULATOR.is_simulated());
    }
}
