//! Massa-K ASCII dialects
//!
//! Massa-K terminals ship with several text protocols depending on model and
//! firmware. Most of them only promise a decimal number somewhere in the
//! answer, so the parsers here are deliberately permissive.
//!
//! Some dialects (A/TB, A/TB-P, the legacy `massa_k`) carry no stability
//! marker at all and report every reading as stable.

use std::sync::LazyLock;

use bytes::Bytes;
use regex::Regex;
use tracing::debug;
use weighlink_types::{LineSettings, Parity, Reading, Unit};

use super::{Payload, ProtocolDescriptor, ProtocolId};
use crate::{constants::ascii, text};

/// `S  +001.234 kg` / `U  -000.500 kg`
static PROTOCOL1_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([SU\?])\s*([+-]?\d+\.\d+)\s*(\w+)?").expect("invalid regex pattern")
});

/// `  + 1.235 kg `
static ATB_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([+-]?\s*\d+\.\d+)\s*(kg|g)?").expect("invalid regex pattern")
});

/// `12.345 kg`
static WEIGHT_WITH_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+\.\d+)\s*(kg|g)").expect("invalid regex pattern")
});

pub static MASSAK_PROTOCOL1: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::MassaKProtocol1,
    name: "Massa-K (Protocol 1)",
    description: "ASCII protocol for Massa-K terminals",
    polling_required: true,
    line: LineSettings::baud(9600).parity(Parity::None),
    parser: parse_protocol1,
    weight_command: Some(|| Bytes::from_static(b"W\r\n")),
    zero_command: None,
    tare_command: None,
};

pub static MASSAK_LITE: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::MassaKLite,
    name: "Massa-K (Lite)",
    description: "Simple text protocol",
    polling_required: true,
    line: LineSettings::baud(9600),
    parser: parse_lite,
    weight_command: Some(|| Bytes::from_static(&[0x45])),
    zero_command: None,
    tare_command: None,
};

pub static MASSAK_ATB: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::MassaKAtb,
    name: "Massa-K A/TB (Simple)",
    description: "Protocol 3 (Request 0x05) for AB/AB-series scales",
    polling_required: true,
    line: LineSettings::baud(9600).parity(Parity::None),
    parser: parse_atb,
    weight_command: Some(|| Bytes::from_static(&[ascii::ENQ])),
    zero_command: None,
    tare_command: None,
};

pub static MASSAK_CONTINUOUS: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::MassaKContinuous,
    name: "Massa-K (Continuous)",
    description: "For scales configured to transmit continuously",
    polling_required: false,
    line: LineSettings::NONE,
    parser: parse_continuous,
    weight_command: None,
    zero_command: None,
    tare_command: None,
};

pub static MASSAK_ATB_P: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::MassaKAtbP,
    name: "Massa-K A/TB (Text P)",
    description: "Protocol using \"P\" command, common in A/TB series",
    polling_required: true,
    line: LineSettings::baud(4800).parity(Parity::None),
    parser: parse_atb_p,
    weight_command: Some(|| Bytes::from_static(b"P\r\n")),
    zero_command: None,
    tare_command: None,
};

pub static MASSA_K: ProtocolDescriptor = ProtocolDescriptor {
    id: ProtocolId::MassaK,
    name: "Massa-K",
    description: "Common protocol for Massa-K scales (100 response)",
    polling_required: true,
    line: LineSettings::baud(4800),
    parser: parse_legacy,
    weight_command: Some(|| Bytes::from_static(&[0x43])),
    zero_command: None,
    tare_command: None,
};

fn parse_protocol1(payload: Payload<'_>) -> Option<Reading> {
    let raw = payload.text();
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    debug!(raw = text, "Massa-K Protocol 1: received");

    if let Some(caps) = PROTOCOL1_LINE.captures(text) {
        if let Some(weight) = text::parse_weight(&caps[2]) {
            let unit = caps.get(3).map_or(Unit::Kg, |u| Unit::from_suffix(u.as_str()));
            return Some(Reading::new(weight, unit, &caps[1] == "S"));
        }
    }

    text::signed_decimal_reading(text, text.contains('S'))
}

fn parse_lite(payload: Payload<'_>) -> Option<Reading> {
    text::decimal_reading(&payload.text(), false)
}

fn parse_atb(payload: Payload<'_>) -> Option<Reading> {
    let text = payload.text();
    let caps = ATB_LINE.captures(&text)?;

    let weight = text::parse_weight(&caps[1])?;
    let unit = caps.get(2).map_or(Unit::Kg, |u| Unit::from_suffix(u.as_str()));

    Some(Reading::new(weight, unit, true))
}

fn parse_continuous(payload: Payload<'_>) -> Option<Reading> {
    let raw = payload.text();
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    debug!(raw = text, "Massa-K continuous: received");

    text::signed_decimal_reading(text, text.contains('S'))
}

fn parse_atb_p(payload: Payload<'_>) -> Option<Reading> {
    let raw = payload.text();
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    debug!(raw = text, "Massa-K A/TB-P: received");

    text::signed_decimal_reading(text, true)
}

fn parse_legacy(payload: Payload<'_>) -> Option<Reading> {
    let text = payload.text();
    let caps = WEIGHT_WITH_UNIT.captures(&text)?;

    let weight = text::parse_weight(&caps[1])?;

    Some(Reading::new(weight, Unit::from_suffix(&caps[2]), true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_protocol1_stable() {
        let reading = MASSAK_PROTOCOL1.parse(&b"S  +001.234 kg\r\n"[..]).unwrap();
        assert_eq!(reading, Reading::kg(1.234, true));
    }

    #[test]
    fn test_protocol1_unstable_negative() {
        let reading = MASSAK_PROTOCOL1.parse("U  -000.500 kg").unwrap();
        assert_eq!(reading, Reading::kg(-0.5, false));
    }

    #[test]
    fn test_protocol1_unit_in_grams() {
        let reading = MASSAK_PROTOCOL1.parse("S 250.0 g").unwrap();
        assert_eq!(reading, Reading::new(250.0, Unit::G, true));
    }

    #[test]
    fn test_protocol1_fallback() {
        // No status letter in front of the number
        let reading = MASSAK_PROTOCOL1.parse("NET 2.500").unwrap();
        assert_eq!(reading, Reading::kg(2.5, false));

        assert!(MASSAK_PROTOCOL1.parse("   ").is_none());
        assert!(MASSAK_PROTOCOL1.parse("ERR").is_none());
    }

    #[test]
    fn test_lite() {
        let reading = MASSAK_LITE.parse("  0.875").unwrap();
        assert_eq!(reading, Reading::kg(0.875, false));
        assert_eq!(&MASSAK_LITE.weight_command().unwrap()[..], b"E");
    }

    #[test]
    fn test_atb_spaced_sign() {
        let reading = MASSAK_ATB.parse(&b"\x02  + 1.235 kg \x03"[..]).unwrap();
        assert_eq!(reading, Reading::kg(1.235, true));

        let grams = MASSAK_ATB.parse("- 12.5 G").unwrap();
        assert_eq!(grams, Reading::new(-12.5, Unit::G, true));
    }

    #[test]
    fn test_atb_always_stable() {
        let reading = MASSAK_ATB.parse("0.100").unwrap();
        assert!(reading.stable);
        assert_eq!(&MASSAK_ATB.weight_command().unwrap()[..], &[0x05]);
    }

    #[test]
    fn test_continuous() {
        assert!(!MASSAK_CONTINUOUS.polling_required);
        assert!(MASSAK_CONTINUOUS.weight_command().is_none());

        let stable = MASSAK_CONTINUOUS.parse("S -1.200").unwrap();
        assert_eq!(stable, Reading::kg(-1.2, true));

        let moving = MASSAK_CONTINUOUS.parse("1.200").unwrap();
        assert!(!moving.stable);
    }

    #[test]
    fn test_atb_p() {
        let reading = MASSAK_ATB_P.parse("  -0.020\r\n").unwrap();
        assert_eq!(reading, Reading::kg(-0.02, true));
        assert_eq!(MASSAK_ATB_P.line.baud_rate, Some(4800));
        assert_eq!(&MASSAK_ATB_P.weight_command().unwrap()[..], b"P\r\n");
    }

    #[test]
    fn test_legacy_requires_unit() {
        let reading = MASSA_K.parse("12.345 kg").unwrap();
        assert_eq!(reading, Reading::kg(12.345, true));
        assert!(MASSA_K.parse("12.345").is_none());
    }
}
