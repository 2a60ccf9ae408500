//! Scale protocol descriptors
//!
//! A [`ProtocolDescriptor`] bundles everything the host needs to talk to one
//! manufacturer's wire format: line defaults, whether the scale must be
//! polled, the request commands, and a `parse` function turning raw bytes
//! into a [`Reading`].
//!
//! `parse` never fails loudly. Incomplete, malformed and unrecognized input
//! all yield `None`, which callers treat as "keep waiting".

pub mod cas;
pub mod generic;
pub mod massak;
pub mod massak_binary;
pub mod mertech;
pub mod mettler;
pub mod shtrihm;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use weighlink_types::{LineSettings, Reading};

use crate::error::{Error, Result};

/// Input handed to a parser
///
/// Bytes straight off a transport are the normal case. Text input exists for
/// callers that already decoded the stream; binary protocols reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
}

impl<'a> Payload<'a> {
    /// Payload as text, replacing invalid UTF-8
    pub fn text(&self) -> Cow<'a, str> {
        match *self {
            Self::Bytes(bytes) => String::from_utf8_lossy(bytes),
            Self::Text(text) => Cow::Borrowed(text),
        }
    }

    /// Raw bytes, `None` for text input
    pub fn bytes(&self) -> Option<&'a [u8]> {
        match *self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Text(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bytes(bytes) => bytes.len(),
            Self::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Payload<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Payload<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

/// Identifier of every known protocol
///
/// Configuration carries protocol ids as strings; they are validated into
/// this closed set once, at the edge.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProtocolId {
    CasSimple,
    MettlerSics,
    MassaK100,
    MassaKProtocol1,
    MassaKLite,
    MassaKAtb,
    MassaKContinuous,
    MassaKAtbP,
    MassaKJ,
    MassaK,
    ShtrihM,
    Mertech,
    Simulator,
    Generic,
}

impl ProtocolId {
    /// Every id, in registry order
    pub const ALL: [ProtocolId; 14] = [
        Self::CasSimple,
        Self::MettlerSics,
        Self::MassaK100,
        Self::MassaKProtocol1,
        Self::MassaKLite,
        Self::MassaKAtb,
        Self::MassaKContinuous,
        Self::MassaKAtbP,
        Self::MassaKJ,
        Self::MassaK,
        Self::ShtrihM,
        Self::Mertech,
        Self::Simulator,
        Self::Generic,
    ];

    /// Configuration key
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CasSimple => "cas_simple",
            Self::MettlerSics => "mettler_sics",
            Self::MassaK100 => "massak_100",
            Self::MassaKProtocol1 => "massak_p1",
            Self::MassaKLite => "massak_lite",
            Self::MassaKAtb => "massak_astb",
            Self::MassaKContinuous => "massak_cont",
            Self::MassaKAtbP => "massak_astbp",
            Self::MassaKJ => "massak_j",
            Self::MassaK => "massa_k",
            Self::ShtrihM => "shtrih_m",
            Self::Mertech => "mertech",
            Self::Simulator => "simulator",
            Self::Generic => "generic",
        }
    }

    /// Validate `id`, falling back to [`ProtocolId::Generic`] when unknown
    pub fn resolve(id: &str) -> Self {
        id.parse().unwrap_or(Self::Generic)
    }

    /// Descriptor for this id
    pub fn descriptor(self) -> &'static ProtocolDescriptor {
        match self {
            Self::CasSimple => &cas::CAS_SIMPLE,
            Self::MettlerSics => &mettler::METTLER_SICS,
            Self::MassaK100 => &massak_binary::MASSAK_100,
            Self::MassaKProtocol1 => &massak::MASSAK_PROTOCOL1,
            Self::MassaKLite => &massak::MASSAK_LITE,
            Self::MassaKAtb => &massak::MASSAK_ATB,
            Self::MassaKContinuous => &massak::MASSAK_CONTINUOUS,
            Self::MassaKAtbP => &massak::MASSAK_ATB_P,
            Self::MassaKJ => &massak_binary::MASSAK_J,
            Self::MassaK => &massak::MASSA_K,
            Self::ShtrihM => &shtrihm::SHTRIH_M,
            Self::Mertech => &mertech::MERTECH,
            Self::Simulator => &generic::SIMULATOR,
            Self::Generic => &generic::GENERIC,
        }
    }
}

impl FromStr for ProtocolId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| Error::UnknownProtocol(s.to_string()))
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parser signature shared by every descriptor
pub type ParseFn = fn(Payload<'_>) -> Option<Reading>;

/// Command builder signature
pub type CommandFn = fn() -> Bytes;

/// Wire-format description of one scale protocol
///
/// Descriptors are immutable statics; see [`crate::registry`].
pub struct ProtocolDescriptor {
    pub id: ProtocolId,

    /// Human-readable name
    pub name: &'static str,

    pub description: &'static str,

    /// `true`: the host must request each reading.
    /// `false`: the scale streams readings on its own.
    pub polling_required: bool,

    /// Hardware defaults for serial links
    pub line: LineSettings,

    pub(crate) parser: ParseFn,
    pub(crate) weight_command: Option<CommandFn>,
    pub(crate) zero_command: Option<CommandFn>,
    pub(crate) tare_command: Option<CommandFn>,
}

impl ProtocolDescriptor {
    /// Decode a reading from `payload`
    ///
    /// Returns `None` both when the frame is incomplete and when the input is
    /// not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use weighlink_core::registry;
    ///
    /// let generic = registry::get_protocol("generic");
    /// let reading = generic.parse(&b"abc 12.500 xyz"[..]).unwrap();
    /// assert_eq!(reading.weight, 12.5);
    /// ```
    pub fn parse<'a>(&self, payload: impl Into<Payload<'a>>) -> Option<Reading> {
        (self.parser)(payload.into())
    }

    /// Command requesting the current weight
    pub fn weight_command(&self) -> Option<Bytes> {
        self.weight_command.map(|build| build())
    }

    /// Command zeroing the scale
    pub fn zero_command(&self) -> Option<Bytes> {
        self.zero_command.map(|build| build())
    }

    /// Command taring the scale
    pub fn tare_command(&self) -> Option<Bytes> {
        self.tare_command.map(|build| build())
    }

    /// Whether the wire format is binary rather than line-oriented text
    pub fn is_binary(&self) -> bool {
        matches!(self.id, ProtocolId::MassaK100 | ProtocolId::MassaKJ)
    }

    /// Whether readings must come from outside `parse`
    pub fn is_simulated(&self) -> bool {
        self.id == ProtocolId::Simulator
    }
}

impl fmt::Debug for ProtocolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("polling_required", &self.polling_required)
            .field("line", &self.line)
            .finish()
    }
}

impl fmt::Display for ProtocolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_id_round_trip_names() {
        for id in ProtocolId::ALL {
            assert_eq!(id.as_str().parse::<ProtocolId>().unwrap(), id);
            assert_eq!(id.descriptor().id, id);
        }
    }

    #[test]
    fn test_unknown_protocol_id() {
        assert!(matches!(
            "acme_9000".parse::<ProtocolId>(),
            Err(Error::UnknownProtocol(_))
        ));
        assert_eq!(ProtocolId::resolve("acme_9000"), ProtocolId::Generic);
    }

    #[test]
    fn test_payload_text() {
        assert_eq!(Payload::from(&b"1.5"[..]).text(), "1.5");
        assert_eq!(Payload::from("2.5").text(), "2.5");
        assert!(Payload::from("2.5").bytes().is_none());
    }

    #[test]
    fn test_binary_protocols() {
        let binary: Vec<_> = ProtocolId::ALL
            .into_iter()
            .filter(|id| id.descriptor().is_binary())
            .collect();
        assert_eq!(binary, vec![ProtocolId::MassaK100, ProtocolId::MassaKJ]);
    }
}
