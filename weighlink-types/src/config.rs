//! Connection configuration consumed by the transport strategies

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default baud rate when neither config nor protocol specify one
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default port for raw TCP printers and scales
pub const DEFAULT_TCP_PORT: u16 = 9100;

/// Physical transport selected for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Serial,
    Tcp,
    /// OS print spooler, driven through an external helper process
    #[serde(alias = "windows_driver")]
    Spooler,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Tcp => "tcp",
            Self::Spooler => "spooler",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serial parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

/// Serial data bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DataBits {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

impl TryFrom<u8> for DataBits {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            _ => Err(Error::Unsupported(format!("{} data bits", value))),
        }
    }
}

impl From<DataBits> for u8 {
    fn from(bits: DataBits) -> u8 {
        match bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

/// Serial stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StopBits {
    #[default]
    One,
    Two,
}

impl TryFrom<u8> for StopBits {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            _ => Err(Error::Unsupported(format!("{} stop bits", value))),
        }
    }
}

impl From<StopBits> for u8 {
    fn from(bits: StopBits) -> u8 {
        match bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

/// Optional serial line overrides
///
/// Protocol descriptors carry one of these as their hardware defaults.
/// Every field is optional so that "not specified" stays distinguishable
/// from an explicit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineSettings {
    pub baud_rate: Option<u32>,
    pub parity: Option<Parity>,
    pub data_bits: Option<DataBits>,
    pub stop_bits: Option<StopBits>,
}

impl LineSettings {
    /// No overrides
    pub const NONE: Self = Self {
        baud_rate: None,
        parity: None,
        data_bits: None,
        stop_bits: None,
    };

    pub const fn baud(baud_rate: u32) -> Self {
        Self {
            baud_rate: Some(baud_rate),
            ..Self::NONE
        }
    }

    pub const fn parity(mut self, parity: Parity) -> Self {
        self.parity = Some(parity);
        self
    }

    pub const fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = Some(data_bits);
        self
    }

    pub const fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = Some(stop_bits);
        self
    }
}

/// Fully resolved serial line parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub path: String,
    pub baud_rate: u32,
    pub parity: Parity,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
}

/// Transport selection and per-transport parameters
///
/// Only the fields relevant to `kind` are consulted; each strategy checks
/// for the ones it needs when `connect` is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub kind: TransportKind,

    /// Serial device path, e.g. `/dev/ttyUSB0` or `COM3`
    #[serde(default, alias = "path")]
    pub serial_port: Option<String>,

    #[serde(default)]
    pub baud_rate: Option<u32>,

    #[serde(default)]
    pub parity: Option<Parity>,

    #[serde(default)]
    pub data_bits: Option<DataBits>,

    #[serde(default)]
    pub stop_bits: Option<StopBits>,

    #[serde(default, alias = "ip")]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Printer name as registered with the OS spooler
    #[serde(default)]
    pub driver_name: Option<String>,
}

impl ConnectionConfig {
    /// Empty configuration for the given transport
    pub fn new(kind: TransportKind) -> Self {
        Self {
            kind,
            serial_port: None,
            baud_rate: None,
            parity: None,
            data_bits: None,
            stop_bits: None,
            host: None,
            port: None,
            driver_name: None,
        }
    }

    pub fn serial(path: impl Into<String>) -> Self {
        Self {
            serial_port: Some(path.into()),
            ..Self::new(TransportKind::Serial)
        }
    }

    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(port),
            ..Self::new(TransportKind::Tcp)
        }
    }

    pub fn spooler(driver_name: impl Into<String>) -> Self {
        Self {
            driver_name: Some(driver_name.into()),
            ..Self::new(TransportKind::Spooler)
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = Some(parity);
        self
    }

    pub fn with_data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = Some(data_bits);
        self
    }

    pub fn with_stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = Some(stop_bits);
        self
    }

    /// Fill line settings the config leaves unspecified
    ///
    /// Explicit values always win over `defaults`.
    pub fn with_line_defaults(mut self, defaults: LineSettings) -> Self {
        self.baud_rate = self.baud_rate.or(defaults.baud_rate);
        self.parity = self.parity.or(defaults.parity);
        self.data_bits = self.data_bits.or(defaults.data_bits);
        self.stop_bits = self.stop_bits.or(defaults.stop_bits);
        self
    }

    /// Serial path, failing if absent or blank
    pub fn require_serial_port(&self) -> Result<&str> {
        require(self.serial_port.as_deref(), self.kind, "serial port")
    }

    /// TCP host, failing if absent or blank
    pub fn require_host(&self) -> Result<&str> {
        require(self.host.as_deref(), self.kind, "host")
    }

    /// Spooler driver name, failing if absent or blank
    pub fn require_driver_name(&self) -> Result<&str> {
        require(self.driver_name.as_deref(), self.kind, "driver name")
    }

    /// TCP port, defaulting to [`DEFAULT_TCP_PORT`]
    pub fn tcp_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_TCP_PORT)
    }

    /// Resolve the serial line parameters, falling back to 9600 8N1
    pub fn serial_settings(&self) -> Result<SerialSettings> {
        Ok(SerialSettings {
            path: self.require_serial_port()?.to_string(),
            baud_rate: self.baud_rate.unwrap_or(DEFAULT_BAUD_RATE),
            parity: self.parity.unwrap_or_default(),
            data_bits: self.data_bits.unwrap_or_default(),
            stop_bits: self.stop_bits.unwrap_or_default(),
        })
    }
}

fn require<'a>(value: Option<&'a str>, kind: TransportKind, field: &'static str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::MissingField {
            transport: kind.as_str(),
            field,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_fields() {
        let config = ConnectionConfig::new(TransportKind::Tcp);
        assert!(matches!(
            config.require_host(),
            Err(Error::MissingField { field: "host", .. })
        ));

        let blank = ConnectionConfig::spooler("  ");
        assert!(blank.require_driver_name().is_err());

        let serial = ConnectionConfig::new(TransportKind::Serial);
        assert!(serial.serial_settings().is_err());
    }

    #[test]
    fn test_serial_settings_defaults() {
        let settings = ConnectionConfig::serial("/dev/ttyUSB0").serial_settings().unwrap();

        assert_eq!(
            settings,
            SerialSettings {
                path: "/dev/ttyUSB0".into(),
                baud_rate: 9600,
                parity: Parity::None,
                data_bits: DataBits::Eight,
                stop_bits: StopBits::One,
            }
        );
    }

    #[test]
    fn test_line_defaults_do_not_override_explicit_values() {
        let defaults = LineSettings::baud(19200).parity(Parity::Even);
        let config = ConnectionConfig::serial("COM3")
            .with_baud_rate(4800)
            .with_line_defaults(defaults);

        assert_eq!(config.baud_rate, Some(4800));
        assert_eq!(config.parity, Some(Parity::Even));
    }

    #[test]
    fn test_tcp_port_default() {
        let mut config = ConnectionConfig::tcp("10.0.0.5", 4001);
        assert_eq!(config.tcp_port(), 4001);

        config.port = None;
        assert_eq!(config.tcp_port(), DEFAULT_TCP_PORT);
    }

    #[test]
    fn test_deserialize() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{"kind":"windows_driver","driver_name":"Zebra ZD420"}"#,
        )
        .unwrap();
        assert_eq!(config, ConnectionConfig::spooler("Zebra ZD420"));

        let serial: ConnectionConfig = serde_json::from_str(
            r#"{"kind":"serial","path":"COM4","data_bits":7,"stop_bits":2,"parity":"odd"}"#,
        )
        .unwrap();
        assert_eq!(serial.data_bits, Some(DataBits::Seven));
        assert_eq!(serial.stop_bits, Some(StopBits::Two));
        assert_eq!(serial.parity, Some(Parity::Odd));

        let invalid = serde_json::from_str::<ConnectionConfig>(r#"{"kind":"serial","data_bits":9}"#);
        assert!(invalid.is_err());
    }
}
