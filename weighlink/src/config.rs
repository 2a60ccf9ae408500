//! Device configuration file

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use weighlink_core::{ProtocolDescriptor, ProtocolId};
use weighlink_types::{ConnectionConfig, TransportKind};

use crate::error::{Error, Result};

/// One configured scale: how to reach it and which dialect it speaks
///
/// ```json
/// {
///   "connection": { "kind": "serial", "serial_port": "/dev/ttyUSB0" },
///   "protocol_id": "massak_100"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub connection: ConnectionConfig,

    /// Registry id; unknown ids resolve to the generic protocol
    #[serde(default = "default_protocol_id")]
    pub protocol_id: String,
}

fn default_protocol_id() -> String {
    ProtocolId::Simulator.as_str().to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::new(TransportKind::Serial),
            protocol_id: default_protocol_id(),
        }
    }
}

impl DeviceConfig {
    pub fn new(connection: ConnectionConfig, protocol_id: impl Into<String>) -> Self {
        Self {
            connection,
            protocol_id: protocol_id.into(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from `path`, falling back to [`DeviceConfig::default`] when the
    /// file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No device config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::ConfigFile {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::from_json(&json)?;
        debug!(
            "Loaded device config: {} over {}",
            config.protocol_id,
            config.connection.kind.as_str()
        );
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn protocol(&self) -> &'static ProtocolDescriptor {
        weighlink_core::get_protocol(&self.protocol_id)
    }
}
