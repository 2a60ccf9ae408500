//! High-level error types

use std::io;
use std::path::PathBuf;

pub use weighlink_transport::ErrorCategory;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] weighlink_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] weighlink_transport::Error),

    #[error("Configuration error: {0}")]
    Types(#[from] weighlink_types::Error),

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid device config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Scale not connected")]
    NotConnected,

    #[error("Protocol {protocol} has no {operation} command")]
    NotSupported {
        protocol: &'static str,
        operation: &'static str,
    },
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(e) => e.category(),
            Self::Types(_) | Self::ConfigFile { .. } | Self::ConfigParse(_) => {
                ErrorCategory::Misconfiguration
            }
            Self::Core(_) => ErrorCategory::Device,
            Self::NotConnected | Self::NotSupported { .. } => ErrorCategory::Usage,
        }
    }
}
