//! Transport errors

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Who has to act on a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Required configuration is missing or malformed
    Misconfiguration,

    /// The device, driver or helper could not be found or opened
    Environment,

    /// The device side misbehaved: timeout, closed link, helper failure
    Device,

    /// The strategy was used in the wrong state
    Usage,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] weighlink_types::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to open serial port {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: tokio_serial::Error,
    },

    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Print helper not found (searched {searched:?})")]
    HelperNotFound {
        searched: Vec<PathBuf>,
    },

    #[error("Failed to start print helper {path:?}: {source}")]
    HelperSpawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Connection timed out after {millis} ms")]
    ConnectionTimeout {
        millis: u64,
    },

    #[error("Print helper failed with code {code:?}: {stderr}")]
    HelperFailed {
        code: Option<i32>,
        stderr: String,
    },

    #[error("Read timeout")]
    ReadTimeout,

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("Not connected")]
    NotConnected,

    #[error("{transport} transport does not support {operation}")]
    Unsupported {
        transport: &'static str,
        operation: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify the failure for operator-facing reporting
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) | Self::InvalidAddress(_) => ErrorCategory::Misconfiguration,
            Self::Open { .. }
            | Self::Connect { .. }
            | Self::HelperNotFound { .. }
            | Self::HelperSpawn { .. } => ErrorCategory::Environment,
            Self::ConnectionTimeout { .. }
            | Self::HelperFailed { .. }
            | Self::ReadTimeout
            | Self::ConnectionClosed
            | Self::Io(_) => ErrorCategory::Device,
            Self::NotConnected | Self::Unsupported { .. } => ErrorCategory::Usage,
        }
    }

    /// Check if the caller has to `connect` again before retrying
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::NotConnected | Self::ConnectionClosed | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let missing = Error::Config(weighlink_types::Error::MissingField {
            transport: "tcp",
            field: "host",
        });
        assert_eq!(missing.category(), ErrorCategory::Misconfiguration);

        let not_found = Error::HelperNotFound { searched: vec![] };
        assert_eq!(not_found.category(), ErrorCategory::Environment);

        let failed = Error::HelperFailed {
            code: Some(1),
            stderr: "printer offline".into(),
        };
        assert_eq!(failed.category(), ErrorCategory::Device);
        assert_eq!(
            failed.to_string(),
            "Print helper failed with code Some(1): printer offline"
        );

        assert_eq!(Error::ConnectionTimeout { millis: 3000 }.category(), ErrorCategory::Device);
        assert_eq!(Error::NotConnected.category(), ErrorCategory::Usage);
    }
}
