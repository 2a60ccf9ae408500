//! Error types for weighlink-core
//!
//! None of these escape a descriptor's `parse`; binary decoders return them
//! internally and the descriptor logs them and reports "no reading".

/// Result type alias for weighlink-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame is shorter than its fixed layout; more bytes may still arrive
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// No synchronization header in the scanned bytes
    #[error("Frame header not found in {scanned} bytes")]
    HeaderNotFound {
        scanned: usize,
    },

    /// Checksum verification failed
    #[error("Checksum mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    ChecksumMismatch {
        expected: u16,
        received: u16,
    },

    /// Protocol id not present in the registry
    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),
}

impl Error {
    /// Check if waiting for more bytes might turn this into a valid frame
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::FrameTooShort { .. })
    }
}
