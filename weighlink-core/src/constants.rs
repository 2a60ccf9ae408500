//! Protocol constants

/// Massa-K Protocol 100 constants
pub mod massak100 {
    /// Synchronization header
    pub const HEADER: [u8; 3] = [0xF8, 0x55, 0xCE];

    /// Fixed size of a weight response record
    pub const RECORD_LEN: usize = 14;

    /// Command: request current weight
    pub const CMD_GET_WEIGHT: u8 = 0xA0;

    /// Command code carried by weight responses
    pub const CMD_ACK_WEIGHT: u8 = 0x10;

    /// Stable-flag value meaning "settled"
    pub const STABLE: u8 = 1;
}

/// Massa-K "J" (SimplePacking) constants
pub mod massak_j {
    /// Fixed frame size
    pub const FRAME_LEN: usize = 5;

    /// Offset of the little-endian 16-bit gram count
    pub const WEIGHT_OFFSET: usize = 2;
}

/// Grams per kilogram
pub const GRAMS_PER_KG: f64 = 1000.0;

/// ASCII control bytes used in request commands
pub mod ascii {
    /// Enquiry
    pub const ENQ: u8 = 0x05;

    /// Start of text
    pub const STX: u8 = 0x02;
}
