//! Type definitions for weighlink

pub mod config;
pub mod error;
pub mod reading;

pub use config::{
    ConnectionConfig, DataBits, LineSettings, Parity, SerialSettings, StopBits, TransportKind,
};
pub use error::{Error, Result};
pub use reading::{Reading, Unit};
