//! # weighlink
//!
//! Communication layer for industrial weighing scales and label printers.
//!
//! ## Features
//!
//! - Serial, TCP and OS print-spooler transports behind one async contract
//! - Protocol descriptors for CAS, Mettler-Toledo SICS, Shtrih-M, Mertech
//!   and the Massa-K family, decoding into one [`Reading`] type
//! - Immutable protocol registry with a generic fallback
//!
//! ## Quick Start
//!
//! ```no_run
//! use weighlink::{ConnectionConfig, Scale};
//!
//! #[tokio::main]
//! async fn main() -> weighlink::Result<()> {
//!     let mut scale = Scale::new(ConnectionConfig::tcp("192.168.1.50", 4001), "cas_simple");
//!     scale.connect().await?;
//!
//!     scale.request_weight().await?;
//!     if let Some(reading) = scale.read_reading().await? {
//!         println!("{}", reading);
//!     }
//!
//!     scale.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod scale;

// Re-exports
pub use config::DeviceConfig;
pub use error::{Error, ErrorCategory, Result};
pub use scale::{strategy_for, Scale};

pub use weighlink_core::registry::{self, ProtocolInfo};
pub use weighlink_core::{get_protocol, Payload, ProtocolDescriptor, ProtocolId};
pub use weighlink_transport::{
    ConnectionState, ConnectionStrategy, SerialStrategy, SpoolerStrategy, TcpStrategy,
};
pub use weighlink_types::{
    ConnectionConfig, DataBits, LineSettings, Parity, Reading, StopBits, TransportKind, Unit,
};
