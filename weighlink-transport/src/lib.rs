//! Transport layer for weighlink
//!
//! Provides serial, TCP and print-spooler connection strategies behind one
//! lifecycle contract.

pub mod error;
pub mod serial;
pub mod spooler;
pub mod tcp;

pub use error::{Error, ErrorCategory, Result};
pub use serial::{NativeSerial, SerialLink, SerialOpener, SerialStrategy};
pub use spooler::SpoolerStrategy;
pub use tcp::TcpStrategy;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use weighlink_types::{ConnectionConfig, TransportKind};

/// Lifecycle of a strategy instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Connection strategy over one physical transport
///
/// An instance expects at most one operation in flight; callers serialize
/// `connect`, `send` and `disconnect` themselves. Nothing reconnects
/// implicitly.
#[async_trait]
pub trait ConnectionStrategy: Send {
    /// Establish the transport
    ///
    /// Succeeds without side effects when already connected.
    async fn connect(&mut self, config: &ConnectionConfig) -> Result<()>;

    /// Tear the transport down
    ///
    /// Always succeeds, also when not connected.
    async fn disconnect(&mut self) -> Result<()>;

    /// Write a command, failing with [`Error::NotConnected`] if no live
    /// transport exists
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive whatever bytes arrive next
    async fn receive(&mut self, _timeout: Duration) -> Result<BytesMut> {
        Err(Error::Unsupported {
            transport: self.kind().as_str(),
            operation: "receive",
        })
    }

    /// Check tracked state and transport liveness
    fn is_connected(&self) -> bool;

    fn state(&self) -> ConnectionState;

    fn kind(&self) -> TransportKind;

    /// Human-readable target (path, address or printer name)
    fn target(&self) -> String;
}
