//! Serial transport
//!
//! Scales and label printers are sensitive to fragmented writes, so `send`
//! only returns once the written bytes have been drained to the wire.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, trace, warn};
use weighlink_types::{
    ConnectionConfig, DataBits, Parity, SerialSettings, StopBits, TransportKind,
};

use crate::{error::*, ConnectionState, ConnectionStrategy};

/// An open serial device
#[async_trait]
pub trait SerialLink: Send {
    /// Hand bytes to the driver
    async fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Wait until everything written has been transmitted
    async fn drain(&mut self) -> io::Result<()>;

    async fn read(&mut self, buf: &mut BytesMut) -> io::Result<usize>;

    /// Whether the device handle is still open
    fn is_open(&self) -> bool {
        true
    }
}

/// Opens serial devices; separates the strategy from the OS backend
pub trait SerialOpener: Send {
    type Link: SerialLink;

    fn open(&self, settings: &SerialSettings) -> Result<Self::Link>;
}

/// Opens OS serial ports through `tokio-serial`
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSerial;

impl SerialOpener for NativeSerial {
    type Link = SerialStream;

    fn open(&self, settings: &SerialSettings) -> Result<SerialStream> {
        tokio_serial::new(&settings.path, settings.baud_rate)
            .parity(parity(settings.parity))
            .data_bits(data_bits(settings.data_bits))
            .stop_bits(stop_bits(settings.stop_bits))
            .open_native_async()
            .map_err(|source| Error::Open {
                path: settings.path.clone(),
                source,
            })
    }
}

#[async_trait]
impl SerialLink for SerialStream {
    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.write_all(data).await
    }

    async fn drain(&mut self) -> io::Result<()> {
        // Flushing a tty blocks on tcdrain
        self.flush().await
    }

    async fn read(&mut self, buf: &mut BytesMut) -> io::Result<usize> {
        self.read_buf(buf).await
    }
}

fn parity(parity: Parity) -> tokio_serial::Parity {
    match parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Odd => tokio_serial::Parity::Odd,
        Parity::Even => tokio_serial::Parity::Even,
    }
}

fn data_bits(bits: DataBits) -> tokio_serial::DataBits {
    match bits {
        DataBits::Five => tokio_serial::DataBits::Five,
        DataBits::Six => tokio_serial::DataBits::Six,
        DataBits::Seven => tokio_serial::DataBits::Seven,
        DataBits::Eight => tokio_serial::DataBits::Eight,
    }
}

fn stop_bits(bits: StopBits) -> tokio_serial::StopBits {
    match bits {
        StopBits::One => tokio_serial::StopBits::One,
        StopBits::Two => tokio_serial::StopBits::Two,
    }
}

/// Serial strategy
///
/// Nothing is opened on construction; the port is opened by `connect`.
pub struct SerialStrategy<O: SerialOpener = NativeSerial> {
    opener: O,
    port: Option<O::Link>,
    path: Option<String>,
    state: ConnectionState,
}

impl SerialStrategy<NativeSerial> {
    /// Create new serial strategy using the OS serial driver
    pub fn new() -> Self {
        Self::with_opener(NativeSerial)
    }
}

impl Default for SerialStrategy<NativeSerial> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: SerialOpener> SerialStrategy<O> {
    pub fn with_opener(opener: O) -> Self {
        Self {
            opener,
            port: None,
            path: None,
            state: ConnectionState::Disconnected,
        }
    }

    fn teardown(&mut self) {
        self.port = None;
        self.state = ConnectionState::Disconnected;
    }
}

#[async_trait]
impl<O: SerialOpener> ConnectionStrategy for SerialStrategy<O> {
    async fn connect(&mut self, config: &ConnectionConfig) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let settings = config.serial_settings()?;
        self.path = Some(settings.path.clone());
        self.state = ConnectionState::Connecting;

        debug!(
            baud_rate = settings.baud_rate,
            parity = ?settings.parity,
            data_bits = ?settings.data_bits,
            stop_bits = ?settings.stop_bits,
            "Opening serial port {}...",
            settings.path
        );

        match self.opener.open(&settings) {
            Ok(port) => {
                self.port = Some(port);
                self.state = ConnectionState::Connected;
                debug!("Serial port {} open", settings.path);
                Ok(())
            }
            Err(e) => {
                self.port = None;
                self.state = ConnectionState::Disconnected;
                warn!("Failed to open {}: {}", settings.path, e);
                Err(e)
            }
        }
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.port.is_some() {
            debug!("Closed serial port {}", self.target());
        }
        self.teardown();
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        trace!("Sending {} bytes: {:02X?}", data.len(), &data[..data.len().min(16)]);

        let written = match port.write(data).await {
            Ok(()) => port.drain().await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            warn!("Write to {} failed: {}", self.target(), e);
            self.teardown();
            return Err(e.into());
        }

        Ok(())
    }

    async fn receive(&mut self, timeout_duration: Duration) -> Result<BytesMut> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        let mut buf = BytesMut::with_capacity(256);

        let result = timeout(timeout_duration, port.read(&mut buf)).await;
        let n = match result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                warn!("Read from {} failed: {}", self.target(), e);
                self.teardown();
                return Err(Error::Io(e));
            }
            Err(_) => return Err(Error::ReadTimeout),
        };

        if n == 0 {
            debug!("{} reported end of stream", self.target());
            self.teardown();
            return Err(Error::ConnectionClosed);
        }

        trace!("Received {} bytes: {:02X?}", n, &buf[..n.min(16)]);

        Ok(buf)
    }

    fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
            && self.port.as_ref().is_some_and(|port| port.is_open())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Serial
    }

    fn target(&self) -> String {
        self.path.clone().unwrap_or_else(|| "<unconfigured>".to_string())
    }
}
