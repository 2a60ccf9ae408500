//! TCP transport

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};
use weighlink_types::{ConnectionConfig, TransportKind};

use crate::{error::*, ConnectionState, ConnectionStrategy};

/// Fixed connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);

/// TCP strategy for network scales and raw-port printers
///
/// The connect timeout only applies while connecting; an established
/// connection has no idle timeout.
pub struct TcpStrategy {
    target: Option<String>,
    stream: Option<TcpStream>,
    state: ConnectionState,
    connect_timeout: Duration,
    /// Set once the socket reported a pending error
    broken: AtomicBool,
}

impl TcpStrategy {
    /// Create new TCP strategy
    pub fn new() -> Self {
        Self {
            target: None,
            stream: None,
            state: ConnectionState::Disconnected,
            connect_timeout: CONNECT_TIMEOUT,
            broken: AtomicBool::new(false),
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Resolve and connect, without any timeout
    async fn open(addr: &str) -> Result<TcpStream> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(addr)
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr, e)))?
            .collect();

        let socket_addr = addrs
            .first()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr)))?;

        let stream = TcpStream::connect(socket_addr)
            .await
            .map_err(|source| Error::Connect {
                addr: addr.to_string(),
                source,
            })?;

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(stream)
    }

    /// Await `connecting` within the connect timeout and take the stream
    async fn establish<F>(&mut self, addr: &str, connecting: F) -> Result<()>
    where
        F: Future<Output = Result<TcpStream>> + Send,
    {
        let stream = match timeout(self.connect_timeout, connecting).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                self.teardown();
                return Err(e);
            }
            Err(_) => {
                self.teardown();
                warn!("Connection to {} timed out", addr);
                return Err(Error::ConnectionTimeout {
                    millis: self.connect_timeout.as_millis() as u64,
                });
            }
        };

        debug!("Connected to {}", addr);

        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    fn teardown(&mut self) {
        self.stream = None;
        self.state = ConnectionState::Disconnected;
        self.broken.store(false, Ordering::Release);
    }
}

impl Default for TcpStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionStrategy for TcpStrategy {
    async fn connect(&mut self, config: &ConnectionConfig) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        // Stale socket from a dropped peer
        self.teardown();

        let addr = format!("{}:{}", config.require_host()?, config.tcp_port());
        self.target = Some(addr.clone());
        self.state = ConnectionState::Connecting;

        debug!("Connecting to {}...", addr);
        self.establish(&addr, Self::open(&addr)).await
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Disconnecting from {}...", self.target());

            // Graceful shutdown
            let _ = stream.shutdown().await;
        }

        self.teardown();
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!("Sending {} bytes: {:02X?}", data.len(), &data[..data.len().min(16)]);

        if let Err(e) = stream.write_all(data).await {
            warn!("Write to {} failed: {}", self.target(), e);
            self.teardown();
            return Err(e.into());
        }

        Ok(())
    }

    async fn receive(&mut self, timeout_duration: Duration) -> Result<BytesMut> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let mut buf = BytesMut::with_capacity(1024);

        let result = timeout(timeout_duration, stream.read_buf(&mut buf)).await;
        let n = match result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                self.teardown();
                return Err(Error::Io(e));
            }
            Err(_) => return Err(Error::ReadTimeout),
        };

        if n == 0 {
            debug!("{} closed the connection", self.target());
            self.teardown();
            return Err(Error::ConnectionClosed);
        }

        trace!("Received {} bytes: {:02X?}", n, &buf[..n.min(16)]);

        Ok(buf)
    }

    fn is_connected(&self) -> bool {
        let Some(stream) = self.stream.as_ref() else {
            return false;
        };

        if self.state != ConnectionState::Connected || self.broken.load(Ordering::Acquire) {
            return false;
        }

        match stream.take_error() {
            Ok(None) => true,
            _ => {
                self.broken.store(true, Ordering::Release);
                false
            }
        }
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Tcp
    }

    fn target(&self) -> String {
        self.target.clone().unwrap_or_else(|| "<unconfigured>".to_string())
    }
}

impl Drop for TcpStrategy {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("TCP strategy dropped while still connected");
        }
    }
}
