//! High-level scale interface

use std::time::Duration;

use bytes::{Buf, BytesMut};
use tracing::{debug, info, trace};

use weighlink_core::{Payload, ProtocolDescriptor, Reading};
use weighlink_transport::{
    ConnectionStrategy, SerialStrategy, SpoolerStrategy, TcpStrategy,
};
use weighlink_types::{ConnectionConfig, TransportKind};

use crate::config::DeviceConfig;
use crate::error::{Error, Result};

/// Default wait for the next chunk in [`Scale::read_reading`]
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Bytes kept while waiting for a complete reading
pub const RX_CAPACITY: usize = 256;

/// Fresh strategy for a transport kind
pub fn strategy_for(kind: TransportKind) -> Box<dyn ConnectionStrategy> {
    match kind {
        TransportKind::Serial => Box::new(SerialStrategy::new()),
        TransportKind::Tcp => Box::new(TcpStrategy::new()),
        TransportKind::Spooler => Box::new(SpoolerStrategy::new()),
    }
}

/// One scale: a connection strategy bound to a protocol descriptor
///
/// The handle performs single steps only. Deciding when to poll, retrying
/// and smoothing readings belong to the caller.
///
/// # Examples
///
/// ```no_run
/// use weighlink::{ConnectionConfig, Scale};
///
/// #[tokio::main]
/// async fn main() -> weighlink::Result<()> {
///     let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "massak_100");
///     scale.connect().await?;
///
///     scale.request_weight().await?;
///     if let Some(reading) = scale.read_reading().await? {
///         println!("{}", reading);
///     }
///
///     scale.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Scale {
    strategy: Box<dyn ConnectionStrategy>,
    protocol: &'static ProtocolDescriptor,
    config: ConnectionConfig,
    read_timeout: Duration,
    rx: BytesMut,
}

impl Scale {
    /// Create a scale for `protocol_id`, unknown ids resolving to the generic
    /// protocol
    ///
    /// Serial line settings missing from `config` are taken from the
    /// protocol.
    pub fn new(config: ConnectionConfig, protocol_id: &str) -> Self {
        let protocol = weighlink_core::get_protocol(protocol_id);
        Self {
            strategy: strategy_for(config.kind),
            config: config.with_line_defaults(protocol.line),
            protocol,
            read_timeout: DEFAULT_READ_TIMEOUT,
            rx: BytesMut::with_capacity(RX_CAPACITY),
        }
    }

    pub fn from_config(device: &DeviceConfig) -> Self {
        Self::new(device.connection.clone(), &device.protocol_id)
    }

    /// Replace the transport strategy
    pub fn with_transport(mut self, strategy: Box<dyn ConnectionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn protocol(&self) -> &'static ProtocolDescriptor {
        self.protocol
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.strategy.is_connected()
    }

    pub async fn connect(&mut self) -> Result<()> {
        info!(
            "Connecting to {} scale over {}...",
            self.protocol.id,
            self.config.kind
        );

        self.strategy.connect(&self.config).await?;
        self.rx.clear();

        info!("Connected to {}", self.strategy.target());
        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<()> {
        self.strategy.disconnect().await?;
        self.rx.clear();
        debug!("Disconnected");
        Ok(())
    }

    /// Send the weight request
    ///
    /// Streaming protocols need none; this is then a no-op.
    pub async fn request_weight(&mut self) -> Result<()> {
        if !self.protocol.polling_required {
            trace!("{} streams readings, not polling", self.protocol.id);
            return Ok(());
        }

        let command = self.protocol.weight_command().ok_or(Error::NotSupported {
            protocol: self.protocol.id.as_str(),
            operation: "weight",
        })?;
        self.send_command(&command).await
    }

    pub async fn zero(&mut self) -> Result<()> {
        let command = self.protocol.zero_command().ok_or(Error::NotSupported {
            protocol: self.protocol.id.as_str(),
            operation: "zero",
        })?;
        self.send_command(&command).await
    }

    pub async fn tare(&mut self) -> Result<()> {
        let command = self.protocol.tare_command().ok_or(Error::NotSupported {
            protocol: self.protocol.id.as_str(),
            operation: "tare",
        })?;
        self.send_command(&command).await
    }

    /// Receive one chunk and try to decode the buffered bytes
    ///
    /// `Ok(None)` means no complete reading yet.
    pub async fn read_reading(&mut self) -> Result<Option<Reading>> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let chunk = self.strategy.receive(self.read_timeout).await?;
        trace!("Received {} bytes", chunk.len());

        Ok(self.feed(&chunk))
    }

    /// Decode bytes obtained outside the strategy
    ///
    /// Data accumulates until a reading parses, at most [`RX_CAPACITY`]
    /// bytes with the oldest dropped first. For text protocols, complete
    /// lines that yield no reading (such as SICS `S I`) are discarded so
    /// the next response can parse.
    pub fn feed(&mut self, data: &[u8]) -> Option<Reading> {
        self.rx.extend_from_slice(data);
        if self.rx.len() > RX_CAPACITY {
            let excess = self.rx.len() - RX_CAPACITY;
            self.rx.advance(excess);
        }

        if let Some(reading) = self.protocol.parse(Payload::Bytes(&self.rx)) {
            debug!("Reading: {}", reading);
            self.rx.clear();
            return Some(reading);
        }

        if self.protocol.is_binary() {
            return None;
        }

        // Keep only the trailing partial line, after trying the newest
        // complete one on its own
        let complete = self.rx.iter().rposition(|&b| is_line_end(b))? + 1;
        let reading = self.rx[..complete]
            .split(|&b| is_line_end(b))
            .filter(|line| !line.is_empty())
            .next_back()
            .and_then(|line| self.protocol.parse(Payload::Bytes(line)));

        trace!("Discarding {} bytes of complete lines", complete);
        self.rx.advance(complete);

        if let Some(reading) = &reading {
            debug!("Reading: {}", reading);
        }
        reading
    }

    /// Bytes buffered without a reading so far
    pub fn pending(&self) -> &[u8] {
        &self.rx
    }

    async fn send_command(&mut self, command: &[u8]) -> Result<()> {
        trace!("Sending {} command bytes", command.len());
        self.strategy.send(command).await?;
        Ok(())
    }
}

fn is_line_end(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use weighlink_core::ProtocolId;
    use weighlink_transport::ConnectionState;
    use weighlink_types::{Parity, Unit};

    #[derive(Default)]
    struct Wire {
        sent: Vec<Vec<u8>>,
        inbound: VecDeque<Vec<u8>>,
        config: Option<ConnectionConfig>,
    }

    struct FakeStrategy {
        wire: Arc<Mutex<Wire>>,
        state: ConnectionState,
    }

    fn fake() -> (Box<dyn ConnectionStrategy>, Arc<Mutex<Wire>>) {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let strategy = FakeStrategy {
            wire: wire.clone(),
            state: ConnectionState::Disconnected,
        };
        (Box::new(strategy), wire)
    }

    #[async_trait]
    impl ConnectionStrategy for FakeStrategy {
        async fn connect(&mut self, config: &ConnectionConfig) -> weighlink_transport::Result<()> {
            self.wire.lock().unwrap().config = Some(config.clone());
            self.state = ConnectionState::Connected;
            Ok(())
        }

        async fn disconnect(&mut self) -> weighlink_transport::Result<()> {
            self.state = ConnectionState::Disconnected;
            Ok(())
        }

        async fn send(&mut self, data: &[u8]) -> weighlink_transport::Result<()> {
            if self.state != ConnectionState::Connected {
                return Err(weighlink_transport::Error::NotConnected);
            }
            self.wire.lock().unwrap().sent.push(data.to_vec());
            Ok(())
        }

        async fn receive(&mut self, _timeout: Duration) -> weighlink_transport::Result<BytesMut> {
            self.wire
                .lock()
                .unwrap()
                .inbound
                .pop_front()
                .map(|chunk| BytesMut::from(&chunk[..]))
                .ok_or(weighlink_transport::Error::ReadTimeout)
        }

        fn is_connected(&self) -> bool {
            self.state == ConnectionState::Connected
        }

        fn state(&self) -> ConnectionState {
            self.state
        }

        fn kind(&self) -> TransportKind {
            TransportKind::Serial
        }

        fn target(&self) -> String {
            "fake".to_string()
        }
    }

    const FRAME: [u8; 14] = [
        0xF8, 0x55, 0xCE, 0x07, 0x00, 0x10, 0xD0, 0x07, 0x00, 0x00, 0x00, 0x01, 0x5A, 0x91,
    ];

    #[tokio::test]
    async fn test_connect_applies_protocol_line_settings() {
        let (strategy, wire) = fake();
        let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "massak_100")
            .with_transport(strategy);

        scale.connect().await.unwrap();
        assert!(scale.is_connected());

        let config = wire.lock().unwrap().config.clone().unwrap();
        assert_eq!(config.baud_rate, Some(19200));
        assert_eq!(config.parity, Some(Parity::Even));
    }

    #[test]
    fn test_explicit_line_settings_win() {
        let config = ConnectionConfig::serial("/dev/ttyUSB0").with_baud_rate(9600);
        let scale = Scale::new(config, "massak_100");

        assert_eq!(scale.config().baud_rate, Some(9600));
        assert_eq!(scale.config().parity, Some(Parity::Even));
    }

    #[tokio::test]
    async fn test_request_and_read_protocol_100() {
        let (strategy, wire) = fake();
        let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "massak_100")
            .with_transport(strategy);
        scale.connect().await.unwrap();

        scale.request_weight().await.unwrap();
        assert_eq!(
            wire.lock().unwrap().sent,
            vec![vec![0xF8, 0x55, 0xCE, 0x01, 0x00, 0xA0, 0x20, 0x78]]
        );

        // Frame split across two reads
        wire.lock().unwrap().inbound.extend([FRAME[..6].to_vec(), FRAME[6..].to_vec()]);

        assert_eq!(scale.read_reading().await.unwrap(), None);
        assert_eq!(scale.pending().len(), 6);

        let reading = scale.read_reading().await.unwrap().unwrap();
        assert_eq!(reading, Reading::kg(2.0, true));
        assert!(scale.pending().is_empty());
    }

    #[tokio::test]
    async fn test_streaming_protocol_sends_nothing() {
        let (strategy, wire) = fake();
        let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "massak_cont")
            .with_transport(strategy);
        scale.connect().await.unwrap();

        scale.request_weight().await.unwrap();
        assert!(wire.lock().unwrap().sent.is_empty());
    }

    #[tokio::test]
    async fn test_zero_and_tare() {
        let (strategy, wire) = fake();
        let mut scale = Scale::new(ConnectionConfig::tcp("10.0.0.5", 4001), "mettler_sics")
            .with_transport(strategy);
        scale.connect().await.unwrap();

        scale.zero().await.unwrap();
        scale.tare().await.unwrap();
        assert_eq!(
            wire.lock().unwrap().sent,
            vec![b"Z\r\n".to_vec(), b"T\r\n".to_vec()]
        );

        let mut cas = Scale::new(ConnectionConfig::tcp("10.0.0.5", 4001), "cas_simple");
        let err = cas.zero().await.unwrap_err();
        assert!(matches!(err, Error::NotSupported { operation: "zero", .. }));
    }

    #[tokio::test]
    async fn test_send_requires_connect() {
        let (strategy, _wire) = fake();
        let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "cas_simple")
            .with_transport(strategy);

        let err = scale.request_weight().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(weighlink_transport::Error::NotConnected)
        ));
        assert!(matches!(scale.read_reading().await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_read_timeout_surfaces() {
        let (strategy, _wire) = fake();
        let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "generic")
            .with_transport(strategy);
        scale.connect().await.unwrap();

        let err = scale.read_reading().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(weighlink_transport::Error::ReadTimeout)
        ));
    }

    #[test]
    fn test_feed_text_protocol() {
        let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "mettler_sics");

        assert_eq!(scale.feed(b"S S "), None);
        let reading = scale.feed(b"    1.250 g\r\n").unwrap();

        assert_eq!(reading, Reading::new(1.25, Unit::G, true));
        assert!(scale.pending().is_empty());
    }

    #[test]
    fn test_feed_recovers_after_invalid_line() {
        let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "mettler_sics");

        assert_eq!(scale.feed(b"S I\r\n"), None);
        assert!(scale.pending().is_empty());

        let reading = scale.feed(b"S S    1.250 g\r\n").unwrap();
        assert_eq!(reading, Reading::new(1.25, Unit::G, true));
    }

    #[test]
    fn test_feed_newest_line_in_one_chunk() {
        let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "mettler_sics");

        let reading = scale.feed(b"S I\r\nS D    0.500 kg\r\nS S").unwrap();
        assert_eq!(reading, Reading::kg(0.5, false));
        assert_eq!(scale.pending(), b"S S");

        let reading = scale.feed(b"    0.750 kg\r\n").unwrap();
        assert_eq!(reading, Reading::kg(0.75, true));
    }

    #[test]
    fn test_feed_binary_keeps_partial_frame() {
        let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "massak_100");

        // 0x0D inside a binary frame is not a line end
        assert_eq!(scale.feed(&[0x00, 0x0D, 0x0A, 0xF8, 0x55, 0xCE, 0x07]), None);
        assert_eq!(scale.pending().len(), 7);
    }

    #[test]
    fn test_feed_is_bounded() {
        let mut scale = Scale::new(ConnectionConfig::serial("/dev/ttyUSB0"), "massak_100");

        for _ in 0..10 {
            assert_eq!(scale.feed(&[0u8; 100]), None);
        }
        assert_eq!(scale.pending().len(), RX_CAPACITY);

        assert_eq!(scale.feed(&FRAME), Some(Reading::kg(2.0, true)));
    }

    #[test]
    fn test_unknown_protocol_is_generic() {
        let scale = Scale::new(ConnectionConfig::tcp("10.0.0.5", 9100), "acme_9000");
        assert_eq!(scale.protocol().id, ProtocolId::Generic);
        assert!(!scale.is_connected());
    }
}
