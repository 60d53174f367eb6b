//! Collector uplink session I/O
//!
//! Owns the TCP socket to the telemetry collector. The session state
//! machine lives in ecodash-core; this module performs the actual
//! handshake (resolve, connect, hello line), the per-tick send, and the
//! teardown. Every failure path aborts the socket so the next handshake
//! starts from a cleanly closed connection.

use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, Stack};
use embassy_time::Duration;
use embedded_io_async::Write;

use ecodash_core::config::CollectorConfig;
use ecodash_core::telemetry::TelemetrySnapshot;
use ecodash_protocol::collector;

/// Socket inactivity timeout; bounds how long an unresponsive collector
/// can stall a handshake or send
const SOCKET_TIMEOUT_S: u64 = 5;

/// Errors from the collector connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum UplinkError {
    /// Host name did not resolve
    NoRoute,
    /// TCP connect was refused or timed out
    ConnectFailed,
    /// Line encoding or socket write failed
    Io,
}

/// Client side of the persistent collector connection
pub struct CollectorClient {
    stack: Stack<'static>,
    socket: TcpSocket<'static>,
}

impl CollectorClient {
    /// Create the client; the socket is reused across reconnects
    pub fn new(
        stack: Stack<'static>,
        rx_buffer: &'static mut [u8],
        tx_buffer: &'static mut [u8],
    ) -> Self {
        let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT_S)));
        Self { stack, socket }
    }

    /// O(1) liveness probe: can the connection still carry data?
    pub fn is_live(&self) -> bool {
        self.socket.may_send()
    }

    /// Drop the connection immediately; safe to call when already closed
    pub fn teardown(&mut self) {
        self.socket.abort();
    }

    /// Run the handshake: resolve, connect, introduce ourselves
    pub async fn handshake(&mut self, config: &CollectorConfig) -> Result<(), UplinkError> {
        match self.connect_and_hello(config).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.socket.abort();
                Err(err)
            }
        }
    }

    async fn connect_and_hello(&mut self, config: &CollectorConfig) -> Result<(), UplinkError> {
        let address = self.resolve(config.host.as_str()).await?;

        self.socket
            .connect((address, config.port))
            .await
            .map_err(|_| UplinkError::ConnectFailed)?;

        let hello =
            collector::hello_line(config.device.as_str()).map_err(|_| UplinkError::Io)?;
        self.socket
            .write_all(hello.as_bytes())
            .await
            .map_err(|_| UplinkError::Io)?;

        Ok(())
    }

    /// Resolve an IPv4 literal locally, anything else via DNS
    async fn resolve(&self, host: &str) -> Result<IpAddress, UplinkError> {
        if let Ok(address) = host.parse::<core::net::Ipv4Addr>() {
            return Ok(IpAddress::from(address));
        }

        let addresses = self
            .stack
            .dns_query(host, DnsQueryType::A)
            .await
            .map_err(|_| UplinkError::NoRoute)?;
        addresses.first().copied().ok_or(UplinkError::NoRoute)
    }

    /// Send one telemetry report line
    pub async fn send(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), UplinkError> {
        let line = collector::report_line(snapshot.speed, snapshot.ground_speed.as_str())
            .map_err(|_| UplinkError::Io)?;

        match self.socket.write_all(line.as_bytes()).await {
            Ok(()) => Ok(()),
            Err(_) => {
                self.socket.abort();
                Err(UplinkError::Io)
            }
        }
    }
}
