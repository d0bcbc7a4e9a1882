use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default UDP port messages are sent to
pub const DEFAULT_PORT: u16 = 4321;

/// Largest payload a UDP datagram over IPv4 can carry
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Configuration for a [`Listener`](super::Listener)
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerConfig {
    /// Local address to bind
    pub bind_address: IpAddr,
    /// Local port to bind (0 picks a free port)
    pub port: u16,
    /// Receive buffer size; longer datagrams are cut and fail to decode
    pub max_datagram_size: usize,
    /// How long one receive call waits before giving up
    pub read_timeout: Duration,
    /// Frames buffered for a background consumer before new ones are dropped
    pub channel_capacity: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_datagram_size: MAX_DATAGRAM_SIZE,
            read_timeout: Duration::from_millis(200),
            channel_capacity: 16,
        }
    }
}

impl ListenerConfig {
    /// Listen on `127.0.0.1` with an OS-assigned port
    pub fn localhost() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn with_bind_address(mut self, address: IpAddr) -> Self {
        self.bind_address = address;
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the receive buffer size (at least one header token)
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size.max(crate::stream::TOKEN_SIZE);
        self
    }

    /// Set the receive timeout (zero is raised to one millisecond)
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout.max(Duration::from_millis(1));
        self
    }

    /// Set the frame queue capacity (at least one)
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Socket address built from the bind address and port
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}
