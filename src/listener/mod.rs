//! UDP message reception
//!
//! Each datagram carries exactly one message. [`Listener`] receives a
//! datagram, decodes it with a fresh [`Decoder`] tagged with the running frame
//! number, and returns the result as a [`Frame`]. Messages that fail to decode
//! are logged, counted and dropped: the next datagram supersedes them anyway.
//!
//! ```text
//! ┌──────────┐  datagram   ┌──────────┐  Frame   ┌───────────────────────┐
//! │  sender  │ ──────────▶ │ Listener │ ───────▶ │ latest() / frames()   │
//! └──────────┘             │ (thread) │          │ Arc<Table> snapshots  │
//!                          └──────────┘          └───────────────────────┘
//! ```
//!
//! [`Listener::spawn`] moves the receive loop onto a background thread; see
//! [`ListenerHandle`].

mod config;
mod handle;

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::decoder::Decoder;
use crate::table::Table;

pub use config::{ListenerConfig, DEFAULT_PORT, MAX_DATAGRAM_SIZE};
pub use handle::ListenerHandle;

/// Errors that can occur while receiving messages
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: SocketAddr,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// I/O error on the bound socket
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The background receive thread panicked
    #[error("Listener thread panicked")]
    ThreadPanicked,
}

/// One successfully decoded message
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame number: position of the datagram among all received datagrams
    pub sequence: u64,
    /// Sender of the datagram
    pub source: SocketAddr,
    /// Time the datagram was received
    pub received_at: DateTime<Utc>,
    /// Decoded message, shared read-only between consumers
    pub table: Arc<Table>,
}

/// Counters kept by a listener
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListenerStats {
    /// Datagrams read from the socket
    pub datagrams_received: u64,
    /// Bytes read from the socket
    pub bytes_received: u64,
    /// Datagrams decoded into frames
    pub frames_decoded: u64,
    /// Datagrams shorter than their declared count
    pub truncated: u64,
    /// Datagrams with inconsistent structure
    pub malformed: u64,
}

impl ListenerStats {
    /// Datagrams that did not produce a frame
    pub fn discarded(&self) -> u64 {
        self.truncated + self.malformed
    }
}

/// Blocking UDP receiver that decodes one message per datagram
pub struct Listener {
    socket: UdpSocket,
    config: ListenerConfig,
    buffer: Vec<u8>,
    stats: ListenerStats,
}

impl Listener {
    /// Bind a socket according to `config`
    pub fn bind(config: ListenerConfig) -> Result<Self, ListenerError> {
        let addr = config.socket_addr();
        let socket = UdpSocket::bind(addr).map_err(|source| ListenerError::Bind { addr, source })?;
        socket.set_read_timeout(Some(config.read_timeout))?;

        info!("Listening for messages on {}", socket.local_addr()?);

        Ok(Self {
            socket,
            buffer: vec![0u8; config.max_datagram_size],
            config,
            stats: ListenerStats::default(),
        })
    }

    /// Address the socket is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        Ok(self.socket.local_addr()?)
    }

    /// Configuration the listener was bound with
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Counters so far
    pub fn stats(&self) -> ListenerStats {
        self.stats
    }

    /// Wait for one datagram and decode it
    ///
    /// Returns `Ok(None)` if the read timed out or the datagram was
    /// discarded as undecodable.
    pub fn poll_frame(&mut self) -> Result<Option<Frame>, ListenerError> {
        let (len, source) = match self.socket.recv_from(&mut self.buffer) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let datagram = std::mem::take(&mut self.buffer);
        let frame = self.handle_datagram(&datagram[..len], source);
        self.buffer = datagram;
        Ok(frame)
    }

    /// Block until a datagram decodes into a frame
    pub fn next_frame(&mut self) -> Result<Frame, ListenerError> {
        loop {
            if let Some(frame) = self.poll_frame()? {
                return Ok(frame);
            }
        }
    }

    /// Decode one received datagram, updating the counters
    pub fn handle_datagram(&mut self, bytes: &[u8], source: SocketAddr) -> Option<Frame> {
        let sequence = self.stats.datagrams_received;
        self.stats.datagrams_received += 1;
        self.stats.bytes_received += bytes.len() as u64;

        match Decoder::with_frame(sequence).decode(bytes) {
            Ok(table) => {
                self.stats.frames_decoded += 1;
                debug!(
                    "Frame {} from {}: {} top-level fields",
                    sequence,
                    source,
                    table.child_names().len()
                );
                Some(Frame {
                    sequence,
                    source,
                    received_at: Utc::now(),
                    table: Arc::new(table),
                })
            }
            Err(e) => {
                if e.is_truncation() {
                    self.stats.truncated += 1;
                } else {
                    self.stats.malformed += 1;
                }
                warn!("Discarding frame {} from {}: {}", sequence, source, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("local_addr", &self.socket.local_addr().ok())
            .field("stats", &self.stats)
            .finish()
    }
}
