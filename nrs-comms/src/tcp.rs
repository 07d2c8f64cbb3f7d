//!
//! A Network Tcp-Based Route
//!
//! A Tcp route listens on a nonblocking listener for buffers sent by the
//! far end and opens a fresh connection to the far end for every buffer
//! it writes.  Each accepted connection carries exactly one buffer, which
//! is complete once the sender closes its end.
//!

use std::{
    io::{ErrorKind, Read, Write},
    net::{IpAddr, Shutdown, SocketAddr, TcpListener, TcpStream},
    time::Duration,
};

use tracing::warn;

use nrs_core::{CommsRoute, PortId, PreProcessor, TransportError};

use crate::BoxedPreProcessor;

/// How long an accepted connection may take to deliver its buffer
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// A route to another component over TCP
pub struct TcpRoute {
    /// The port of the owning component this route is attached to
    port: PortId,
    /// The listener for incoming buffers
    listener: TcpListener,
    /// Where outgoing buffers are sent
    peer: Option<SocketAddr>,
    /// The optional list of IPs buffers are accepted from
    pub whitelist: Option<Vec<IpAddr>>,
    /// The amount of time to block when sending a buffer
    write_timeout: Option<Duration>,
    /// The CID of the component at the far end
    connected_cid: Option<String>,
    /// Inspects messages decoded from this route
    pre_processor: Option<BoxedPreProcessor>,
}

impl TcpRoute {
    /// Bind a route to a local address.  Buffers cannot be sent until a
    /// peer is set.
    pub fn bind(port: PortId, bind_address: SocketAddr) -> Result<Self, TransportError> {
        let io_error = |source| TransportError::Io { port, source };
        let listener = TcpListener::bind(bind_address).map_err(io_error)?;
        listener.set_nonblocking(true).map_err(io_error)?;

        Ok(Self {
            port,
            listener,
            peer: None,
            whitelist: None,
            write_timeout: None,
            connected_cid: None,
            pre_processor: None,
        })
    }

    /// Bind a route and send to `peer`
    pub fn new(
        port: PortId,
        bind_address: SocketAddr,
        peer: SocketAddr,
    ) -> Result<Self, TransportError> {
        Ok(Self::bind(port, bind_address)?.with_peer(peer))
    }

    /// Builder-style [`TcpRoute::set_peer`]
    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Set where outgoing buffers are sent
    pub fn set_peer(&mut self, peer: SocketAddr) {
        self.peer = Some(peer);
    }

    /// Only accept buffers from these addresses
    pub fn with_whitelist(mut self, whitelist: Vec<IpAddr>) -> Self {
        self.whitelist = Some(whitelist);
        self
    }

    /// Block at most `timeout` when writing a buffer
    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Record the CID of the component at the far end
    pub fn with_cid(mut self, cid: impl Into<String>) -> Self {
        self.connected_cid = Some(cid.into());
        self
    }

    /// Inspect every message decoded from this route
    pub fn with_pre_processor(mut self, pre_processor: BoxedPreProcessor) -> Self {
        self.pre_processor = Some(pre_processor);
        self
    }

    /// The address the route is listening on
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(|source| TransportError::Io {
            port: self.port,
            source,
        })
    }

    fn read_buffer(&self, mut stream: TcpStream) -> std::io::Result<Vec<u8>> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

impl CommsRoute for TcpRoute {
    fn port(&self) -> PortId {
        self.port
    }

    fn send(&mut self, buffer: &[u8]) -> Result<(), TransportError> {
        let peer = self.peer.ok_or(TransportError::Disconnected(self.port))?;
        let io_error = |source| TransportError::Io {
            port: self.port,
            source,
        };

        let mut stream = TcpStream::connect(peer).map_err(io_error)?;
        stream
            .set_write_timeout(self.write_timeout)
            .map_err(io_error)?;
        stream.write_all(buffer).map_err(io_error)?;
        stream.shutdown(Shutdown::Write).map_err(io_error)
    }

    fn poll(&mut self) -> Vec<Vec<u8>> {
        let mut buffers = Vec::new();
        loop {
            let (stream, socket_addr) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) => {
                    warn!(port = %self.port, "accept failed: {err}");
                    break;
                }
            };

            if let Some(whitelist) = self.whitelist.as_ref() {
                if !whitelist.contains(&socket_addr.ip()) {
                    continue;
                }
            }

            match self.read_buffer(stream) {
                Ok(buffer) if buffer.is_empty() => {}
                Ok(buffer) => buffers.push(buffer),
                Err(err) => warn!(port = %self.port, peer = %socket_addr, "read failed: {err}"),
            }
        }
        buffers
    }

    fn connected_cid(&self) -> Option<&str> {
        self.connected_cid.as_deref()
    }

    fn pre_processor(&mut self) -> Option<&mut dyn PreProcessor> {
        self.pre_processor
            .as_deref_mut()
            .map(|pre_processor| pre_processor as &mut dyn PreProcessor)
    }
}
