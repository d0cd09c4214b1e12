use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use tracing::{debug, info};

use crate::addr::{bind_spec, peer_spec, unspecified_for};
use crate::error::{Result, TransportError};
use crate::traits::DatagramSink;

/// Largest UDP payload over IPv4; receive buffers must hold this much.
pub const MAX_DATAGRAM_SIZE: usize = 65507;

/// Connected UDP socket for sending to one display.
pub struct UdpSender {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpSender {
    /// Resolve `addr` (default port 4048) and connect an ephemeral socket to it.
    pub fn connect(addr: &str) -> Result<Self> {
        let peer = peer_spec(addr)?.resolve()?;
        let local = unspecified_for(&peer);
        let socket = UdpSocket::bind(local).map_err(|source| TransportError::Bind {
            addr: local.to_string(),
            source,
        })?;
        socket
            .connect(peer)
            .map_err(|source| TransportError::Connect {
                addr: peer.to_string(),
                source,
            })?;
        debug!(%peer, "connected udp sender");
        Ok(Self { socket, peer })
    }

    /// The display this sender is connected to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// The local ephemeral address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }
}

impl DatagramSink for UdpSender {
    fn send_datagram(&mut self, datagram: &[u8]) -> std::io::Result<usize> {
        self.socket.send(datagram)
    }
}

impl std::fmt::Debug for UdpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpSender")
            .field("peer", &self.peer)
            .finish()
    }
}

/// Bound UDP socket receiving datagrams from any sender.
#[derive(Debug)]
pub struct UdpListener {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl UdpListener {
    /// Bind to `addr`. Empty or `:port` forms listen on all IPv4 interfaces.
    pub fn bind(addr: &str) -> Result<Self> {
        let target = bind_spec(addr).resolve()?;
        let socket = UdpSocket::bind(target).map_err(|source| TransportError::Bind {
            addr: target.to_string(),
            source,
        })?;
        let local_addr = socket.local_addr()?;
        info!(%local_addr, "listening on udp");
        Ok(Self { socket, local_addr })
    }

    /// Set read timeout used by [`UdpListener::recv_from`].
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Receive one datagram into `buf`.
    ///
    /// Returns `Ok(None)` when the read timed out or was interrupted, so the
    /// caller can check its shutdown state and try again.
    pub fn recv_from(&self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>> {
        match self.socket.recv_from(buf) {
            Ok(received) => Ok(Some(received)),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(TransportError::Io(err)),
        }
    }

    /// The address this socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
