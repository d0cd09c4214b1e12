use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::addr::{bind_spec, peer_spec, unspecified_for};
use crate::error::{Result, TransportError};

/// Connected tokio UDP socket for sending to one display.
#[derive(Debug)]
pub struct AsyncUdpSender {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl AsyncUdpSender {
    /// Resolve `addr` (default port 4048) and connect an ephemeral socket to it.
    pub async fn connect(addr: &str) -> Result<Self> {
        let peer = peer_spec(addr)?.resolve_async().await?;
        let local = unspecified_for(&peer);
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| TransportError::Bind {
                addr: local.to_string(),
                source,
            })?;
        socket
            .connect(peer)
            .await
            .map_err(|source| TransportError::Connect {
                addr: peer.to_string(),
                source,
            })?;
        debug!(%peer, "connected async udp sender");
        Ok(Self { socket, peer })
    }

    /// Send one datagram to the connected display.
    pub async fn send_datagram(&self, datagram: &[u8]) -> Result<usize> {
        self.socket.send(datagram).await.map_err(Into::into)
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

/// Bound tokio UDP socket receiving datagrams from any sender.
#[derive(Debug)]
pub struct AsyncUdpListener {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl AsyncUdpListener {
    /// Bind to `addr`. Empty or `:port` forms listen on all IPv4 interfaces.
    pub async fn bind(addr: &str) -> Result<Self> {
        let target = bind_spec(addr).resolve_async().await?;
        let socket = UdpSocket::bind(target)
            .await
            .map_err(|source| TransportError::Bind {
                addr: target.to_string(),
                source,
            })?;
        let local_addr = socket.local_addr()?;
        info!(%local_addr, "listening on udp (async)");
        Ok(Self { socket, local_addr })
    }

    /// Receive one datagram into `buf`.
    pub async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await.map_err(Into::into)
    }

    /// The address this socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
