//! Address handling with DDP defaults.
//!
//! Addresses are accepted as strings in the forms users type on a command
//! line: `10.0.1.9`, `10.0.1.9:4048`, `[::1]`, `display.local`, `:4048`, or
//! an empty string for "all interfaces". Any form without a port gets
//! [`DDP_PORT`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};

use crate::error::{Result, TransportError};

/// Conventional DDP UDP port.
pub const DDP_PORT: u16 = 4048;

/// An address after default-port expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddrSpec {
    /// A literal socket address; no lookup needed.
    Literal(SocketAddr),
    /// A `host:port` string that still needs name resolution.
    Host(String),
}

impl AddrSpec {
    /// Expand `addr` with the default DDP port where it has none.
    pub fn parse(addr: &str) -> Self {
        let addr = addr.trim();
        if let Ok(sock) = addr.parse::<SocketAddr>() {
            return Self::Literal(sock);
        }
        if let Ok(ip) = addr.parse::<IpAddr>() {
            return Self::Literal(SocketAddr::new(ip, DDP_PORT));
        }
        if let Some(ip) = addr
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|inner| inner.parse::<IpAddr>().ok())
        {
            return Self::Literal(SocketAddr::new(ip, DDP_PORT));
        }
        if has_port(addr) {
            Self::Host(addr.to_string())
        } else {
            Self::Host(format!("{addr}:{DDP_PORT}"))
        }
    }

    /// Resolve to a single socket address (blocking name lookup for hosts).
    pub fn resolve(&self) -> Result<SocketAddr> {
        match self {
            Self::Literal(sock) => Ok(*sock),
            Self::Host(host) => host
                .to_socket_addrs()
                .map_err(|source| TransportError::Resolve {
                    addr: host.clone(),
                    source,
                })?
                .next()
                .ok_or_else(|| no_addresses(host)),
        }
    }

    /// Resolve through tokio's non-blocking lookup.
    #[cfg(feature = "async")]
    pub async fn resolve_async(&self) -> Result<SocketAddr> {
        match self {
            Self::Literal(sock) => Ok(*sock),
            Self::Host(host) => tokio::net::lookup_host(host.as_str())
                .await
                .map_err(|source| TransportError::Resolve {
                    addr: host.clone(),
                    source,
                })?
                .next()
                .ok_or_else(|| no_addresses(host)),
        }
    }
}

/// Resolve an address to listen on.
///
/// An empty string or a bare `:port` binds all IPv4 interfaces.
pub fn resolve_bind_addr(addr: &str) -> Result<SocketAddr> {
    bind_spec(addr).resolve()
}

/// Resolve the address of a remote display.
pub fn resolve_peer_addr(addr: &str) -> Result<SocketAddr> {
    peer_spec(addr)?.resolve()
}

pub(crate) fn bind_spec(addr: &str) -> AddrSpec {
    let addr = addr.trim();
    if addr.is_empty() {
        return AddrSpec::Literal(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DDP_PORT));
    }
    if let Some(port) = addr.strip_prefix(':') {
        return AddrSpec::parse(&format!("0.0.0.0:{port}"));
    }
    AddrSpec::parse(addr)
}

pub(crate) fn peer_spec(addr: &str) -> Result<AddrSpec> {
    if addr.trim().is_empty() {
        return Err(TransportError::Resolve {
            addr: String::new(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "destination address must not be empty",
            ),
        });
    }
    Ok(AddrSpec::parse(addr))
}

/// The local wildcard address matching the family of `peer`.
pub(crate) fn unspecified_for(peer: &SocketAddr) -> SocketAddr {
    match peer {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED), 0),
    }
}

fn has_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty() && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn no_addresses(host: &str) -> TransportError {
    TransportError::Resolve {
        addr: host.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"),
    }
}
