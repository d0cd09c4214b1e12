//! UDP datagram transport for DDP.
//!
//! DDP rides on plain UDP: one protocol packet per datagram, no connection
//! state. This crate provides:
//! - address resolution with the conventional DDP port (4048) as default
//! - a blocking sender/listener pair over `std::net::UdpSocket`
//! - the [`DatagramSink`] seam the controller writes through
//! - tokio equivalents behind the `async` feature
//!
//! This is the lowest layer of ddpkit. The protocol codec and the
//! controller/server build on top of it.

pub mod addr;
pub mod error;
pub mod traits;
pub mod udp;

#[cfg(feature = "async")]
pub mod async_udp;

pub use addr::{resolve_bind_addr, resolve_peer_addr, DDP_PORT};
pub use error::{Result, TransportError};
pub use traits::DatagramSink;
pub use udp::{UdpListener, UdpSender, MAX_DATAGRAM_SIZE};

#[cfg(feature = "async")]
pub use async_udp::{AsyncUdpListener, AsyncUdpSender};
