//! DDP controller and server.
//!
//! This is the layer applications use. A [`Controller`] owns one header and
//! sends pixel data to a display; a [`Server`] receives datagrams and routes
//! each one to the handler registered for its destination ID.
//!
//! ```no_run
//! use ddpkit_peer::Controller;
//!
//! let mut controller = Controller::connect("192.168.1.50")?;
//! controller.write(&[255, 0, 0, 0, 255, 0])?;
//! # Ok::<(), ddpkit_peer::PeerError>(())
//! ```
//!
//! Tokio variants ([`AsyncController`], [`AsyncServer`]) are available with
//! the `async` feature.

pub mod controller;
pub mod dispatch;
pub mod error;
pub mod framing;
pub mod handler;
pub mod server;

#[cfg(feature = "async")]
pub mod async_controller;
#[cfg(feature = "async")]
pub mod async_server;

pub use controller::Controller;
pub use dispatch::{Dispatch, Dispatcher};
pub use error::{PeerError, Result};
pub use framing::{next_sequence, FrameBuilder};
pub use handler::{HandlerError, HandlerRegistry, HandlerResult, PacketHandler};
pub use server::{Server, ServerConfig, ShutdownHandle};

#[cfg(feature = "async")]
pub use async_controller::AsyncController;
#[cfg(feature = "async")]
pub use async_server::AsyncServer;
