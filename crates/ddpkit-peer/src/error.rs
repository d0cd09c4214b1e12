/// Errors that can occur in controller and server operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] ddpkit_transport::TransportError),

    /// The payload exceeds what one datagram may carry.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Destination ID 0 cannot be addressed.
    #[error("destination ID {0} is reserved")]
    ReservedIdentifier(u8),

    /// `serve` was called before `bind`, or after the server was closed.
    #[error("server is not bound")]
    NotBound,

    /// The server was closed; it cannot be bound again.
    #[error("server is closed")]
    Closed,
}

impl From<std::io::Error> for PeerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(ddpkit_transport::TransportError::Io(err))
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;
