use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use ddpkit_proto::{decode_packet, Packet};
use tracing::{debug, warn};

use crate::handler::{HandlerRegistry, HandlerResult};

/// What happened to one datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler ran and returned `Ok`.
    Handled { id: u8 },
    /// A handler ran and returned an error (logged).
    HandlerFailed { id: u8 },
    /// No handler for the ID and no fallback; dropped.
    NoHandler { id: u8 },
    /// The header could not be parsed; dropped.
    Malformed,
}

/// Parses datagrams and routes them to registered handlers.
///
/// Cheap to clone; clones share the registry. Handlers are cloned out of
/// the lock before they run, so registering while packets are in flight
/// never blocks on a slow handler.
#[derive(Clone, Default)]
pub struct Dispatcher {
    registry: Arc<RwLock<HandlerRegistry>>,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
        }
    }

    /// Register a handler for `id`, replacing any existing one.
    pub fn register_handler<F>(&self, id: u8, handler: F)
    where
        F: Fn(&Packet, SocketAddr) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(id, handler);
    }

    /// Register the fallback handler, replacing any existing one.
    pub fn register_default_handler<F>(&self, handler: F)
    where
        F: Fn(&Packet, SocketAddr) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register_default(handler);
    }

    /// Replace the whole registry.
    pub fn set_registry(&self, registry: HandlerRegistry) {
        *self.registry.write().unwrap_or_else(PoisonError::into_inner) = registry;
    }

    /// Snapshot of the current registry.
    pub fn registry(&self) -> HandlerRegistry {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Decode one datagram and hand it to its handler.
    ///
    /// Never fails: malformed datagrams, missing handlers and handler
    /// errors are logged and reported through the returned [`Dispatch`].
    pub fn dispatch(&self, datagram: Bytes, from: SocketAddr) -> Dispatch {
        let (packet, mismatch) = match decode_packet(datagram) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(%from, error = %err, "dropping malformed datagram");
                return Dispatch::Malformed;
            }
        };

        let id = packet.header.destination_id;
        if let Some(mismatch) = mismatch {
            warn!(
                %from,
                id,
                expected = mismatch.declared,
                actual = mismatch.actual,
                "payload size mismatch"
            );
        }

        let handler = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(id);
        let Some(handler) = handler else {
            warn!(%from, id, "no handler for destination");
            return Dispatch::NoHandler { id };
        };

        debug!(
            %from,
            id,
            sequence = packet.header.sequence_number,
            offset = packet.header.offset,
            size = packet.payload.len(),
            "dispatching packet"
        );

        match handler.handle(&packet, from) {
            Ok(()) => Dispatch::Handled { id },
            Err(err) => {
                warn!(%from, id, error = %err, "handler error");
                Dispatch::HandlerFailed { id }
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry())
            .finish()
    }
}
