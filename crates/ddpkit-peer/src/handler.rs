//! Packet handlers and the per-destination registry.
//!
//! Handlers are keyed by destination ID. A separate fallback handler
//! receives packets for IDs nothing else claims; it does not occupy an ID,
//! so 255 (broadcast) can still have its own handler.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use ddpkit_proto::Packet;

/// Error type handlers may return. Logged by the server, never propagated.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for handler functions.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Receives decoded packets for one or more destination IDs.
pub trait PacketHandler: Send + Sync + 'static {
    /// Handle a packet sent from `from`.
    fn handle(&self, packet: &Packet, from: SocketAddr) -> HandlerResult;
}

impl<F> PacketHandler for F
where
    F: Fn(&Packet, SocketAddr) -> HandlerResult + Send + Sync + 'static,
{
    fn handle(&self, packet: &Packet, from: SocketAddr) -> HandlerResult {
        self(packet, from)
    }
}

/// Registry mapping destination IDs to handlers.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<u8, Arc<dyn PacketHandler>>,
    fallback: Option<Arc<dyn PacketHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure for `id`, replacing any existing handler.
    pub fn register<F>(&mut self, id: u8, handler: F)
    where
        F: Fn(&Packet, SocketAddr) -> HandlerResult + Send + Sync + 'static,
    {
        self.insert(id, Arc::new(handler));
    }

    /// Register the fallback closure, replacing any existing one.
    pub fn register_default<F>(&mut self, handler: F)
    where
        F: Fn(&Packet, SocketAddr) -> HandlerResult + Send + Sync + 'static,
    {
        self.set_default(Arc::new(handler));
    }

    /// Register a shared handler for `id`, replacing any existing handler.
    pub fn insert(&mut self, id: u8, handler: Arc<dyn PacketHandler>) {
        self.handlers.insert(id, handler);
    }

    /// Set the shared fallback handler.
    pub fn set_default(&mut self, handler: Arc<dyn PacketHandler>) {
        self.fallback = Some(handler);
    }

    /// Remove the handler for `id`. Returns true if one was registered.
    pub fn remove(&mut self, id: u8) -> bool {
        self.handlers.remove(&id).is_some()
    }

    /// Handler for `id`, falling back to the default handler.
    pub fn resolve(&self, id: u8) -> Option<Arc<dyn PacketHandler>> {
        self.handlers
            .get(&id)
            .or(self.fallback.as_ref())
            .map(Arc::clone)
    }

    /// True if `id` has its own handler (the fallback does not count).
    pub fn contains(&self, id: u8) -> bool {
        self.handlers.contains_key(&id)
    }

    pub fn has_default(&self) -> bool {
        self.fallback.is_some()
    }

    /// Registered IDs in ascending order.
    pub fn ids(&self) -> Vec<u8> {
        let mut ids: Vec<u8> = self.handlers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of ID-specific handlers; the fallback is not counted.
    pub fn id_count(&self) -> usize {
        self.handlers.len()
    }

    /// True when no packet would reach any handler.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.fallback.is_none()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("ids", &self.ids())
            .field("has_default", &self.has_default())
            .finish()
    }
}
