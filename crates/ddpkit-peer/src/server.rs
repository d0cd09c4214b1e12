use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use ddpkit_proto::Packet;
use ddpkit_transport::{UdpListener, MAX_DATAGRAM_SIZE};
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::error::{PeerError, Result};
use crate::handler::{HandlerRegistry, HandlerResult};

/// Receive-side tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Receive buffer size. Datagrams longer than this are truncated by the OS.
    pub recv_buffer_size: usize,
    /// How often a blocked receive wakes to check for [`Server::close`].
    pub poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: MAX_DATAGRAM_SIZE,
            poll_interval: Duration::from_millis(100),
        }
    }
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const CLOSED: u8 = 2;

/// Stops a [`Server`] from another thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    state: Arc<AtomicU8>,
}

impl ShutdownHandle {
    /// Mark the server closed. The receive loop exits within one poll
    /// interval and later binds are refused.
    pub fn close(&self) {
        self.state.store(CLOSED, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == RUNNING
    }
}

/// Receives DDP datagrams and hands each one to the handler registered for
/// its destination ID.
///
/// Every datagram is parsed and handled on its own thread, so a slow handler
/// never delays the next receive. Handlers for different datagrams may run
/// concurrently and in any order.
///
/// ```no_run
/// use ddpkit_peer::Server;
///
/// let server = Server::new();
/// server.register_handler(1, |packet, from| {
///     println!("{from}: {} bytes at {}", packet.payload.len(), packet.header.offset);
///     Ok(())
/// });
/// server.listen(":4048")?;
/// # Ok::<(), ddpkit_peer::PeerError>(())
/// ```
pub struct Server {
    dispatcher: Dispatcher,
    config: ServerConfig,
    listener: Mutex<Option<UdpListener>>,
    state: Arc<AtomicU8>,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            dispatcher: Dispatcher::default(),
            config,
            listener: Mutex::new(None),
            state: Arc::new(AtomicU8::new(IDLE)),
        }
    }

    /// Start from a prepared registry.
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.dispatcher = Dispatcher::new(registry);
        self
    }

    /// Register a handler for `id`, replacing any existing one.
    pub fn register_handler<F>(&self, id: u8, handler: F)
    where
        F: Fn(&Packet, SocketAddr) -> HandlerResult + Send + Sync + 'static,
    {
        self.dispatcher.register_handler(id, handler);
    }

    /// Register the handler for IDs nothing else claims.
    pub fn register_default_handler<F>(&self, handler: F)
    where
        F: Fn(&Packet, SocketAddr) -> HandlerResult + Send + Sync + 'static,
    {
        self.dispatcher.register_default_handler(handler);
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the listening socket. Empty `addr` means `0.0.0.0:4048`; a
    /// missing port means 4048. Returns the bound address.
    ///
    /// A closed server stays closed: binding after [`Server::close`] fails
    /// with [`PeerError::Closed`], even when the close raced this call.
    pub fn bind(&self, addr: &str) -> Result<SocketAddr> {
        if self.state.load(Ordering::SeqCst) == CLOSED {
            return Err(PeerError::Closed);
        }
        let listener = UdpListener::bind(addr)?;
        listener.set_read_timeout(Some(self.config.poll_interval))?;
        let local = listener.local_addr();

        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        match self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) | Err(RUNNING) => {
                *slot = Some(listener);
                Ok(local)
            }
            Err(_) => Err(PeerError::Closed),
        }
    }

    /// Address of the bound but not yet serving socket.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(UdpListener::local_addr)
    }

    /// [`Server::bind`] then [`Server::serve`]. Blocks until closed.
    pub fn listen(&self, addr: &str) -> Result<()> {
        self.bind(addr)?;
        self.serve()
    }

    /// Run the receive loop on the bound socket until [`Server::close`].
    ///
    /// Receive errors while running are logged and the loop continues.
    /// Returns `Ok(())` once closed; the socket is dropped on return.
    pub fn serve(&self) -> Result<()> {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(PeerError::NotBound)?;
        let local = listener.local_addr();
        info!(%local, "ddp server started");

        let mut buf = vec![0u8; self.config.recv_buffer_size];
        while self.is_running() {
            let (n, from) = match listener.recv_from(&mut buf) {
                Ok(Some(received)) => received,
                Ok(None) => continue,
                Err(err) => {
                    if self.is_running() {
                        warn!(%local, error = %err, "receive failed");
                        continue;
                    }
                    break;
                }
            };

            let datagram = Bytes::copy_from_slice(&buf[..n]);
            let dispatcher = self.dispatcher.clone();
            let spawned = thread::Builder::new()
                .name("ddp-dispatch".to_string())
                .spawn(move || {
                    dispatcher.dispatch(datagram, from);
                });
            if let Err(err) = spawned {
                warn!(%from, error = %err, "could not spawn dispatch thread; dropping datagram");
            }
        }

        info!(%local, "ddp server stopped");
        Ok(())
    }

    /// Stop the server. A bound socket that is not yet serving is dropped
    /// immediately; a serving loop exits within one poll interval. Handlers
    /// already running are not waited on.
    pub fn close(&self) {
        self.state.store(CLOSED, Ordering::SeqCst);
        if self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
        {
            debug!("dropped unserved listener");
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            state: Arc::clone(&self.state),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == RUNNING
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("local_addr", &self.local_addr())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use ddpkit_proto::Header;

    use super::*;

    fn fast() -> ServerConfig {
        ServerConfig {
            poll_interval: Duration::from_millis(10),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.recv_buffer_size, 65507);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn serve_without_bind_fails() {
        let server = Server::new();
        assert!(matches!(server.serve(), Err(PeerError::NotBound)));
    }

    #[test]
    fn close_before_serve_drops_socket() {
        let server = Server::with_config(fast());
        let addr = server.bind("127.0.0.1:0").unwrap();
        assert_eq!(server.local_addr(), Some(addr));
        assert!(server.is_running());

        server.close();
        assert!(!server.is_running());
        assert_eq!(server.local_addr(), None);
        assert!(matches!(server.serve(), Err(PeerError::NotBound)));
    }

    #[test]
    fn closed_server_refuses_to_bind() {
        let server = Server::with_config(fast());
        server.shutdown_handle().close();
        assert!(matches!(
            server.bind("127.0.0.1:0"),
            Err(PeerError::Closed)
        ));
        assert!(!server.is_running());
        assert_eq!(server.local_addr(), None);
        assert!(matches!(server.listen("127.0.0.1:0"), Err(PeerError::Closed)));
    }

    #[test]
    fn rebind_while_bound_keeps_running() {
        let server = Server::with_config(fast());
        server.bind("127.0.0.1:0").unwrap();
        let addr = server.bind("127.0.0.1:0").unwrap();
        assert!(server.is_running());
        assert_eq!(server.local_addr(), Some(addr));
    }

    #[test]
    fn dispatches_and_stops() {
        let server = Arc::new(Server::with_config(fast()));
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        server.register_handler(1, move |packet, _from| {
            tx.lock()
                .unwrap()
                .send(packet.payload.to_vec())
                .map_err(|err| err.to_string().into())
        });
        let addr = server.bind("127.0.0.1:0").unwrap();

        let serving = Arc::clone(&server);
        let loop_thread = thread::spawn(move || serving.serve());

        let datagram = Packet::new(
            Header {
                length: 3,
                ..Header::default()
            },
            vec![9, 8, 7],
        )
        .to_bytes();
        let client = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        client.send_to(&datagram, addr).unwrap();

        let got = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(got, vec![9, 8, 7]);

        let handle = server.shutdown_handle();
        handle.close();
        assert!(!handle.is_running());
        loop_thread.join().unwrap().unwrap();
    }
}
