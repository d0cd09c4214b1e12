use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use ddpkit_proto::Packet;
use ddpkit_transport::AsyncUdpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::dispatch::Dispatcher;
use crate::error::{PeerError, Result};
use crate::handler::{HandlerRegistry, HandlerResult};
use crate::server::ServerConfig;

/// Tokio counterpart of [`crate::Server`].
///
/// Handlers stay synchronous; each datagram is dispatched on tokio's
/// blocking pool. A closed server cannot be restarted.
pub struct AsyncServer {
    dispatcher: Dispatcher,
    config: ServerConfig,
    listener: Mutex<Option<AsyncUdpListener>>,
    cancel: CancellationToken,
}

impl Default for AsyncServer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncServer {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Only `recv_buffer_size` applies; cancellation replaces polling.
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            dispatcher: Dispatcher::default(),
            config,
            listener: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.dispatcher = Dispatcher::new(registry);
        self
    }

    pub fn register_handler<F>(&self, id: u8, handler: F)
    where
        F: Fn(&Packet, SocketAddr) -> HandlerResult + Send + Sync + 'static,
    {
        self.dispatcher.register_handler(id, handler);
    }

    pub fn register_default_handler<F>(&self, handler: F)
    where
        F: Fn(&Packet, SocketAddr) -> HandlerResult + Send + Sync + 'static,
    {
        self.dispatcher.register_default_handler(handler);
    }

    pub async fn bind(&self, addr: &str) -> Result<SocketAddr> {
        let listener = AsyncUdpListener::bind(addr).await?;
        let local = listener.local_addr();
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);
        Ok(local)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(AsyncUdpListener::local_addr)
    }

    pub async fn listen(&self, addr: &str) -> Result<()> {
        self.bind(addr).await?;
        self.serve().await
    }

    /// Run the receive loop until [`AsyncServer::close`] or the token from
    /// [`AsyncServer::cancellation_token`] is cancelled.
    pub async fn serve(&self) -> Result<()> {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(PeerError::NotBound)?;
        if self.cancel.is_cancelled() {
            return Err(PeerError::NotBound);
        }
        let local = listener.local_addr();
        info!(%local, "ddp server started (async)");

        let mut buf = vec![0u8; self.config.recv_buffer_size];
        loop {
            let received = tokio::select! {
                _ = self.cancel.cancelled() => break,
                received = listener.recv_from(&mut buf) => received,
            };
            let (n, from) = match received {
                Ok(received) => received,
                Err(err) => {
                    warn!(%local, error = %err, "receive failed");
                    continue;
                }
            };

            let datagram = Bytes::copy_from_slice(&buf[..n]);
            let dispatcher = self.dispatcher.clone();
            tokio::task::spawn_blocking(move || dispatcher.dispatch(datagram, from));
        }

        info!(%local, "ddp server stopped (async)");
        Ok(())
    }

    /// Stop the receive loop. In-flight handlers are not waited on.
    pub fn close(&self) {
        self.cancel.cancel();
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Token that stops this server when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl std::fmt::Debug for AsyncServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncServer")
            .field("config", &self.config)
            .field("local_addr", &self.local_addr())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ddpkit_proto::Header;
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn dispatches_until_cancelled() {
        let server = Arc::new(AsyncServer::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        server.register_default_handler(move |packet, _from| {
            tx.send(packet.header.destination_id)
                .map_err(|err| err.to_string().into())
        });
        let addr = server.bind("127.0.0.1:0").await.unwrap();

        let serving = Arc::clone(&server);
        let task = tokio::spawn(async move { serving.serve().await });

        let datagram = Packet::new(
            Header {
                destination_id: 42,
                ..Header::default()
            },
            Vec::<u8>::new(),
        )
        .to_bytes();
        let client = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&datagram, addr).await.unwrap();

        let id = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id, 42);

        server.cancellation_token().cancel();
        task.await.unwrap().unwrap();
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn closed_server_does_not_serve() {
        let server = AsyncServer::new();
        server.bind("127.0.0.1:0").await.unwrap();
        server.close();
        assert!(matches!(server.serve().await, Err(PeerError::NotBound)));
    }
}
