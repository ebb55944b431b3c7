//! In-process transport
//!
//! Pairs a [`MemoryConnector`] with a [`MemoryServer`] that sees each client
//! connection as a [`MemoryPeer`]. Frames travel over unbounded tokio
//! channels, so the whole conversation stays inside one runtime. Used to
//! embed a scripted service in tests, including tests that run on paused
//! time.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use sx_core::traits::{Connector, FrameSink, FrameSource};
use sx_core::ConnectionError;

/// How the connector answers connection attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectMode {
    /// Hand a new peer to the server
    Accept,
    /// Fail immediately
    Refuse,
    /// Never complete
    Stall,
}

/// Client side of the in-process transport
pub struct MemoryConnector {
    mode: ConnectMode,
    accept_tx: mpsc::UnboundedSender<MemoryPeer>,
    attempts: AtomicUsize,
}

impl MemoryConnector {
    /// Create a connector and the server that receives its connections
    pub fn pair() -> (Self, MemoryServer) {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        let connector = Self {
            mode: ConnectMode::Accept,
            accept_tx,
            attempts: AtomicUsize::new(0),
        };
        (connector, MemoryServer { accept_rx })
    }

    /// A connector whose every attempt is refused
    pub fn refusing() -> Self {
        Self::with_mode(ConnectMode::Refuse)
    }

    /// A connector whose attempts never complete
    pub fn stalled() -> Self {
        Self::with_mode(ConnectMode::Stall)
    }

    fn with_mode(mode: ConnectMode) -> Self {
        let (accept_tx, _accept_rx) = mpsc::unbounded_channel();
        Self {
            mode,
            accept_tx,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of connection attempts made so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>), ConnectionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        match self.mode {
            ConnectMode::Accept => {}
            ConnectMode::Refuse => {
                return Err(ConnectionError::ConnectionRefused(url.to_string()));
            }
            ConnectMode::Stall => std::future::pending::<()>().await,
        }

        let (to_server, from_client) = mpsc::unbounded_channel();
        let (to_client, from_server) = mpsc::unbounded_channel();

        let peer = MemoryPeer {
            url: url.to_string(),
            to_client: Some(to_client),
            from_client,
        };
        self.accept_tx
            .send(peer)
            .map_err(|_| ConnectionError::ConnectionRefused(format!("{}: server gone", url)))?;

        debug!(url = %url, "In-memory connection established");
        Ok((
            Box::new(MemorySink {
                tx: Some(to_server),
            }),
            Box::new(MemorySource { rx: from_server }),
        ))
    }
}

/// Server side of the in-process transport
pub struct MemoryServer {
    accept_rx: mpsc::UnboundedReceiver<MemoryPeer>,
}

impl MemoryServer {
    /// Wait for the next client connection
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.accept_rx.recv().await
    }
}

/// One accepted client connection, seen from the server
pub struct MemoryPeer {
    url: String,
    to_client: Option<mpsc::UnboundedSender<String>>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl MemoryPeer {
    /// URL the client connected to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Next frame from the client; `None` once the client closed
    pub async fn recv(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Next frame from the client if one is already queued
    pub fn try_recv(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }

    /// Send a frame to the client. Returns false if the client is gone.
    pub fn send(&self, text: impl Into<String>) -> bool {
        self.to_client
            .as_ref()
            .is_some_and(|tx| tx.send(text.into()).is_ok())
    }

    /// Close the connection from the server side
    pub fn close(&mut self) {
        self.to_client = None;
    }
}

struct MemorySink {
    tx: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send_text(&mut self, text: String) -> Result<(), ConnectionError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| ConnectionError::SendFailed("sink closed".to_string()))?;
        tx.send(text)
            .map_err(|_| ConnectionError::SendFailed("server closed the connection".to_string()))
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        self.tx = None;
        Ok(())
    }
}

struct MemorySource {
    rx: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn next_text(&mut self) -> Option<Result<String, ConnectionError>> {
        self.rx.recv().await.map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let (connector, mut server) = MemoryConnector::pair();
        let (mut sink, mut source) = connector.connect("mem://attach").await.unwrap();
        let mut peer = server.accept().await.unwrap();
        assert_eq!(peer.url(), "mem://attach");

        sink.send_text("IS_READY".to_string()).await.unwrap();
        assert_eq!(peer.recv().await.as_deref(), Some("IS_READY"));

        assert!(peer.send("TRUE"));
        assert_eq!(source.next_text().await.unwrap().unwrap(), "TRUE");
    }

    #[tokio::test]
    async fn test_close_is_seen_by_other_side() {
        let (connector, mut server) = MemoryConnector::pair();
        let (mut sink, mut source) = connector.connect("mem://execute").await.unwrap();
        let mut peer = server.accept().await.unwrap();

        sink.close().await.unwrap();
        assert_eq!(peer.recv().await, None);

        peer.close();
        assert!(source.next_text().await.is_none());
    }

    #[tokio::test]
    async fn test_refusing_connector() {
        let connector = MemoryConnector::refusing();
        let result = connector.connect("mem://attach").await;
        assert!(matches!(result, Err(ConnectionError::ConnectionRefused(_))));
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn test_connect_fails_once_server_dropped() {
        let (connector, server) = MemoryConnector::pair();
        drop(server);
        assert!(connector.connect("mem://attach").await.is_err());
    }
}
