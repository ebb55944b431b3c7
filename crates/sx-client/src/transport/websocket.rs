//! WebSocket transport
//!
//! Connects to a `ws://` or `wss://` endpoint and exchanges text frames.
//! No knowledge of the attach or execute conversations.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{protocol::Message, Error as WsError};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use sx_core::traits::{Connector, FrameSink, FrameSource};
use sx_core::ConnectionError;
use sx_protocol::text_from_binary;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connector that opens real WebSocket connections
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl WsConnector {
    /// Create a new connector
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>), ConnectionError> {
        debug!(url = %url, "Connecting to WebSocket");

        let (ws, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| match e {
                e @ (WsError::Url(_) | WsError::HttpFormat(_)) => {
                    ConnectionError::InvalidUrl(format!("{}: {}", url, e))
                }
                other => ConnectionError::ConnectionRefused(format!("{}: {}", url, other)),
            })?;

        let (sink, stream) = ws.split();

        debug!(url = %url, "WebSocket connected");
        Ok((Box::new(WsSink { sink }), Box::new(WsSource { stream })))
    }
}

/// Send half of a WebSocket connection
struct WsSink {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), ConnectionError> {
        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|e| ConnectionError::SendFailed(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        match self.sink.close().await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(ConnectionError::ConnectionLost(e.to_string())),
        }
    }
}

/// Receive half of a WebSocket connection
struct WsSource {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WsSource {
    async fn next_text(&mut self) -> Option<Result<String, ConnectionError>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text)),
                Some(Ok(Message::Binary(data))) => match text_from_binary(data) {
                    Ok(text) => return Some(Ok(text)),
                    Err(e) => {
                        debug!(error = %e, "Skipping undecodable binary frame");
                        continue;
                    }
                },
                Some(Ok(Message::Close(_))) => return None,
                // Pong is handled by tungstenite
                Some(Ok(_)) => continue,
                Some(Err(WsError::ConnectionClosed)) => return None,
                Some(Err(e)) => return Some(Err(ConnectionError::ConnectionLost(e.to_string()))),
                None => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let result = WsConnector::new().connect("not a url").await;
        assert!(matches!(result, Err(ConnectionError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_refused() {
        // Port 1 on loopback is never listening in test environments
        let result = WsConnector::new().connect("ws://127.0.0.1:1/attach").await;
        assert!(matches!(
            result,
            Err(ConnectionError::ConnectionRefused(_))
        ));
    }
}
