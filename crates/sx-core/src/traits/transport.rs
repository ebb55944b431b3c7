//! Transport traits
//!
//! A channel never touches a socket type directly. It asks a [`Connector`]
//! for a connected pair of frame halves and drives those.

use async_trait::async_trait;

use crate::error::ConnectionError;

/// Establishes text-frame connections to an endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `url`, resolving only once the connection is established
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>), ConnectionError>;
}

/// Write half of a connection
#[async_trait]
pub trait FrameSink: Send {
    /// Send one text frame
    async fn send_text(&mut self, text: String) -> Result<(), ConnectionError>;

    /// Close the connection gracefully
    async fn close(&mut self) -> Result<(), ConnectionError>;
}

/// Read half of a connection
#[async_trait]
pub trait FrameSource: Send {
    /// Next inbound text frame.
    ///
    /// Returns `None` once the connection is closed.
    async fn next_text(&mut self) -> Option<Result<String, ConnectionError>>;
}
