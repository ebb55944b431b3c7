//! Core error types for synapse-exec

use std::path::PathBuf;
use std::time::Duration;

use sx_protocol::ChannelKind;
use thiserror::Error;

/// Errors raised by a transport implementation.
///
/// These know nothing about which channel they belong to; the channel wraps
/// them in [`ChannelError::Transport`] or [`ChannelError::ConnectFailed`].
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Endpoint URL could not be used
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Connection refused
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    /// Connection lost
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Writing a frame failed
    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Errors raised by a channel or a correlated wait on it
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Socket never reached the open state
    #[error("Failed to connect {channel} channel: {reason}")]
    ConnectFailed {
        channel: ChannelKind,
        reason: String,
    },

    /// Send attempted on a channel that is not open
    #[error("{0} channel is not open")]
    NotOpen(ChannelKind),

    /// A second request was issued while one was still pending
    #[error("{0} channel already has a request in flight")]
    RequestInFlight(ChannelKind),

    /// No reply within the deadline
    #[error("No reply on {channel} channel within {after:?}")]
    Timeout { channel: ChannelKind, after: Duration },

    /// Remote closed the socket while a reply was awaited
    #[error("{0} channel closed by remote")]
    Closed(ChannelKind),

    /// Transport failure on an open channel
    #[error("{channel} channel transport error: {source}")]
    Transport {
        channel: ChannelKind,
        #[source]
        source: ConnectionError,
    },
}

impl ChannelError {
    /// Channel the error occurred on
    pub fn channel(&self) -> ChannelKind {
        match self {
            ChannelError::ConnectFailed { channel, .. }
            | ChannelError::Timeout { channel, .. }
            | ChannelError::Transport { channel, .. } => *channel,
            ChannelError::NotOpen(channel)
            | ChannelError::RequestInFlight(channel)
            | ChannelError::Closed(channel) => *channel,
        }
    }

    /// Whether the remote simply never answered
    pub fn is_timeout(&self) -> bool {
        matches!(self, ChannelError::Timeout { .. })
    }

    /// Whether the socket is unusable (never opened, dropped or broken)
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            ChannelError::ConnectFailed { .. }
                | ChannelError::NotOpen(_)
                | ChannelError::Closed(_)
                | ChannelError::Transport { .. }
        )
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_error_reports_channel() {
        let err = ChannelError::Timeout {
            channel: ChannelKind::Attach,
            after: Duration::from_secs(30),
        };
        assert_eq!(err.channel(), ChannelKind::Attach);
        assert!(err.is_timeout());
        assert!(!err.is_connection_failure());
        assert_eq!(err.to_string(), "No reply on attach channel within 30s");
    }

    #[test]
    fn test_connection_failures() {
        let err = ChannelError::ConnectFailed {
            channel: ChannelKind::Execute,
            reason: "refused".to_string(),
        };
        assert!(err.is_connection_failure());
        assert_eq!(err.to_string(), "Failed to connect execute channel: refused");

        let err = ChannelError::Transport {
            channel: ChannelKind::Execute,
            source: ConnectionError::SendFailed("broken pipe".to_string()),
        };
        assert!(err.is_connection_failure());
        assert_eq!(err.channel(), ChannelKind::Execute);

        assert!(!ChannelError::RequestInFlight(ChannelKind::Attach).is_connection_failure());
    }
}
