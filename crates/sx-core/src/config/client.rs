//! Client configuration

use serde::{Deserialize, Serialize};
use sx_protocol::ChannelKind;

use crate::error::ConfigError;

/// Fixed local address of the execution service
pub const DEFAULT_SERVICE_URL: &str = "ws://localhost:24892/";

/// Where the execution service lives.
///
/// Only the endpoint is configurable; deadlines are fixed (see [`crate::time`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base WebSocket URL of the service
    pub service_url: String,

    /// Path of the attach endpoint, relative to `service_url`
    pub attach_path: String,

    /// Path of the execute endpoint, relative to `service_url`
    pub execute_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            attach_path: ChannelKind::Attach.path().to_string(),
            execute_path: ChannelKind::Execute.path().to_string(),
        }
    }
}

impl ClientConfig {
    /// Check that the service URL is a WebSocket URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.service_url.starts_with("ws://") || self.service_url.starts_with("wss://")) {
            return Err(ConfigError::Invalid(format!(
                "service_url must start with ws:// or wss://, got {:?}",
                self.service_url
            )));
        }
        Ok(())
    }

    /// Full endpoint URL for a channel
    pub fn endpoint(&self, kind: ChannelKind) -> String {
        let path = match kind {
            ChannelKind::Attach => &self.attach_path,
            ChannelKind::Execute => &self.execute_path,
        };
        format!(
            "{}/{}",
            self.service_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
