//! Channel identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two independent conversations held with the execution service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Readiness and attach handshake
    Attach,
    /// Script submission
    Execute,
}

impl ChannelKind {
    /// All channels, in the order they are opened
    pub const ALL: [ChannelKind; 2] = [ChannelKind::Attach, ChannelKind::Execute];

    /// Endpoint path segment for this channel
    pub fn path(&self) -> &'static str {
        match self {
            ChannelKind::Attach => "attach",
            ChannelKind::Execute => "execute",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_open_order() {
        assert_eq!(ChannelKind::ALL[0], ChannelKind::Attach);
        assert_eq!(ChannelKind::ALL[1], ChannelKind::Execute);
    }

    #[test]
    fn test_channel_display_matches_path() {
        assert_eq!(ChannelKind::Attach.to_string(), "attach");
        assert_eq!(format!("{}", ChannelKind::Execute), "execute");
    }

    #[test]
    fn test_channel_serde_lowercase() {
        let json = serde_json::to_string(&ChannelKind::Execute).unwrap();
        assert_eq!(json, r#""execute""#);
    }
}
