//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection state of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No socket
    Closed,
    /// Connect in progress
    Opening,
    /// Socket established and usable
    Open,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Closed => write!(f, "closed"),
            ConnectionState::Opening => write!(f, "opening"),
            ConnectionState::Open => write!(f, "open"),
        }
    }
}

/// Progress of the attach handshake within one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    /// Nothing sent yet
    Unknown,
    /// `IS_READY` sent, awaiting reply
    Checking,
    /// `ATTACH` sent, polling for a terminal status
    Attaching,
    /// Target attached
    Ready,
    /// Service refused the attach
    Failed(String),
}

/// Terminal outcome of one execute invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum SessionResult {
    /// Script accepted with `OK`
    Success,
    /// Service explicitly refused the attach
    AttachFailed(String),
    /// A channel could not be opened or broke
    ConnectFailed(String),
    /// Service replied to the script with something other than `OK`
    ExecuteFailed(String),
    /// A reply never arrived
    Timeout(String),
}

impl SessionResult {
    /// Whether the script ran
    pub fn is_success(&self) -> bool {
        matches!(self, SessionResult::Success)
    }

    /// Short label for logs and status displays
    pub fn label(&self) -> &'static str {
        match self {
            SessionResult::Success => "success",
            SessionResult::AttachFailed(_) => "attach failed",
            SessionResult::ConnectFailed(_) => "connect failed",
            SessionResult::ExecuteFailed(_) => "execute failed",
            SessionResult::Timeout(_) => "timeout",
        }
    }
}

impl fmt::Display for SessionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionResult::Success => write!(f, "Script executed"),
            SessionResult::AttachFailed(reason) => write!(f, "Failed to attach: {}", reason),
            SessionResult::ConnectFailed(reason) => {
                write!(f, "Couldn't connect to synapse: {}", reason)
            }
            SessionResult::ExecuteFailed(reason) => write!(f, "Execution failed: {}", reason),
            SessionResult::Timeout(reason) => write!(f, "Timed out: {}", reason),
        }
    }
}

/// What a call to `execute` produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// Script text was blank; nothing was opened or sent
    Skipped,
    /// Session shut down before a result existed
    Cancelled,
    /// The invocation ran to a result, reported exactly once
    Finished(SessionResult),
}

impl ExecuteOutcome {
    /// The result, if the invocation produced one
    pub fn result(&self) -> Option<&SessionResult> {
        match self {
            ExecuteOutcome::Finished(result) => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_result_json_shape() {
        let json = serde_json::to_string(&SessionResult::AttachFailed("FAILED_TO_FIND".into()))
            .unwrap();
        assert_eq!(json, r#"{"result":"attach_failed","reason":"FAILED_TO_FIND"}"#);

        let json = serde_json::to_string(&SessionResult::Success).unwrap();
        assert_eq!(json, r#"{"result":"success"}"#);
    }

    #[test]
    fn test_outcome_result() {
        assert_eq!(ExecuteOutcome::Skipped.result(), None);
        assert_eq!(ExecuteOutcome::Cancelled.result(), None);
        let outcome = ExecuteOutcome::Finished(SessionResult::Success);
        assert!(outcome.result().is_some_and(SessionResult::is_success));
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(format!("{}", ConnectionState::Opening), "opening");
        assert_eq!(format!("{}", ConnectionState::Closed), "closed");
    }
}
