//! Message vocabulary for the synapse channels
//!
//! Every frame is plain text. The client sends a small fixed set of request
//! words on the attach channel and the raw script text on the execute channel;
//! replies are classified by the types below.
//!
//! # Message Flow
//!
//! Typical sequence for one script submission:
//!
//! 1. Client sends `IS_READY` on the attach channel
//! 2. Service replies `TRUE` if the target is already attached, anything else otherwise
//! 3. If not ready: client sends `ATTACH` once, then reads replies until a
//!    terminal status arrives (`READY`, `ALREADY_ATTACHED`, `REATTACH_READY`
//!    succeed; `NOT_LATEST_VERSION`, `FAILED_TO_FIND`, `INTERRUPT` refuse).
//!    Any other reply is a free-text progress status.
//! 4. Client sends the script text on the execute channel
//! 5. Service replies `OK`, or something else on a service-side fault

use std::fmt;

use crate::error::ProtocolError;

/// Request words sent on the attach channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachRequest {
    /// Ask whether the target is already attached
    IsReady,
    /// Start attaching to the target
    Attach,
}

impl AttachRequest {
    /// Wire text of the request
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachRequest::IsReady => "IS_READY",
            AttachRequest::Attach => "ATTACH",
        }
    }
}

impl fmt::Display for AttachRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply to `IS_READY`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessReply {
    /// `TRUE`: target attached, no handshake needed
    Ready,
    /// Anything else, carried verbatim
    NotReady(String),
}

impl ReadinessReply {
    /// Classify a reply frame
    pub fn parse(reply: &str) -> Self {
        if reply == "TRUE" {
            Self::Ready
        } else {
            Self::NotReady(reply.to_string())
        }
    }

    /// Whether the target is ready
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Reply received on the attach channel after `ATTACH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachStatus {
    /// Attached
    Ready,
    /// Target was attached before the request
    AlreadyAttached,
    /// Target re-attached after a restart
    ReattachReady,
    /// Service refuses: client or target out of date
    NotLatestVersion,
    /// Service refuses: no target process found
    FailedToFind,
    /// Service refuses: attach interrupted
    Interrupt,
    /// Free-text progress report; attaching continues
    Progress(String),
}

impl AttachStatus {
    /// Classify a reply frame
    pub fn parse(reply: &str) -> Self {
        match reply {
            "READY" => Self::Ready,
            "ALREADY_ATTACHED" => Self::AlreadyAttached,
            "REATTACH_READY" => Self::ReattachReady,
            "NOT_LATEST_VERSION" => Self::NotLatestVersion,
            "FAILED_TO_FIND" => Self::FailedToFind,
            "INTERRUPT" => Self::Interrupt,
            other => Self::Progress(other.to_string()),
        }
    }

    /// Wire text of the status
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ready => "READY",
            Self::AlreadyAttached => "ALREADY_ATTACHED",
            Self::ReattachReady => "REATTACH_READY",
            Self::NotLatestVersion => "NOT_LATEST_VERSION",
            Self::FailedToFind => "FAILED_TO_FIND",
            Self::Interrupt => "INTERRUPT",
            Self::Progress(status) => status,
        }
    }

    /// Terminal success
    pub fn is_attached(&self) -> bool {
        matches!(self, Self::Ready | Self::AlreadyAttached | Self::ReattachReady)
    }

    /// Terminal refusal
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            Self::NotLatestVersion | Self::FailedToFind | Self::Interrupt
        )
    }

    /// Neither attached nor refused
    pub fn is_progress(&self) -> bool {
        matches!(self, Self::Progress(_))
    }
}

impl fmt::Display for AttachStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply to a script submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteReply {
    /// `OK`
    Ok,
    /// Anything else; the service broke its contract
    Unexpected(String),
}

impl ExecuteReply {
    /// Classify a reply frame
    pub fn parse(reply: &str) -> Self {
        if reply == "OK" {
            Self::Ok
        } else {
            Self::Unexpected(reply.to_string())
        }
    }
}

/// Decode a binary frame as message text.
///
/// The service sends text frames, but some WebSocket stacks deliver short
/// strings as binary; those are accepted when they hold valid UTF-8.
pub fn text_from_binary(data: Vec<u8>) -> Result<String, ProtocolError> {
    Ok(String::from_utf8(data)?)
}
