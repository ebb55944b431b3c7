//! sx-protocol: Wire vocabulary for the synapse attach and execute channels
//!
//! The execution service exposes two WebSocket endpoints. Every message on
//! either channel is a single plain-text frame; there is no structured
//! encoding. This crate names the channels, the request words and the
//! replies the client knows how to classify.

pub mod channel;
pub mod error;
pub mod message;
pub mod script;

pub use channel::ChannelKind;
pub use error::ProtocolError;
pub use message::{text_from_binary, AttachRequest, AttachStatus, ExecuteReply, ReadinessReply};
pub use script::Script;
