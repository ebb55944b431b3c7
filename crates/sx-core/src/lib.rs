//! sx-core: Core abstractions and configuration for synapse-exec
//!
//! This crate provides the error taxonomy, session result types, transport
//! traits and configuration shared by the client library and the CLI.

pub mod config;
pub mod error;
pub mod time;
pub mod traits;
pub mod types;

pub use error::{ChannelError, ConfigError, ConnectionError};
pub use types::{ConnectionState, ExecuteOutcome, HandshakeState, SessionResult};
