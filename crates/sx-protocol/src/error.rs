//! Protocol error types

use thiserror::Error;

/// Errors raised while building or decoding protocol messages
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Script text was empty after trimming whitespace
    #[error("Script is empty")]
    EmptyScript,

    /// A frame could not be decoded as UTF-8 text
    #[error("Frame is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}
