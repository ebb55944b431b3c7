//! sx-cli: Command-line front end for synapse-exec
//!
//! Provides the `synapse-exec` binary, which submits scripts to the local
//! execution service and manages the client's configuration file.

pub mod commands;
pub mod output;
