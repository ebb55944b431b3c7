//! Fixed deadlines for the session protocol
//!
//! These are deliberately not part of the configuration file.

use std::time::Duration;

/// Deadline for a channel to reach the open state
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline for any single reply on either channel
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
