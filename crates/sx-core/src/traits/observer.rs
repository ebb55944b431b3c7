//! Collaborator callbacks

use crate::types::SessionResult;

/// Receives progress and results from a session.
///
/// Callbacks run inline on the session's task and must not block.
pub trait SessionObserver: Send + Sync {
    /// Attach status changed while attaching. Repeated statuses are not re-sent.
    fn on_status_changed(&self, status: &str);

    /// An invocation finished. Called exactly once per finished invocation.
    fn on_result(&self, result: &SessionResult);
}
