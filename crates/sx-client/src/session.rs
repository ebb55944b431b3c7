//! Session orchestrator
//!
//! [`Session`] is the entry point a front end talks to. One call to
//! [`Session::execute`] opens the channels if needed, runs the attach
//! handshake, submits the script and reports exactly one [`SessionResult`].

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sx_core::config::ClientConfig;
use sx_core::time::REQUEST_TIMEOUT;
use sx_core::traits::{Connector, SessionObserver};
use sx_core::{ChannelError, ExecuteOutcome, SessionResult};
use sx_protocol::{ChannelKind, ExecuteReply, Script};

use crate::channel::Channel;
use crate::correlator::Correlator;
use crate::handshake::{while_alive, AttachHandshake, HandshakeOutcome};
use crate::transport::WsConnector;

/// A long-lived client session with the execution service
pub struct Session {
    attach: Channel,
    execute: Channel,
    /// Cleared by `shutdown`; stops any in-flight handshake
    liveness: CancellationToken,
    observer: Arc<dyn SessionObserver>,
    /// Serializes `execute` calls
    invocation: Mutex<()>,
}

impl Session {
    /// Create a session whose channels connect through `connector`
    pub fn new(
        config: &ClientConfig,
        connector: Arc<dyn Connector>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self {
            attach: Channel::new(
                ChannelKind::Attach,
                config.endpoint(ChannelKind::Attach),
                Arc::clone(&connector),
            ),
            execute: Channel::new(
                ChannelKind::Execute,
                config.endpoint(ChannelKind::Execute),
                connector,
            ),
            liveness: CancellationToken::new(),
            observer,
            invocation: Mutex::new(()),
        }
    }

    /// Create a session over WebSocket
    pub fn websocket(config: &ClientConfig, observer: Arc<dyn SessionObserver>) -> Self {
        Self::new(config, Arc::new(WsConnector::new()), observer)
    }

    /// Get one of the session's channels
    pub fn channel(&self, kind: ChannelKind) -> &Channel {
        match kind {
            ChannelKind::Attach => &self.attach,
            ChannelKind::Execute => &self.execute,
        }
    }

    /// Whether `shutdown` has not been called
    pub fn is_alive(&self) -> bool {
        !self.liveness.is_cancelled()
    }

    /// Submit a script for execution.
    ///
    /// Blank scripts are skipped without touching the network. Concurrent
    /// calls run one after another. Every `Finished` outcome has also been
    /// passed to the observer's `on_result`, exactly once.
    pub async fn execute(&self, script_text: &str) -> ExecuteOutcome {
        let Ok(script) = Script::new(script_text) else {
            debug!("Ignoring empty script");
            return ExecuteOutcome::Skipped;
        };

        let _invocation = self.invocation.lock().await;
        if !self.is_alive() {
            return ExecuteOutcome::Cancelled;
        }

        match self.run(script).await {
            Some(result) => {
                self.report(&result);
                ExecuteOutcome::Finished(result)
            }
            None => {
                debug!("Invocation cancelled by shutdown");
                ExecuteOutcome::Cancelled
            }
        }
    }

    /// Stop the session: end any handshake in progress and close both
    /// channels. Safe to call more than once.
    pub async fn shutdown(&self) {
        if self.is_alive() {
            info!("Shutting down session");
        }
        self.liveness.cancel();

        self.attach.close().await;
        self.execute.close().await;
    }

    /// One invocation; `None` means it was cancelled
    async fn run(&self, script: Script) -> Option<SessionResult> {
        for channel in [&self.attach, &self.execute] {
            match while_alive(&self.liveness, channel.open()).await? {
                Ok(()) => {}
                Err(e) => return self.settle(e),
            }
        }

        let mut handshake = AttachHandshake::new(&self.attach, &self.liveness, &*self.observer);
        match handshake.run().await {
            HandshakeOutcome::Ready => {}
            HandshakeOutcome::Failed(status) => {
                return Some(SessionResult::AttachFailed(status.as_str().to_string()))
            }
            HandshakeOutcome::Error(e) => return self.settle(e),
            HandshakeOutcome::Cancelled => return None,
        }

        debug!(len = script.len(), "Submitting script");
        let correlator = Correlator::new(&self.execute, REQUEST_TIMEOUT);
        let reply = match correlator.request(script.into_inner()).await {
            Ok(reply) => reply,
            Err(e) => return self.settle(e),
        };

        match ExecuteReply::parse(&reply) {
            ExecuteReply::Ok => Some(SessionResult::Success),
            ExecuteReply::Unexpected(reply) => Some(SessionResult::ExecuteFailed(format!(
                "unexpected response {:?}, please report this",
                reply
            ))),
        }
    }

    /// Map a channel failure to a result, or to cancellation if the session
    /// was shut down underneath it
    fn settle(&self, e: ChannelError) -> Option<SessionResult> {
        if !self.is_alive() {
            return None;
        }

        let reason = e.to_string();
        Some(if e.is_timeout() {
            SessionResult::Timeout(reason)
        } else if e.is_connection_failure() {
            SessionResult::ConnectFailed(reason)
        } else {
            SessionResult::ExecuteFailed(reason)
        })
    }

    /// The single reporting step for a finished invocation
    fn report(&self, result: &SessionResult) {
        if result.is_success() {
            info!("Script executed");
        } else {
            warn!(outcome = result.label(), "{}", result);
        }
        self.observer.on_result(result);
    }
}
