//! Attach handshake
//!
//! Decides whether the service's target is ready to accept scripts and, if
//! not, drives the attach sequence:
//!
//! ```text
//! Unknown ──IS_READY──▶ Checking ──TRUE──▶ Ready
//!                          │
//!                          └─other──▶ Attaching ──READY | ALREADY_ATTACHED | REATTACH_READY──▶ Ready
//!                                        │  ▲
//!                                        │  └─progress status (notify if changed)
//!                                        └─NOT_LATEST_VERSION | FAILED_TO_FIND | INTERRUPT──▶ Failed
//! ```
//!
//! `ATTACH` is sent once; afterwards the loop only reads. The attach
//! channel's listener slot stays claimed for the whole loop, so statuses the
//! service sends back to back are all seen, in order. There is no attempt
//! limit: the loop ends on a terminal status, a reply deadline, or session
//! shutdown.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sx_core::time::REQUEST_TIMEOUT;
use sx_core::traits::SessionObserver;
use sx_core::{ChannelError, HandshakeState};
use sx_protocol::{AttachRequest, AttachStatus, ReadinessReply};

use crate::channel::Channel;
use crate::correlator::Correlator;

/// How a handshake ended
#[derive(Debug)]
pub enum HandshakeOutcome {
    /// Target attached; scripts may be sent
    Ready,
    /// Service refused with this status
    Failed(AttachStatus),
    /// A wait failed: timeout, closed or broken channel
    Error(ChannelError),
    /// Session shut down mid-handshake
    Cancelled,
}

/// One run of the attach handshake over the attach channel
pub struct AttachHandshake<'a> {
    correlator: Correlator<'a>,
    liveness: &'a CancellationToken,
    observer: &'a dyn SessionObserver,
    state: HandshakeState,
    last_seen_status: Option<String>,
}

impl<'a> AttachHandshake<'a> {
    /// Prepare a handshake on an open attach channel
    pub fn new(
        channel: &'a Channel,
        liveness: &'a CancellationToken,
        observer: &'a dyn SessionObserver,
    ) -> Self {
        Self::with_timeout(channel, liveness, observer, REQUEST_TIMEOUT)
    }

    fn with_timeout(
        channel: &'a Channel,
        liveness: &'a CancellationToken,
        observer: &'a dyn SessionObserver,
        timeout: Duration,
    ) -> Self {
        Self {
            correlator: Correlator::new(channel, timeout),
            liveness,
            observer,
            state: HandshakeState::Unknown,
            last_seen_status: None,
        }
    }

    /// Current state
    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    /// Run to a terminal outcome
    pub async fn run(&mut self) -> HandshakeOutcome {
        if self.liveness.is_cancelled() {
            return HandshakeOutcome::Cancelled;
        }

        self.state = HandshakeState::Checking;
        let readiness = match while_alive(
            self.liveness,
            self.correlator.request(AttachRequest::IsReady.as_str()),
        )
        .await
        {
            Some(Ok(reply)) => ReadinessReply::parse(&reply),
            Some(Err(e)) => return self.fail_wait(e),
            None => return HandshakeOutcome::Cancelled,
        };

        if readiness.is_ready() {
            info!("Target is ready");
            self.state = HandshakeState::Ready;
            return HandshakeOutcome::Ready;
        }

        info!("Target is not ready, attaching");
        self.state = HandshakeState::Attaching;
        self.attach().await
    }

    /// Send `ATTACH` once, then read statuses until a terminal one
    async fn attach(&mut self) -> HandshakeOutcome {
        let subscribed = while_alive(
            self.liveness,
            self.correlator.subscribe(AttachRequest::Attach.as_str()),
        )
        .await;
        let mut replies = match subscribed {
            Some(Ok(replies)) => replies,
            Some(Err(e)) => return self.fail_wait(e),
            None => return HandshakeOutcome::Cancelled,
        };

        loop {
            if self.liveness.is_cancelled() {
                debug!("Session shut down while attaching");
                return HandshakeOutcome::Cancelled;
            }

            let status = match while_alive(self.liveness, replies.next_reply()).await {
                Some(Ok(reply)) => AttachStatus::parse(&reply),
                Some(Err(e)) => return self.fail_wait(e),
                None => return HandshakeOutcome::Cancelled,
            };
            debug!(status = %status, "Attach status");

            if status.is_attached() {
                info!(status = %status, "Target attached");
                self.state = HandshakeState::Ready;
                return HandshakeOutcome::Ready;
            } else if status.is_refusal() {
                warn!(status = %status, "Attach refused");
                self.state = HandshakeState::Failed(status.as_str().to_string());
                return HandshakeOutcome::Failed(status);
            } else if status.is_progress() {
                self.note_progress(status.as_str());
            }
        }
    }

    /// Notify the observer of a progress status unless it repeats the last one
    fn note_progress(&mut self, status: &str) {
        if self.last_seen_status.as_deref() == Some(status) {
            return;
        }
        self.observer.on_status_changed(status);
        self.last_seen_status = Some(status.to_string());
    }

    fn fail_wait(&self, e: ChannelError) -> HandshakeOutcome {
        // Closing the channels during shutdown fails the wait
        if self.liveness.is_cancelled() {
            return HandshakeOutcome::Cancelled;
        }
        warn!(state = ?self.state, error = %e, "Handshake wait failed");
        HandshakeOutcome::Error(e)
    }
}

/// Run `wait` unless the session shuts down first
pub(crate) async fn while_alive<F, T>(liveness: &CancellationToken, wait: F) -> Option<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = liveness.cancelled() => None,
        result = wait => Some(result),
    }
}
