//! Request/reply correlation
//!
//! Most exchanges with the service are "send one frame, wait for exactly one
//! reply". `ATTACH` is the exception: it is answered by a run of status
//! frames, read through a [`Subscription`]. The [`Correlator`] bounds every
//! wait with a deadline so a crashed or hung service can never block the
//! caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use sx_core::{ChannelError, ConnectionError};
use sx_protocol::ChannelKind;

use crate::channel::{Channel, ListenerSlot};

/// A request holding its channel's listener slot.
///
/// Inbound frames queue here until the request is dropped, which releases
/// the slot whichever way the wait ended.
pub(crate) struct PendingRequest {
    channel: ChannelKind,
    slot: Arc<ListenerSlot>,
    id: u64,
    replies: mpsc::UnboundedReceiver<String>,
}

impl PendingRequest {
    pub(crate) fn new(
        channel: ChannelKind,
        slot: Arc<ListenerSlot>,
        id: u64,
        replies: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        Self {
            channel,
            slot,
            id,
            replies,
        }
    }

    /// Wait up to `timeout` for the next queued frame
    async fn next(&mut self, timeout: Duration) -> Result<String, ChannelError> {
        match tokio::time::timeout(timeout, self.replies.recv()).await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(ChannelError::Closed(self.channel)),
            Err(_) => {
                debug!(channel = %self.channel, "Reply deadline expired");
                Err(ChannelError::Timeout {
                    channel: self.channel,
                    after: timeout,
                })
            }
        }
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        self.slot.release(self.id);
    }
}

/// Pairs requests on one channel with their replies
pub struct Correlator<'a> {
    channel: &'a Channel,
    timeout: Duration,
}

impl<'a> Correlator<'a> {
    /// Correlate on `channel`, giving each reply `timeout` to arrive
    pub fn new(channel: &'a Channel, timeout: Duration) -> Self {
        Self { channel, timeout }
    }

    /// Channel this correlator waits on
    pub fn channel(&self) -> &'a Channel {
        self.channel
    }

    /// Send `payload` and wait for the next inbound frame.
    ///
    /// The listener is registered before sending, so an immediate reply is
    /// never missed. Fails with [`ChannelError::RequestInFlight`] if another
    /// request on the same channel has not resolved yet.
    pub async fn request(&self, payload: impl Into<String>) -> Result<String, ChannelError> {
        let mut pending = self.channel.begin_request()?;
        self.channel.send(payload.into()).await?;
        pending.next(self.timeout).await
    }

    /// Send `payload` and keep the listener slot for every frame that
    /// follows, until the returned [`Subscription`] is dropped.
    pub async fn subscribe(&self, payload: impl Into<String>) -> Result<Subscription, ChannelError> {
        let pending = self.channel.begin_request()?;
        self.channel.send(payload.into()).await?;
        Ok(Subscription {
            pending,
            timeout: self.timeout,
        })
    }
}

/// Replies to one request that answers with a stream of frames
pub struct Subscription {
    pending: PendingRequest,
    timeout: Duration,
}

impl Subscription {
    /// Next frame in arrival order. Each call gets the full timeout.
    pub async fn next_reply(&mut self) -> Result<String, ChannelError> {
        self.pending.next(self.timeout).await
    }
}

/// Race a connection attempt against `deadline`.
///
/// Both a refused connection and an expired deadline surface as
/// [`ChannelError::ConnectFailed`].
pub async fn await_open<F, T>(
    channel: ChannelKind,
    connecting: F,
    deadline: Duration,
) -> Result<T, ChannelError>
where
    F: Future<Output = Result<T, ConnectionError>>,
{
    match tokio::time::timeout(deadline, connecting).await {
        Ok(Ok(connected)) => Ok(connected),
        Ok(Err(e)) => Err(ChannelError::ConnectFailed {
            channel,
            reason: e.to_string(),
        }),
        Err(_) => Err(ChannelError::ConnectFailed {
            channel,
            reason: format!("no connection within {:?}", deadline),
        }),
    }
}
