//! Transport channel
//!
//! A [`Channel`] owns one connection to one endpoint of the service. It is
//! opened lazily, kept open across invocations and reopened if the remote
//! side drops it.
//!
//! Inbound frames are routed by a reader task into a single listener slot.
//! At most one request may hold the slot at a time. Frames queue for the
//! holder in arrival order until it releases the slot; a frame that arrives
//! while nobody holds it is dropped.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use sx_core::time::CONNECT_TIMEOUT;
use sx_core::traits::{Connector, FrameSink, FrameSource};
use sx_core::{ChannelError, ConnectionState};
use sx_protocol::ChannelKind;

use crate::correlator::{await_open, PendingRequest};

/// One of the two connections to the execution service
pub struct Channel {
    kind: ChannelKind,
    url: String,
    connector: Arc<dyn Connector>,
    /// Open connection, if any. Held across connect and send.
    link: AsyncMutex<Option<Link>>,
    state: Arc<watch::Sender<ConnectionState>>,
    listener: Arc<ListenerSlot>,
}

/// An established connection and the task reading from it
struct Link {
    sink: Box<dyn FrameSink>,
    reader: JoinHandle<()>,
}

impl Channel {
    /// Create a closed channel for `url`
    pub fn new(kind: ChannelKind, url: impl Into<String>, connector: Arc<dyn Connector>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Closed);
        Self {
            kind,
            url: url.into(),
            connector,
            link: AsyncMutex::new(None),
            state: Arc::new(state),
            listener: Arc::new(ListenerSlot::default()),
        }
    }

    /// Which conversation this channel carries
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Whether the channel is open
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Whether a request currently holds the listener slot
    pub fn has_pending_request(&self) -> bool {
        self.listener.is_occupied()
    }

    /// Open the connection if it is not already open.
    ///
    /// Resolves once the connection is established, or fails with
    /// [`ChannelError::ConnectFailed`] after [`CONNECT_TIMEOUT`].
    pub async fn open(&self) -> Result<(), ChannelError> {
        let mut link = self.link.lock().await;

        if self.state() == ConnectionState::Open && link.is_some() {
            return Ok(());
        }

        // Left over from a connection the remote closed
        if let Some(mut stale) = link.take() {
            stale.reader.abort();
            let _ = stale.sink.close().await;
        }

        debug!(channel = %self.kind, url = %self.url, "Opening channel");
        let opening = OpeningGuard::new(&self.state);

        let (sink, source) =
            await_open(self.kind, self.connector.connect(&self.url), CONNECT_TIMEOUT).await?;

        let reader = tokio::spawn(route_inbound(
            self.kind,
            source,
            Arc::clone(&self.listener),
            Arc::clone(&self.state),
        ));
        *link = Some(Link { sink, reader });
        opening.opened();

        debug!(channel = %self.kind, "Channel open");
        Ok(())
    }

    /// Send one text frame on the open channel
    pub async fn send(&self, text: String) -> Result<(), ChannelError> {
        let mut link = self.link.lock().await;
        let link = match link.as_mut() {
            Some(link) if self.is_open() => link,
            _ => return Err(ChannelError::NotOpen(self.kind)),
        };

        debug!(channel = %self.kind, len = text.len(), "Sending frame");
        link.sink
            .send_text(text)
            .await
            .map_err(|source| ChannelError::Transport {
                channel: self.kind,
                source,
            })
    }

    /// Close the connection. No-op if already closed.
    pub async fn close(&self) {
        let mut link = self.link.lock().await;

        if let Some(mut open) = link.take() {
            open.reader.abort();
            if let Err(e) = open.sink.close().await {
                debug!(channel = %self.kind, error = %e, "Error while closing channel");
            }
            debug!(channel = %self.kind, "Channel closed");
        }

        self.listener.abandon();
        self.state.send_replace(ConnectionState::Closed);
    }

    /// Claim the listener slot until the returned request is dropped.
    ///
    /// Fails with [`ChannelError::RequestInFlight`] if another request holds it.
    pub(crate) fn begin_request(&self) -> Result<PendingRequest, ChannelError> {
        let (id, replies) = self
            .listener
            .register()
            .ok_or(ChannelError::RequestInFlight(self.kind))?;

        Ok(PendingRequest::new(
            self.kind,
            Arc::clone(&self.listener),
            id,
            replies,
        ))
    }
}

/// Reader task: routes inbound frames to whoever is waiting
async fn route_inbound(
    kind: ChannelKind,
    mut source: Box<dyn FrameSource>,
    listener: Arc<ListenerSlot>,
    state: Arc<watch::Sender<ConnectionState>>,
) {
    while let Some(frame) = source.next_text().await {
        match frame {
            Ok(text) => {
                if let Err(text) = listener.deliver(text) {
                    debug!(channel = %kind, frame = %text, "Dropping frame with no waiting request");
                }
            }
            Err(e) => {
                warn!(channel = %kind, error = %e, "Channel read failed");
                break;
            }
        }
    }

    debug!(channel = %kind, "Channel closed by remote");
    state.send_replace(ConnectionState::Closed);
    listener.abandon();
}

/// Marks a channel `Opening` and falls back to `Closed` unless the open
/// completes, including when the opening future is dropped.
struct OpeningGuard<'a> {
    state: &'a watch::Sender<ConnectionState>,
    opened: bool,
}

impl<'a> OpeningGuard<'a> {
    fn new(state: &'a watch::Sender<ConnectionState>) -> Self {
        state.send_replace(ConnectionState::Opening);
        Self {
            state,
            opened: false,
        }
    }

    fn opened(mut self) {
        self.opened = true;
        self.state.send_replace(ConnectionState::Open);
    }
}

impl Drop for OpeningGuard<'_> {
    fn drop(&mut self) {
        if !self.opened {
            self.state.send_replace(ConnectionState::Closed);
        }
    }
}

/// The single place an inbound frame can go
#[derive(Default)]
pub(crate) struct ListenerSlot {
    inner: Mutex<SlotInner>,
}

#[derive(Default)]
struct SlotInner {
    next_id: u64,
    pending: Option<Pending>,
}

struct Pending {
    id: u64,
    /// Dropped when the connection goes away
    replies: Option<mpsc::UnboundedSender<String>>,
}

impl ListenerSlot {
    fn lock(&self) -> std::sync::MutexGuard<'_, SlotInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the slot. Returns `None` if it is already held.
    fn register(&self) -> Option<(u64, mpsc::UnboundedReceiver<String>)> {
        let mut inner = self.lock();
        if inner.pending.is_some() {
            return None;
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let (tx, rx) = mpsc::unbounded_channel();
        inner.pending = Some(Pending {
            id,
            replies: Some(tx),
        });
        Some((id, rx))
    }

    /// Queue a frame for the holder, or give it back if nobody holds the slot
    fn deliver(&self, text: String) -> Result<(), String> {
        let inner = self.lock();
        match inner.pending.as_ref().and_then(|p| p.replies.as_ref()) {
            Some(tx) => tx.send(text).map_err(|rejected| rejected.0),
            None => Err(text),
        }
    }

    /// Fail the holder, if any, as closed once its queue drains
    fn abandon(&self) {
        if let Some(pending) = self.lock().pending.as_mut() {
            pending.replies = None;
        }
    }

    /// Free the slot if request `id` still holds it
    pub(crate) fn release(&self, id: u64) {
        let mut inner = self.lock();
        if inner.pending.as_ref().is_some_and(|p| p.id == id) {
            inner.pending = None;
        }
    }

    fn is_occupied(&self) -> bool {
        self.lock().pending.is_some()
    }
}
