//! sx-client: Session protocol client for the synapse execution service
//!
//! Holds two WebSocket channels to the service, one for attaching to the
//! target and one for submitting scripts, and drives the attach handshake
//! in front of every script execution.

pub mod channel;
pub mod correlator;
pub mod handshake;
pub mod session;
pub mod transport;

pub use channel::Channel;
pub use correlator::{Correlator, Subscription};
pub use handshake::{AttachHandshake, HandshakeOutcome};
pub use session::Session;
pub use transport::{MemoryConnector, MemoryPeer, MemoryServer, WsConnector};
