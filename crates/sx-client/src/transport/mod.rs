//! Socket implementations behind the channel's `Connector` seam

mod memory;
mod websocket;

pub use memory::{MemoryConnector, MemoryPeer, MemoryServer};
pub use websocket::WsConnector;
