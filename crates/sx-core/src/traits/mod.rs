//! Core trait definitions

mod observer;
mod transport;

pub use observer::SessionObserver;
pub use transport::{Connector, FrameSink, FrameSource};
