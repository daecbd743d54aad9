//! Event payloads and the primitive host event system.

pub mod event;
pub mod host;
pub mod in_memory_host;

pub use event::Event;
pub use host::{EventHost, HostHandler, ListenerHandle};
pub use in_memory_host::InMemoryHost;
