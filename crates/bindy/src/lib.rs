//! `bindy` — multi-event registration and listener identity on top of a
//! primitive host event system.
//!
//! The host ([`EventHost`](bindy_events::EventHost)) can attach one handler to
//! one event name and detach it again through an opaque handle. This crate adds:
//!
//! - registration strings naming several events (`"click touch"`);
//! - registration from a map of names to callbacks;
//! - one-shot listeners;
//! - removal by callback, by name, by delivered payload, or all at once.
//!
//! The host only ever sees wrapper handlers. Each [`Callback`] carries a
//! lazily assigned identity, and every host handle installed for it is
//! recorded in the instance's ledger under that identity, which is how
//! `off(&callback)` finds all of them again.

mod binder;
pub mod callback;
pub mod config;
pub mod ledger;
pub mod observable;
pub mod request;
pub mod unbinder;

pub use bindy_core::{Identity, InstanceId};
pub use bindy_events::{Event, EventHost, InMemoryHost};
pub use callback::Callback;
pub use config::ObservableConfig;
pub use observable::Observable;
pub use request::{Bind, Binding, EventMap, Off};
