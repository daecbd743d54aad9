//! The public event API of an instance.
//!
//! ```ignore
//! let host: Arc<dyn EventHost> = Arc::new(InMemoryHost::new());
//! let button = Observable::new(host);
//!
//! let clicked = Callback::new(|_, event, _| println!("{:?}", event.name()));
//! button
//!     .on(("click touch", &clicked))
//!     .trigger("click")
//!     .off(&clicked);
//! ```
//!
//! Every operation returns `&Self` for chaining and none of them fail:
//! a request that matches nothing is a no-op.

use std::sync::Arc;

use bindy_core::{InstanceId, identity};
use bindy_events::{Event, EventHost};
use serde_json::Value;

use crate::binder::{self, Mode, split_names};
use crate::ledger::{Ledger, LedgerSlot};
use crate::request::{Bind, Binding, Off};
use crate::{ObservableConfig, unbinder};

/// State shared by every handle to one instance.
pub(crate) struct Shared {
    pub(crate) id: InstanceId,
    pub(crate) host: Arc<dyn EventHost>,
    pub(crate) ledger: LedgerSlot,
    pub(crate) config: ObservableConfig,
}

impl Drop for Shared {
    fn drop(&mut self) {
        // Wrappers hold only a weak reference to the instance; detach them so
        // the host does not keep dead handlers around.
        self.host.clear_all(self.id);
    }
}

/// An object that events can be bound on, fired on and unbound from.
///
/// Cheap to clone; clones are handles to the same instance. When the last
/// handle is dropped all of the instance's host listeners are cleared.
#[derive(Clone)]
pub struct Observable {
    inner: Arc<Shared>,
}

impl Observable {
    pub fn new(host: Arc<dyn EventHost>) -> Self {
        Self::with_config(host, ObservableConfig::default())
    }

    pub fn with_config(host: Arc<dyn EventHost>, config: ObservableConfig) -> Self {
        Self {
            inner: Arc::new(Shared {
                id: InstanceId::new(),
                host,
                ledger: LedgerSlot::default(),
                config,
            }),
        }
    }

    pub(crate) fn from_shared(inner: Arc<Shared>) -> Self {
        Self { inner }
    }

    /// Identifier of this instance at the host.
    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    pub fn host(&self) -> &Arc<dyn EventHost> {
        &self.inner.host
    }

    pub fn config(&self) -> &ObservableConfig {
        &self.inner.config
    }

    /// Whether anything was ever bound through this API (since the last
    /// full `off`).
    pub fn has_ledger(&self) -> bool {
        self.inner.ledger.has()
    }

    /// Number of tracked subscriptions for `name`.
    pub fn subscriptions(&self, name: &str) -> usize {
        self.inner.ledger.current().map_or(0, |ledger| ledger.count(name))
    }

    /// Subscribe a callback.
    ///
    /// - `("click touch", &cb)` binds `cb` to each name;
    /// - an [`EventMap`](crate::EventMap) binds each callback entry to its key.
    pub fn on(&self, request: impl Into<Bind>) -> &Self {
        self.bind(request.into(), Mode::Persistent)
    }

    /// Like [`Observable::on`], but each resulting subscription delivers at
    /// most once.
    pub fn one(&self, request: impl Into<Bind>) -> &Self {
        self.bind(request.into(), Mode::Once)
    }

    fn bind(&self, request: Bind, mode: Mode) -> &Self {
        match request {
            Bind::Names(names, callback) => {
                binder::bind(&self.inner, &names, &callback, mode);
            }
            Bind::Map(map) => {
                for (names, binding) in map.iter() {
                    match binding {
                        Binding::Callback(callback) => {
                            binder::bind(&self.inner, names, callback, mode);
                        }
                        Binding::Inert(_) => {
                            tracing::trace!(instance = %self.id(), names, "skipping non-callback entry");
                        }
                    }
                }
            }
        }
        self
    }

    /// Unsubscribe. See [`Off`] for the accepted shapes.
    pub fn off(&self, request: impl Into<Off>) -> &Self {
        let request = request.into();
        let kind = request.kind();
        let removed = match request {
            Off::All => self.teardown(false),
            Off::Purge => self.teardown(true),
            request => match self.inner.ledger.current() {
                Some(ledger) => self.remove(&ledger, request),
                // Nothing was bound through this API.
                None => return self,
            },
        };

        tracing::debug!(instance = %self.id(), kind, removed, "listeners removed");
        self
    }

    fn remove(&self, ledger: &Ledger, request: Off) -> usize {
        let host = &*self.inner.host;
        match request {
            Off::Event(event) => match (event.name(), event.owner()) {
                (Some(name), Some(owner)) => unbinder::unbind(host, ledger, &[name], Some(owner)),
                _ => 0,
            },
            Off::Map(map) => map
                .iter()
                .map(|(names, binding)| match binding {
                    Binding::Callback(callback) if identity::has(callback) => unbinder::unbind(
                        host,
                        ledger,
                        &split_names(names),
                        Some(identity::get(callback)),
                    ),
                    _ => 0,
                })
                .sum::<usize>(),
            Off::Names(names) => unbinder::unbind(host, ledger, &split_names(&names), None),
            Off::NamesOf(names, callback) => {
                if identity::has(&callback) {
                    unbinder::unbind(
                        host,
                        ledger,
                        &split_names(&names),
                        Some(identity::get(&callback)),
                    )
                } else {
                    0
                }
            }
            Off::Callback(callback) => {
                if identity::has(&callback) {
                    unbinder::unbind(host, ledger, &ledger.names(), Some(identity::get(&callback)))
                } else {
                    0
                }
            }
            Off::All | Off::Purge => 0,
        }
    }

    /// Unbind every tracked record and retire the ledger, all under its lock.
    ///
    /// Without a ledger only a purge has work to do: it still clears the
    /// listeners installed directly on the host.
    fn teardown(&self, purge: bool) -> usize {
        let host = &*self.inner.host;
        loop {
            let ledger = if purge {
                self.inner.ledger.get()
            } else {
                match self.inner.ledger.current() {
                    Some(ledger) => ledger,
                    None => return 0,
                }
            };
            let mut events = ledger.lock();
            if !self.inner.ledger.is_current(&ledger) {
                continue;
            }

            let names: Vec<String> = events.keys().cloned().collect();
            let removed = unbinder::unbind_locked(host, &mut events, &names, None);
            if purge {
                host.clear_all(self.id());
            }
            self.inner.ledger.discard();
            events.clear();
            return removed;
        }
    }

    /// Fire `name` with a fresh triggered payload.
    pub fn trigger(&self, name: &str) -> &Self {
        self.trigger_with(name, &[])
    }

    /// Fire `name`; `args` are passed to every listener after the payload.
    pub fn trigger_with(&self, name: &str, args: &[Value]) -> &Self {
        tracing::trace!(instance = %self.id(), event = name, args = args.len(), "trigger");
        self.inner.host.fire(self.id(), name, Event::triggered(), args);
        self
    }
}

impl core::fmt::Debug for Observable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observable")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .field("ledger", &self.inner.ledger.current())
            .finish()
    }
}
