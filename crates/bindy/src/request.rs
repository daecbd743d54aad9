//! Request shapes accepted by the facade.
//!
//! `on`/`one` and `off` accept several argument shapes. Each shape is a
//! variant here, resolved once at the call site through `From` impls, so the
//! facade dispatches with a plain `match`.

use bindy_events::Event;
use serde_json::Value;

use crate::Callback;

/// One value of an [`EventMap`].
///
/// Maps built from loosely-typed sources may carry values that are not
/// callbacks. Those entries are skipped, not rejected.
#[derive(Debug, Clone)]
pub enum Binding {
    Callback(Callback),
    Inert(Value),
}

impl From<Callback> for Binding {
    fn from(value: Callback) -> Self {
        Binding::Callback(value)
    }
}

impl From<&Callback> for Binding {
    fn from(value: &Callback) -> Self {
        Binding::Callback(value.clone())
    }
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Inert(value)
    }
}

/// Insertion-ordered map from event names to bindings.
///
/// Keys may hold several whitespace-separated names. Inserting an existing
/// key replaces its binding in place.
#[derive(Debug, Clone, Default)]
pub struct EventMap {
    entries: Vec<(String, Binding)>,
}

impl EventMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, names: impl Into<String>, binding: impl Into<Binding>) {
        let names = names.into();
        let binding = binding.into();
        match self.entries.iter_mut().find(|(k, _)| *k == names) {
            Some((_, slot)) => *slot = binding,
            None => self.entries.push((names, binding)),
        }
    }

    /// Builder-style [`EventMap::insert`].
    pub fn with(mut self, names: impl Into<String>, binding: impl Into<Binding>) -> Self {
        self.insert(names, binding);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EventMap
where
    K: Into<String>,
    V: Into<Binding>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = EventMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for EventMap
where
    K: Into<String>,
    V: Into<Binding>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// What to subscribe, for `on` and `one`.
#[derive(Debug, Clone)]
pub enum Bind {
    /// Whitespace-separated names, all bound to one callback.
    Names(String, Callback),
    /// One registration per callback entry; inert entries are skipped.
    Map(EventMap),
}

impl From<(&str, &Callback)> for Bind {
    fn from((names, callback): (&str, &Callback)) -> Self {
        Bind::Names(names.to_owned(), callback.clone())
    }
}

impl From<(&str, Callback)> for Bind {
    fn from((names, callback): (&str, Callback)) -> Self {
        Bind::Names(names.to_owned(), callback)
    }
}

impl From<(String, Callback)> for Bind {
    fn from((names, callback): (String, Callback)) -> Self {
        Bind::Names(names, callback)
    }
}

impl From<EventMap> for Bind {
    fn from(map: EventMap) -> Self {
        Bind::Map(map)
    }
}

/// What to remove, for `off`.
#[derive(Debug, Clone)]
pub enum Off {
    /// The registration that delivered this payload, for the payload's name.
    Event(Event),
    /// Each tagged callback entry, for its key's names.
    Map(EventMap),
    /// Every listener of these names.
    Names(String),
    /// Listeners of these names registered with this callback.
    NamesOf(String, Callback),
    /// Listeners registered with this callback, under any name.
    Callback(Callback),
    /// Every listener registered through this layer; the ledger is dropped.
    All,
    /// Like [`Off::All`], and also clears listeners installed directly on
    /// the host.
    Purge,
}

impl Off {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Off::Event(_) => "event",
            Off::Map(_) => "map",
            Off::Names(_) => "names",
            Off::NamesOf(..) => "names_of",
            Off::Callback(_) => "callback",
            Off::All => "all",
            Off::Purge => "purge",
        }
    }
}

impl From<&Event> for Off {
    fn from(event: &Event) -> Self {
        Off::Event(event.clone())
    }
}

impl From<EventMap> for Off {
    fn from(map: EventMap) -> Self {
        Off::Map(map)
    }
}

impl From<&str> for Off {
    fn from(names: &str) -> Self {
        Off::Names(names.to_owned())
    }
}

impl From<String> for Off {
    fn from(names: String) -> Self {
        Off::Names(names)
    }
}

impl From<(&str, &Callback)> for Off {
    fn from((names, callback): (&str, &Callback)) -> Self {
        Off::NamesOf(names.to_owned(), callback.clone())
    }
}

impl From<(&str, Callback)> for Off {
    fn from((names, callback): (&str, Callback)) -> Self {
        Off::NamesOf(names.to_owned(), callback)
    }
}

impl From<(String, Callback)> for Off {
    fn from((names, callback): (String, Callback)) -> Self {
        Off::NamesOf(names, callback)
    }
}

impl From<&Callback> for Off {
    fn from(callback: &Callback) -> Self {
        Off::Callback(callback.clone())
    }
}

impl From<Callback> for Off {
    fn from(callback: Callback) -> Self {
        Off::Callback(callback)
    }
}

/// `off(())` mirrors the argument-less form.
impl From<()> for Off {
    fn from(_: ()) -> Self {
        Off::All
    }
}
