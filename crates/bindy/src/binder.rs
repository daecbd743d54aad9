//! Turning one registration request into host subscriptions.
//!
//! A single `on("click touch", f)` produces one host subscription per name.
//! The host only ever sees an [`Injector`] wrapping `f`; the ledger remembers
//! which callback each host handle belongs to so `off(f)` can find them all
//! later.

use std::sync::{Arc, OnceLock, Weak};

use bindy_core::{Identity, identity};
use bindy_events::{Event, HostHandler, ListenerHandle};
use chrono::Utc;
use serde_json::Value;

use crate::ledger::Record;
use crate::observable::{Observable, Shared};
use crate::{Callback, unbinder};

/// Subscription lifetime requested by the facade.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Mode {
    Persistent,
    Once,
}

/// Event names of a registration string: runs of non-whitespace.
pub(crate) fn split_names(names: &str) -> Vec<&str> {
    names.split_whitespace().collect()
}

/// Self-removal capability of a one-shot subscription.
///
/// Scoped to the one record it was created for; a recursive trigger or a
/// sibling registration of the same callback is never touched.
struct OneShot {
    handle: Arc<OnceLock<ListenerHandle>>,
}

impl OneShot {
    fn release(&self, shared: &Shared) {
        if let Some(ledger) = shared.ledger.current() {
            unbinder::release(&*shared.host, &ledger, &self.handle);
        }
    }
}

/// Host-level handler installed for one (name, callback) pair.
struct Injector {
    instance: Weak<Shared>,
    name: String,
    owner: Identity,
    callback: Callback,
    once: Option<OneShot>,
}

impl Injector {
    fn deliver(&self, payload: &mut Event, extra: &[Value]) {
        let Some(shared) = self.instance.upgrade() else {
            return;
        };

        // Triggered payloads are handed to every sibling handler in turn;
        // stamp a private copy so owner tags do not leak between them.
        let mut isolated;
        let event = if payload.is_triggered() && shared.config.isolate_triggered_payloads {
            isolated = payload.clone();
            &mut isolated
        } else {
            payload
        };
        event.stamp(&self.name, self.owner, Utc::now());

        if let Some(once) = &self.once {
            once.release(&shared);
        }

        tracing::trace!(
            instance = %shared.id,
            event = %self.name,
            owner = %self.owner,
            once = self.once.is_some(),
            "delivering"
        );

        let this = Observable::from_shared(shared);
        self.callback.call(&this, event, extra);
    }
}

/// Subscribe `callback` to every name in `names`.
///
/// The callback's identity owns every resulting record. Registering the same
/// callback twice yields independent records that both fire. Returns the
/// number of subscriptions installed.
pub(crate) fn bind(shared: &Arc<Shared>, names: &str, callback: &Callback, mode: Mode) -> usize {
    let names = split_names(names);
    if names.is_empty() {
        return 0;
    }

    let owner = identity::get(callback);
    loop {
        let ledger = shared.ledger.get();
        // Held across subscribe + push so a concurrent one-shot delivery cannot
        // look for its record before it exists.
        let mut events = ledger.lock();
        // A full `off` retired this ledger while we waited for it.
        if !shared.ledger.is_current(&ledger) {
            continue;
        }

        for name in &names {
            let slot = Arc::new(OnceLock::new());
            let injector = Injector {
                instance: Arc::downgrade(shared),
                name: (*name).to_owned(),
                owner,
                callback: callback.clone(),
                once: (mode == Mode::Once).then(|| OneShot {
                    handle: Arc::clone(&slot),
                }),
            };
            let handler: HostHandler =
                Arc::new(move |event: &mut Event, extra: &[Value]| injector.deliver(event, extra));

            let handle = match mode {
                Mode::Persistent => shared.host.subscribe(shared.id, name, handler),
                Mode::Once => shared.host.subscribe_once(shared.id, name, handler),
            };
            let _ = slot.set(handle.clone());

            events
                .entry((*name).to_owned())
                .or_default()
                .push(Record::new(handle, owner));
        }
        break;
    }

    tracing::debug!(
        instance = %shared.id,
        events = ?names,
        %owner,
        ?mode,
        "listener bound"
    );
    names.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_runs_of_whitespace() {
        assert_eq!(split_names("click"), vec!["click"]);
        assert_eq!(split_names("  click \t touch\ntap "), vec!["click", "touch", "tap"]);
        assert!(split_names("").is_empty());
        assert!(split_names(" \t\n").is_empty());
    }
}
