//! In-memory host event system for tests/dev.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bindy_core::InstanceId;
use serde_json::Value;

use crate::host::{EventHost, HostHandler, ListenerHandle};
use crate::Event;

struct Entry {
    handle: ListenerHandle,
    once: bool,
    handler: HostHandler,
}

#[derive(Default)]
struct State {
    next_seq: u64,
    instances: HashMap<InstanceId, Vec<Entry>>,
}

/// In-memory host.
///
/// - No IO / no async
/// - Registration-ordered, synchronous fan-out
/// - One payload object is reused across every handler of a firing
/// - Handlers detached mid-dispatch are skipped
#[derive(Default)]
pub struct InMemoryHost {
    state: Mutex<State>,
}

impl core::fmt::Debug for InMemoryHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.lock();
        f.debug_struct("InMemoryHost")
            .field("instances", &state.instances.len())
            .field("next_seq", &state.next_seq)
            .finish()
    }
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation below completes before the guard drops, so a poisoned
    // lock still guards a consistent map.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("in-memory host lock poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn attach(
        &self,
        instance: InstanceId,
        event: &str,
        handler: HostHandler,
        once: bool,
    ) -> ListenerHandle {
        let mut state = self.lock();
        state.next_seq += 1;
        let handle = ListenerHandle::new(instance, event, state.next_seq);

        state.instances.entry(instance).or_default().push(Entry {
            handle: handle.clone(),
            once,
            handler,
        });

        tracing::trace!(%instance, event, seq = handle.seq(), once, "host listener attached");
        handle
    }

    /// Claim the right to run `handle` once more.
    ///
    /// Returns `None` if the handle was detached since the snapshot was taken.
    /// One-shot entries are detached here, under the same lock, so two
    /// reentrant firings can never both claim them. The detached entry is
    /// handed back so it is dropped after the lock is released.
    fn claim(&self, handle: &ListenerHandle) -> Option<Option<Entry>> {
        let mut state = self.lock();
        let entries = state.instances.get_mut(&handle.instance())?;
        let pos = entries.iter().position(|e| &e.handle == handle)?;
        Some(entries[pos].once.then(|| entries.remove(pos)))
    }

    /// Detach entries matching `pred`. Dropping a handler can release the last
    /// reference to an instance, which calls back into the host, so the
    /// detached entries are returned to be dropped outside the lock.
    fn detach(&self, instance: InstanceId, pred: impl Fn(&Entry) -> bool) -> Vec<Entry> {
        let mut state = self.lock();
        let Some(entries) = state.instances.get_mut(&instance) else {
            return Vec::new();
        };

        let mut detached = Vec::new();
        let mut i = 0;
        while i < entries.len() {
            if pred(&entries[i]) {
                detached.push(entries.remove(i));
            } else {
                i += 1;
            }
        }

        if entries.is_empty() {
            state.instances.remove(&instance);
        }
        detached
    }
}

impl EventHost for InMemoryHost {
    fn subscribe(&self, instance: InstanceId, event: &str, handler: HostHandler) -> ListenerHandle {
        self.attach(instance, event, handler, false)
    }

    fn subscribe_once(
        &self,
        instance: InstanceId,
        event: &str,
        handler: HostHandler,
    ) -> ListenerHandle {
        self.attach(instance, event, handler, true)
    }

    fn unsubscribe(&self, handle: &ListenerHandle) -> bool {
        !self.detach(handle.instance(), |e| &e.handle == handle).is_empty()
    }

    fn clear_all(&self, instance: InstanceId) {
        let detached = self.detach(instance, |_| true);
        if !detached.is_empty() {
            tracing::debug!(%instance, removed = detached.len(), "host listeners cleared");
        }
    }

    fn fire(&self, instance: InstanceId, event: &str, mut payload: Event, extra: &[Value]) {
        // Snapshot under the lock; handlers run with the lock released so they
        // can subscribe, unsubscribe or fire again.
        let snapshot: Vec<(ListenerHandle, HostHandler)> = {
            let state = self.lock();
            state
                .instances
                .get(&instance)
                .map(|entries| {
                    entries
                        .iter()
                        .filter(|e| e.handle.event() == event)
                        .map(|e| (e.handle.clone(), e.handler.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        for (handle, handler) in snapshot {
            if let Some(_detached) = self.claim(&handle) {
                handler(&mut payload, extra);
            }
        }
    }

    fn listener_count(&self, instance: InstanceId, event: &str) -> usize {
        self.lock()
            .instances
            .get(&instance)
            .map_or(0, |entries| entries.iter().filter(|e| e.handle.event() == event).count())
    }
}
