//! Per-instance bookkeeping of host subscriptions.
//!
//! The ledger only records what was installed at the host. It never talks to
//! the host itself: removal always goes through the unbinder first, then the
//! ledger is discarded while still locked. Writers lock a ledger and then
//! check [`LedgerSlot::is_current`], so nothing lands in a retired one.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bindy_core::Identity;
use bindy_events::ListenerHandle;

/// One live host subscription, tagged with the callback that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    handle: ListenerHandle,
    owner: Identity,
}

impl Record {
    pub fn new(handle: ListenerHandle, owner: Identity) -> Self {
        Self { handle, owner }
    }

    pub fn handle(&self) -> &ListenerHandle {
        &self.handle
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }
}

pub(crate) type Records = BTreeMap<String, Vec<Record>>;

fn recover<'a, T>(result: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>) -> MutexGuard<'a, T> {
    result.unwrap_or_else(|poisoned| {
        tracing::warn!("ledger lock poisoned; recovering");
        poisoned.into_inner()
    })
}

/// Event name → records, in registration order.
#[derive(Debug, Default)]
pub struct Ledger {
    events: Mutex<Records>,
}

impl Ledger {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Records> {
        recover(self.events.lock())
    }

    /// Names that have (or had) records.
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Number of records for `name`.
    pub fn count(&self, name: &str) -> usize {
        self.lock().get(name).map_or(0, Vec::len)
    }

    /// Number of records across all names.
    pub fn total(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    /// Snapshot of the records for `name`.
    pub fn records(&self, name: &str) -> Vec<Record> {
        self.lock().get(name).cloned().unwrap_or_default()
    }
}

/// Lazily created ledger slot owned by one instance.
#[derive(Debug, Default)]
pub struct LedgerSlot {
    slot: Mutex<Option<Arc<Ledger>>>,
}

impl LedgerSlot {
    pub fn has(&self) -> bool {
        recover(self.slot.lock()).is_some()
    }

    /// The ledger, created empty on first use.
    pub fn get(&self) -> Arc<Ledger> {
        Arc::clone(recover(self.slot.lock()).get_or_insert_with(Default::default))
    }

    /// The ledger, if one exists.
    pub fn current(&self) -> Option<Arc<Ledger>> {
        recover(self.slot.lock()).clone()
    }

    /// Whether `ledger` is still the one in the slot.
    pub fn is_current(&self, ledger: &Arc<Ledger>) -> bool {
        recover(self.slot.lock())
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, ledger))
    }

    /// Empty the slot; the next [`LedgerSlot::get`] starts a fresh ledger.
    ///
    /// Host subscriptions must already be gone. Never locks the ledger itself,
    /// so it may be called while holding it.
    pub fn discard(&self) -> Option<Arc<Ledger>> {
        recover(self.slot.lock()).take()
    }
}
