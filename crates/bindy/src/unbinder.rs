//! Removal of host subscriptions tracked by a ledger.
//!
//! Every record leaves the ledger and the host together, under the ledger
//! lock, so the two never disagree.

use std::sync::OnceLock;

use bindy_core::Identity;
use bindy_events::{EventHost, ListenerHandle};

use crate::ledger::{Ledger, Records};

/// Remove the records of `names` owned by `owner` (any owner when `None`).
///
/// Each list is scanned from the back so removal does not disturb the
/// indices still to visit. Emptied lists stay in the ledger. Returns the
/// number of removed records.
pub fn unbind<S: AsRef<str>>(
    host: &dyn EventHost,
    ledger: &Ledger,
    names: &[S],
    owner: Option<Identity>,
) -> usize {
    unbind_locked(host, &mut ledger.lock(), names, owner)
}

/// [`unbind`] for a caller that already holds the ledger lock.
pub(crate) fn unbind_locked<S: AsRef<str>>(
    host: &dyn EventHost,
    events: &mut Records,
    names: &[S],
    owner: Option<Identity>,
) -> usize {
    let mut removed = 0;

    for name in names {
        let Some(records) = events.get_mut(name.as_ref()) else {
            continue;
        };

        let mut i = records.len();
        while i > 0 {
            i -= 1;
            if owner.is_none_or(|id| id == records[i].owner()) {
                let record = records.remove(i);
                host.unsubscribe(record.handle());
                removed += 1;
            }
        }
    }

    removed
}

/// Remove exactly one record: the one whose handle sits in `slot`.
///
/// The slot is read under the ledger lock. The binder fills it before
/// releasing that lock, so a delivery racing its own registration waits for
/// the record instead of missing it.
///
/// Returns `false` when the record is already gone (removed by an `off` that
/// ran first, or by a ledger teardown).
pub fn release(host: &dyn EventHost, ledger: &Ledger, slot: &OnceLock<ListenerHandle>) -> bool {
    let mut events = ledger.lock();
    let Some(handle) = slot.get() else {
        return false;
    };
    let Some(records) = events.get_mut(handle.event()) else {
        return false;
    };
    let Some(pos) = records.iter().rposition(|r| r.handle() == handle) else {
        return false;
    };

    let record = records.remove(pos);
    // The host detaches one-shot entries itself before delivery; this is a
    // no-op then, and keeps the ledger honest for hosts that do not.
    host.unsubscribe(record.handle());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bindy_core::{IdentityTag, InstanceId, Tagged, identity};
    use bindy_events::{Event, InMemoryHost};
    use serde_json::Value;

    use crate::ledger::Record;

    struct Owner(IdentityTag);

    impl Tagged for Owner {
        fn identity_tag(&self) -> &IdentityTag {
            &self.0
        }
    }

    fn owner() -> Identity {
        identity::get(&Owner(IdentityTag::new()))
    }

    fn install(host: &InMemoryHost, ledger: &Ledger, instance: InstanceId, name: &str, owner: Identity) -> ListenerHandle {
        let handle = host.subscribe(instance, name, Arc::new(|_: &mut Event, _: &[Value]| {}));
        ledger
            .lock()
            .entry(name.to_owned())
            .or_default()
            .push(Record::new(handle.clone(), owner));
        handle
    }

    #[test]
    fn filters_by_owner() {
        let host = InMemoryHost::new();
        let ledger = Ledger::default();
        let instance = InstanceId::new();
        let (a, b) = (owner(), owner());

        install(&host, &ledger, instance, "click", a);
        install(&host, &ledger, instance, "click", b);
        install(&host, &ledger, instance, "click", a);

        assert_eq!(unbind(&host, &ledger, &["click"], Some(a)), 2);
        assert_eq!(ledger.count("click"), 1);
        assert_eq!(ledger.records("click")[0].owner(), b);
        assert_eq!(host.listener_count(instance, "click"), 1);
    }

    #[test]
    fn no_owner_removes_everything_and_keeps_the_key() {
        let host = InMemoryHost::new();
        let ledger = Ledger::default();
        let instance = InstanceId::new();

        install(&host, &ledger, instance, "click", owner());
        install(&host, &ledger, instance, "touch", owner());

        assert_eq!(unbind(&host, &ledger, &["click", "tap"], None), 1);
        assert_eq!(ledger.names(), vec!["click".to_string(), "touch".to_string()]);
        assert_eq!(host.listener_count(instance, "click"), 0);
        assert_eq!(host.listener_count(instance, "touch"), 1);
    }

    #[test]
    fn release_targets_a_single_record() {
        let host = InMemoryHost::new();
        let ledger = Ledger::default();
        let instance = InstanceId::new();
        let a = owner();

        let first = OnceLock::from(install(&host, &ledger, instance, "click", a));
        install(&host, &ledger, instance, "click", a);

        assert!(release(&host, &ledger, &first));
        assert!(!release(&host, &ledger, &first));
        assert_eq!(ledger.count("click"), 1);
        assert_eq!(host.listener_count(instance, "click"), 1);
    }

    #[test]
    fn release_with_an_unfilled_slot_removes_nothing() {
        let host = InMemoryHost::new();
        let ledger = Ledger::default();
        let instance = InstanceId::new();

        install(&host, &ledger, instance, "click", owner());

        assert!(!release(&host, &ledger, &OnceLock::new()));
        assert_eq!(ledger.count("click"), 1);
        assert_eq!(host.listener_count(instance, "click"), 1);
    }
}
