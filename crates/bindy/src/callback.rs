//! Listener callbacks with a stable identity.

use std::sync::Arc;

use bindy_core::{Identity, IdentityTag, Tagged};
use bindy_events::Event;
use serde_json::Value;

use crate::Observable;

/// Signature of a listener: the instance it fired on, the stamped payload and
/// any extra arguments passed to the trigger.
pub type CallbackFn = dyn Fn(&Observable, &Event, &[Value]) + Send + Sync;

struct Inner {
    tag: IdentityTag,
    f: Box<CallbackFn>,
}

/// A listener callback.
///
/// Clones share one identity: registering a clone and removing with the
/// original (or the other way round) targets the same listener. Two callbacks
/// built from separate `Callback::new` calls never share an identity, even if
/// they wrap the same function.
#[derive(Clone)]
pub struct Callback {
    inner: Arc<Inner>,
}

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Observable, &Event, &[Value]) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                tag: IdentityTag::new(),
                f: Box::new(f),
            }),
        }
    }

    /// Identity assigned at first registration, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.inner.tag.peek()
    }

    pub(crate) fn call(&self, this: &Observable, event: &Event, extra: &[Value]) {
        (self.inner.f)(this, event, extra)
    }
}

impl Tagged for Callback {
    fn identity_tag(&self) -> &IdentityTag {
        &self.inner.tag
    }
}

impl core::fmt::Debug for Callback {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callback")
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindy_core::identity;

    #[test]
    fn clones_share_identity() {
        let a = Callback::new(|_, _, _| {});
        let b = a.clone();
        assert!(!identity::has(&b));

        let id = identity::get(&a);
        assert!(identity::has(&b));
        assert_eq!(b.identity(), Some(id));
    }

    #[test]
    fn separate_callbacks_get_separate_identities() {
        fn noop(_: &Observable, _: &Event, _: &[Value]) {}

        let a = Callback::new(noop);
        let b = Callback::new(noop);
        assert_ne!(identity::get(&a), identity::get(&b));
    }
}
