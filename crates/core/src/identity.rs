//! Lazily assigned, write-once identities.
//!
//! Listener callbacks have no usable identity of their own: closures cannot be
//! compared, and pointer addresses are recycled. Types that need one embed an
//! [`IdentityTag`] and expose it through [`Tagged`]. The first call to [`get`]
//! allocates a process-unique [`Identity`]; later calls return the same value.

use core::num::NonZeroU64;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a tagged value.
///
/// Allocated monotonically and never reused. Only equality is meaningful.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(NonZeroU64);

impl Identity {
    fn allocate() -> Self {
        let raw = NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and a u64 does not wrap in practice.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MAX))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Write-once identity slot.
///
/// Not `Clone`: a copied slot would let two values share an identity by
/// accident. Share the owning value (e.g. behind an `Arc`) instead.
#[derive(Debug, Default)]
pub struct IdentityTag(OnceLock<Identity>);

impl IdentityTag {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// The identity, if one was assigned already.
    pub fn peek(&self) -> Option<Identity> {
        self.0.get().copied()
    }

    fn get_or_assign(&self) -> Identity {
        *self.0.get_or_init(Identity::allocate)
    }
}

/// A value that carries an [`IdentityTag`].
pub trait Tagged {
    fn identity_tag(&self) -> &IdentityTag;
}

impl<T: Tagged + ?Sized> Tagged for &T {
    fn identity_tag(&self) -> &IdentityTag {
        (**self).identity_tag()
    }
}

/// Whether `value` has been assigned an identity.
pub fn has<T: Tagged + ?Sized>(value: &T) -> bool {
    value.identity_tag().peek().is_some()
}

/// The identity of `value`, allocating it on first use.
pub fn get<T: Tagged + ?Sized>(value: &T) -> Identity {
    value.identity_tag().get_or_assign()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Subject {
        tag: IdentityTag,
    }

    impl Tagged for Subject {
        fn identity_tag(&self) -> &IdentityTag {
            &self.tag
        }
    }

    #[test]
    fn tags_lazily() {
        let subject = Subject::default();
        assert!(!has(&subject));

        let id = get(&subject);
        assert!(has(&subject));
        assert_eq!(get(&subject), id);
    }

    #[test]
    fn serializes_as_plain_number() {
        let id = get(&Subject::default());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, id.get().to_string());
    }

    proptest! {
        #[test]
        fn identities_never_collide(count in 1usize..64) {
            let subjects: Vec<Subject> = (0..count).map(|_| Subject::default()).collect();
            let mut ids: Vec<u64> = subjects.iter().map(|p| get(p).get()).collect();

            // Asking again returns the same identity.
            for (subject, id) in subjects.iter().zip(&ids) {
                prop_assert_eq!(get(subject).get(), *id);
            }

            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), count);
        }
    }
}
