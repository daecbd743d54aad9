//! Host event system abstraction (primitive subscription mechanics only).
//!
//! The host knows how to attach a handler to one event name on one instance,
//! detach it again through the handle it returned, and fan a fired event out
//! to the attached handlers. It does **not** know anything about multi-name
//! registration strings, callback identity or one-shot bookkeeping; that is
//! the job of the layer built on top of it.
//!
//! ## Delivery contract
//!
//! - **Synchronous**: `fire` invokes every live handler before returning.
//! - **Ordered**: handlers run in registration order.
//! - **Reentrant**: a handler may subscribe, unsubscribe or fire again while
//!   it runs. Implementations must not hold internal locks across handler
//!   calls.

use std::sync::Arc;

use bindy_core::InstanceId;
use serde_json::Value;

use crate::Event;

/// Handler attached at the host level.
///
/// Receives the (possibly shared) payload and any extra positional arguments
/// given to `fire`.
pub type HostHandler = Arc<dyn Fn(&mut Event, &[Value]) + Send + Sync>;

/// Opaque handle for one host-level subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    instance: InstanceId,
    event: String,
    seq: u64,
}

impl ListenerHandle {
    pub fn new(instance: InstanceId, event: impl Into<String>, seq: u64) -> Self {
        Self {
            instance,
            event: event.into(),
            seq,
        }
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Primitive, single-event subscription surface.
///
/// ## Thread Safety
///
/// The trait requires `Send + Sync` so an instance can be shared across
/// threads. Dispatch itself stays synchronous on the firing thread.
pub trait EventHost: Send + Sync {
    /// Attach `handler` to every future firing of `event` on `instance`.
    fn subscribe(&self, instance: InstanceId, event: &str, handler: HostHandler) -> ListenerHandle;

    /// Like `subscribe`, but the host detaches the handler before its first
    /// delivery, so it runs at most once.
    fn subscribe_once(
        &self,
        instance: InstanceId,
        event: &str,
        handler: HostHandler,
    ) -> ListenerHandle;

    /// Detach a handler. Returns `false` if it was already gone.
    fn unsubscribe(&self, handle: &ListenerHandle) -> bool;

    /// Detach every handler on `instance`, however it was installed.
    fn clear_all(&self, instance: InstanceId);

    /// Synchronously deliver `payload` and `extra` to every live handler.
    fn fire(&self, instance: InstanceId, event: &str, payload: Event, extra: &[Value]);

    /// Number of live handlers for `event` on `instance`.
    fn listener_count(&self, instance: InstanceId, event: &str) -> usize;
}

impl<H> EventHost for Arc<H>
where
    H: EventHost + ?Sized,
{
    fn subscribe(&self, instance: InstanceId, event: &str, handler: HostHandler) -> ListenerHandle {
        (**self).subscribe(instance, event, handler)
    }

    fn subscribe_once(
        &self,
        instance: InstanceId,
        event: &str,
        handler: HostHandler,
    ) -> ListenerHandle {
        (**self).subscribe_once(instance, event, handler)
    }

    fn unsubscribe(&self, handle: &ListenerHandle) -> bool {
        (**self).unsubscribe(handle)
    }

    fn clear_all(&self, instance: InstanceId) {
        (**self).clear_all(instance)
    }

    fn fire(&self, instance: InstanceId, event: &str, payload: Event, extra: &[Value]) {
        (**self).fire(instance, event, payload, extra)
    }

    fn listener_count(&self, instance: InstanceId, event: &str) -> usize {
        (**self).listener_count(instance, event)
    }
}
