//! Handles to live subscriptions.

use keywatch_core::{KeySpec, SubscriptionId, TargetId};
use keywatch_std::{RegistryRef, Subscription};
use std::{fmt, rc::Rc};

/// An opaque handle to one `watch` registration.
///
/// Clones refer to the same registration. Stopping is idempotent and a
/// handle never keeps its registry alive.
///
/// A handle keeps its callback alive. A callback that captures its own
/// handle forms an `Rc` cycle, even after stopping, until the captured handle
/// is dropped (for example by storing it in an `Option` and taking it out).
#[derive(Clone)]
pub struct WatchHandle {
    target: TargetId,
    subscription: Rc<Subscription>,
    registry: RegistryRef,
}

impl WatchHandle {
    pub(crate) fn new(target: TargetId, subscription: Rc<Subscription>, registry: RegistryRef) -> Self {
        Self {
            target,
            subscription,
            registry,
        }
    }

    /// Identity of the underlying subscription.
    pub fn id(&self) -> SubscriptionId {
        self.subscription.id()
    }

    /// Identity of the target the subscription was installed on.
    pub fn target_id(&self) -> TargetId {
        self.target
    }

    /// The current key spec.
    pub fn key_spec(&self) -> KeySpec {
        self.subscription.key_spec()
    }

    /// Whether the subscription is still registered.
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stop the subscription. A no-op if already stopped.
    pub fn stop(&self) {
        self.registry.unsubscribe(self.target, &self.subscription);
    }

    /// Tie the subscription's lifetime to the returned guard.
    pub fn into_guard(self) -> WatchGuard {
        WatchGuard {
            handle: self,
            armed: true,
        }
    }

    pub(crate) fn subscription(&self) -> &Rc<Subscription> {
        &self.subscription
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("id", &self.id())
            .field("target", &self.target)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Stops its subscription when dropped.
#[derive(Debug)]
pub struct WatchGuard {
    handle: WatchHandle,
    armed: bool,
}

impl WatchGuard {
    /// The guarded handle.
    pub fn handle(&self) -> &WatchHandle {
        &self.handle
    }

    /// Disarm the guard and hand the subscription back to the caller.
    pub fn release(mut self) -> WatchHandle {
        self.armed = false;
        self.handle.clone()
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if self.armed {
            self.handle.stop();
        }
    }
}
