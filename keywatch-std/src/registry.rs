//! Registry of per-target native listeners and subscriptions.
//!
//! Every target with at least one live subscription has exactly one entry,
//! and every entry owns exactly one native listener installed on its target.
//! The listener is installed on the 0→1 transition of the entry's
//! subscription count and removed on the 1→0 transition, never otherwise.
//!
//! Host calls (`add_event_listener` / `remove_event_listener`) are made after
//! the registry's own bookkeeping is finished and its borrow released, so a
//! host that re-enters the registry from inside those calls sees a
//! consistent state.

use crate::{
    dispatch::{self, DispatchPolicy, DispatchReport, ErrorSink},
    error::SubscribeError,
    subscription::Subscription,
};
use keywatch_core::{
    CallbackError, EventTarget, KeyEvent, KeyHandler, KeySpec, ListenMode, NativeListener,
    SubscriptionId, TargetId,
};
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap, hash_map},
    fmt, mem, ptr,
    rc::{Rc, Weak},
};

struct Entry {
    target: Rc<dyn EventTarget>,
    native: NativeListener,
    subscriptions: BTreeMap<SubscriptionId, Rc<Subscription>>,
}

pub(crate) struct RegistryState {
    entries: HashMap<TargetId, Entry>,
    mode: ListenMode,
    policy: DispatchPolicy,
    next_id: u64,
}

impl RegistryState {
    /// Snapshot of the subscriptions registered on `target`, in id order.
    pub(crate) fn subscriptions(&self, target: TargetId) -> Option<Vec<Rc<Subscription>>> {
        self.entries
            .get(&target)
            .map(|entry| entry.subscriptions.values().cloned().collect())
    }

    pub(crate) fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }
}

/// The subscription multiplexer.
///
/// Constructed explicitly and owned by whoever drives it, so several isolated
/// registries can coexist (one per test, one per window, ...). Dropping the
/// registry detaches every native listener it installed.
///
/// # Example
///
/// ```rust
/// use keywatch_std::{Registry, testing::{KeyRecorder, MockTarget}};
/// use keywatch_core::{EventTarget, KeySpec, TargetId};
/// use std::rc::Rc;
///
/// let registry = Registry::new();
/// let window = Rc::new(MockTarget::new());
/// let target: Rc<dyn EventTarget> = window.clone();
/// let recorder = KeyRecorder::new();
///
/// let subscription = registry.create_subscription(KeySpec::from("KeyG"), Rc::new(recorder.clone()));
/// registry.subscribe(&target, &subscription).unwrap();
/// window.key_down("KeyG");
/// assert_eq!(recorder.count(), 1);
///
/// registry.unsubscribe(TargetId::of(&target), &subscription);
/// assert!(!window.is_listening());
/// ```
pub struct Registry {
    state: Rc<RefCell<RegistryState>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry listening for presses only, catching callback panics.
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    /// Start configuring a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The native event types installed on each target.
    pub fn mode(&self) -> ListenMode {
        self.state.borrow().mode
    }

    /// A weak reference that can unsubscribe without keeping the registry
    /// alive.
    pub fn downgrade(&self) -> RegistryRef {
        RegistryRef {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Allocate a subscription record with a fresh identity.
    ///
    /// The record is inactive until passed to [`Registry::subscribe`].
    pub fn create_subscription(
        &self,
        key_spec: KeySpec,
        handler: Rc<dyn KeyHandler>,
    ) -> Rc<Subscription> {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            SubscriptionId::new(state.next_id)
        };
        Rc::new(Subscription::new(id, key_spec, handler, Rc::downgrade(&self.state)))
    }

    /// Allocate a fresh subscription and register it on `target`.
    pub fn register(
        &self,
        target: &Rc<dyn EventTarget>,
        key_spec: KeySpec,
        handler: Rc<dyn KeyHandler>,
    ) -> Rc<Subscription> {
        let subscription = self.create_subscription(key_spec, handler);
        self.insert(target, &subscription);
        subscription
    }

    /// Register `subscription` on `target`.
    ///
    /// Installs the native listener if this is the target's first
    /// subscription. Records allocated by another registry and records that
    /// are already registered (on this or any other target) are refused,
    /// leaving the registry untouched.
    pub fn subscribe(
        &self,
        target: &Rc<dyn EventTarget>,
        subscription: &Rc<Subscription>,
    ) -> Result<(), SubscribeError> {
        if !subscription.is_owned_by(&self.state) {
            return Err(SubscribeError::ForeignSubscription(subscription.id()));
        }
        if subscription.is_active() {
            return Err(SubscribeError::AlreadySubscribed(subscription.id()));
        }
        self.insert(target, subscription);
        Ok(())
    }

    fn insert(&self, target: &Rc<dyn EventTarget>, subscription: &Rc<Subscription>) {
        let target_id = TargetId::of(target);

        let attach = {
            let mut state = self.state.borrow_mut();
            let mode = state.mode;
            match state.entries.entry(target_id) {
                hash_map::Entry::Occupied(mut occupied) => {
                    occupied
                        .get_mut()
                        .subscriptions
                        .insert(subscription.id(), Rc::clone(subscription));
                    None
                }
                hash_map::Entry::Vacant(vacant) => {
                    let native = dispatch::native_listener(Rc::downgrade(&self.state), target_id);
                    vacant.insert(Entry {
                        target: Rc::clone(target),
                        native: Rc::clone(&native),
                        subscriptions: BTreeMap::from([(subscription.id(), Rc::clone(subscription))]),
                    });
                    Some((native, mode))
                }
            }
        };
        subscription.set_active(true);

        #[cfg(feature = "tracing")]
        {
            tracing::trace!(
                target_id = %target_id,
                subscription = %subscription.id(),
                key_spec = ?subscription.key_spec(),
                "subscribed"
            );
        }

        if let Some((native, mode)) = attach {
            for &kind in mode.event_kinds() {
                target.add_event_listener(kind, Rc::clone(&native));
            }

            #[cfg(feature = "tracing")]
            {
                tracing::debug!(target_id = %target_id, kinds = ?mode.event_kinds(), "attached native listener");
            }
        }
    }

    /// Remove `subscription` from `target`.
    ///
    /// Only the exact record registered there is removed. Unknown targets and
    /// subscriptions are ignored. Returns whether anything was removed.
    pub fn unsubscribe(&self, target: TargetId, subscription: &Subscription) -> bool {
        unsubscribe(&self.state, target, subscription)
    }

    /// Dispatch `event` to `target`'s subscriptions as its native listener
    /// would.
    pub fn dispatch(&self, target: TargetId, event: &KeyEvent) -> DispatchReport {
        dispatch::dispatch(&self.state, target, event)
    }

    /// Whether a native listener is currently installed on `target`.
    pub fn is_attached(&self, target: TargetId) -> bool {
        self.state.borrow().entries.contains_key(&target)
    }

    /// Number of live subscriptions on `target`.
    pub fn subscription_count(&self, target: TargetId) -> usize {
        self.state
            .borrow()
            .entries
            .get(&target)
            .map_or(0, |entry| entry.subscriptions.len())
    }

    /// Number of targets with an installed listener.
    pub fn target_count(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Whether no target has an installed listener.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    /// Drop every subscription and detach every native listener.
    ///
    /// The registry stays usable afterwards.
    pub fn clear(&self) {
        let (entries, mode) = {
            let mut state = self.state.borrow_mut();
            (mem::take(&mut state.entries), state.mode)
        };

        for (_target_id, entry) in entries {
            for subscription in entry.subscriptions.values() {
                subscription.set_active(false);
            }
            detach(&entry, mode);

            #[cfg(feature = "tracing")]
            {
                tracing::debug!(target_id = %_target_id, "detached native listener on clear");
            }
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Registry")
            .field("mode", &state.mode)
            .field("targets", &state.entries.len())
            .field("policy", &state.policy)
            .finish()
    }
}

/// A weak handle to a [`Registry`].
///
/// Every operation becomes a no-op once the registry is gone.
#[derive(Clone)]
pub struct RegistryRef {
    state: Weak<RefCell<RegistryState>>,
}

impl RegistryRef {
    /// Remove `subscription` from `target`, if the registry still exists.
    pub fn unsubscribe(&self, target: TargetId, subscription: &Subscription) -> bool {
        match self.state.upgrade() {
            Some(state) => unsubscribe(&state, target, subscription),
            None => false,
        }
    }

    /// Whether the registry is still alive.
    pub fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }

    /// Whether both references point at the same registry.
    pub fn same_registry(&self, registry: &Registry) -> bool {
        ptr::eq(self.state.as_ptr(), Rc::as_ptr(&registry.state))
    }
}

impl fmt::Debug for RegistryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}

fn unsubscribe(state: &RefCell<RegistryState>, target: TargetId, subscription: &Subscription) -> bool {
    let (detached, mode) = {
        let mut state = state.borrow_mut();
        let mode = state.mode;
        let Some(entry) = state.entries.get_mut(&target) else {
            return false;
        };

        let registered = entry
            .subscriptions
            .get(&subscription.id())
            .is_some_and(|stored| ptr::eq(Rc::as_ptr(stored), subscription));
        if !registered {
            return false;
        }

        entry.subscriptions.remove(&subscription.id());
        subscription.set_active(false);

        let detached = if entry.subscriptions.is_empty() {
            state.entries.remove(&target)
        } else {
            None
        };
        (detached, mode)
    };

    #[cfg(feature = "tracing")]
    {
        tracing::trace!(target_id = %target, subscription = %subscription.id(), "unsubscribed");
    }

    if let Some(entry) = detached {
        detach(&entry, mode);

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(target_id = %target, kinds = ?mode.event_kinds(), "detached native listener");
        }
    }

    true
}

fn detach(entry: &Entry, mode: ListenMode) {
    for &kind in mode.event_kinds() {
        entry.target.remove_event_listener(kind, &entry.native);
    }
}

/// Builder for constructing a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    mode: ListenMode,
    policy: DispatchPolicy,
}

impl RegistryBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Which native event types to listen for.
    pub fn mode(mut self, mode: ListenMode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether panicking callbacks are isolated. Defaults to `true`.
    pub fn catch_panics(mut self, catch: bool) -> Self {
        self.policy = self.policy.catch_panics(catch);
        self
    }

    /// Receive every callback failure.
    pub fn on_callback_error<F>(mut self, sink: F) -> Self
    where
        F: Fn(&CallbackError) + 'static,
    {
        let sink: ErrorSink = Rc::new(sink);
        self.policy = self.policy.on_error(sink);
        self
    }

    /// Build the registry.
    pub fn build(self) -> Registry {
        Registry {
            state: Rc::new(RefCell::new(RegistryState {
                entries: HashMap::new(),
                mode: self.mode,
                policy: self.policy,
                next_id: 0,
            })),
        }
    }
}
