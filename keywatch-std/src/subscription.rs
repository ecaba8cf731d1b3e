//! Subscription records.

use crate::registry::RegistryState;
use keywatch_core::{KeyHandler, KeySpec, SubscriptionId};
use std::{
    cell::{Cell, RefCell},
    fmt, ptr,
    rc::{Rc, Weak},
};

/// One (key spec, callback) registration against a single target.
///
/// Identified by [`SubscriptionId`] and by the address of its shared record;
/// the registry never compares specs or callbacks. Key spec and callback can
/// be swapped in place while the subscription stays registered.
///
/// A record is bound to the registry that allocated it and is registered on
/// at most one target at a time.
pub struct Subscription {
    id: SubscriptionId,
    key_spec: RefCell<KeySpec>,
    handler: RefCell<Rc<dyn KeyHandler>>,
    active: Cell<bool>,
    owner: Weak<RefCell<RegistryState>>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        key_spec: KeySpec,
        handler: Rc<dyn KeyHandler>,
        owner: Weak<RefCell<RegistryState>>,
    ) -> Self {
        Self {
            id,
            key_spec: RefCell::new(key_spec),
            handler: RefCell::new(handler),
            active: Cell::new(false),
            owner,
        }
    }

    /// The identity token.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// A copy of the current key spec.
    pub fn key_spec(&self) -> KeySpec {
        self.key_spec.borrow().clone()
    }

    /// Whether `code` matches the current key spec.
    pub fn matches(&self, code: &str) -> bool {
        self.key_spec.borrow().matches(code)
    }

    /// The current callback.
    pub fn handler(&self) -> Rc<dyn KeyHandler> {
        Rc::clone(&self.handler.borrow())
    }

    /// Replace the key spec. Takes effect from the next matched event.
    pub fn set_key_spec(&self, key_spec: KeySpec) {
        *self.key_spec.borrow_mut() = key_spec;
    }

    /// Replace the callback. Takes effect from the next matched event.
    pub fn set_handler(&self, handler: Rc<dyn KeyHandler>) {
        *self.handler.borrow_mut() = handler;
    }

    /// Whether the subscription is currently registered.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.active.set(active);
    }

    pub(crate) fn is_owned_by(&self, state: &Rc<RefCell<RegistryState>>) -> bool {
        ptr::eq(self.owner.as_ptr(), Rc::as_ptr(state))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("key_spec", &*self.key_spec.borrow())
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}
