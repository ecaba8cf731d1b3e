//! Event targets and target resolution.

use crate::event::{EventKind, KeyEvent};
use std::{cell::RefCell, fmt, rc::Rc};

/// A listener function as installed with the host.
///
/// Hosts compare listeners by pointer identity (`Rc::ptr_eq`), the same way
/// a removal call has to name the exact function that was added.
pub type NativeListener = Rc<dyn Fn(&KeyEvent)>;

/// Anything a native key listener can be installed on.
///
/// Implemented by the host integration (a window, a document, an element, a
/// terminal input stream). Implementations must deliver each event to every
/// listener installed for its [`EventKind`] and must honour removal by
/// pointer identity.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `EventTarget`",
    label = "missing `EventTarget` implementation",
    note = "Event targets must implement `add_event_listener` and `remove_event_listener`."
)]
pub trait EventTarget {
    /// Install `listener` for events of `kind`.
    fn add_event_listener(&self, kind: EventKind, listener: NativeListener);

    /// Remove a listener previously installed for `kind`.
    fn remove_event_listener(&self, kind: EventKind, listener: &NativeListener);
}

/// Reference identity of a target.
///
/// Derived from the address of the shared allocation, so two distinct
/// targets never compare equal even if they are otherwise identical. Only
/// meaningful while something keeps the target alive; the registry holds a
/// strong reference for as long as it keys an entry by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(usize);

impl TargetId {
    /// The identity of `target`.
    pub fn of<T: ?Sized>(target: &Rc<T>) -> Self {
        Self(Rc::as_ptr(target).cast::<()>() as usize)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target@{:#x}", self.0)
    }
}

/// A late-bound target holder whose current value may be unset or change.
///
/// Clones share the same slot, so the side that owns the real target can
/// fill it in after subscribers were handed the holder.
#[derive(Clone, Default)]
pub struct TargetRef {
    current: Rc<RefCell<Option<Rc<dyn EventTarget>>>>,
}

impl TargetRef {
    /// An empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A holder already pointing at `target`.
    pub fn with(target: Rc<dyn EventTarget>) -> Self {
        let holder = Self::new();
        holder.set(target);
        holder
    }

    /// Point the holder at `target`.
    pub fn set(&self, target: Rc<dyn EventTarget>) {
        *self.current.borrow_mut() = Some(target);
    }

    /// Unset the holder.
    pub fn clear(&self) {
        self.current.borrow_mut().take();
    }

    /// The current value, if set.
    pub fn current(&self) -> Option<Rc<dyn EventTarget>> {
        self.current.borrow().clone()
    }

    /// The current value, or `fallback` when unset.
    pub fn resolve(&self, fallback: &Rc<dyn EventTarget>) -> Rc<dyn EventTarget> {
        self.current().unwrap_or_else(|| Rc::clone(fallback))
    }
}

impl fmt::Debug for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current.borrow().as_ref().map(TargetId::of);
        f.debug_struct("TargetRef").field("current", &current).finish()
    }
}

/// Where a subscription should be installed.
#[derive(Clone, Default)]
pub enum Target {
    /// The registry's default target (the host's global object).
    #[default]
    Default,
    /// A concrete target.
    Direct(Rc<dyn EventTarget>),
    /// A late-bound holder, falling back to the default when unset.
    Ref(TargetRef),
}

impl Target {
    /// A direct target.
    pub fn direct(target: Rc<dyn EventTarget>) -> Self {
        Target::Direct(target)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Default => f.write_str("Default"),
            Target::Direct(target) => f.debug_tuple("Direct").field(&TargetId::of(target)).finish(),
            Target::Ref(holder) => f.debug_tuple("Ref").field(holder).finish(),
        }
    }
}

impl<T: EventTarget + 'static> From<Rc<T>> for Target {
    fn from(target: Rc<T>) -> Self {
        Target::Direct(target)
    }
}

impl From<TargetRef> for Target {
    fn from(holder: TargetRef) -> Self {
        Target::Ref(holder)
    }
}

impl From<&TargetRef> for Target {
    fn from(holder: &TargetRef) -> Self {
        Target::Ref(holder.clone())
    }
}

impl From<Option<Rc<dyn EventTarget>>> for Target {
    fn from(target: Option<Rc<dyn EventTarget>>) -> Self {
        target.map_or(Target::Default, Target::Direct)
    }
}

/// Resolve a target descriptor to a concrete target.
///
/// A set holder yields its value, an unset holder or a missing descriptor
/// yields `fallback`, and a direct target is returned as is. Never cached:
/// a holder's value may change identity between calls.
pub fn resolve(target: &Target, fallback: &Rc<dyn EventTarget>) -> Rc<dyn EventTarget> {
    match target {
        Target::Ref(holder) => holder.resolve(fallback),
        Target::Direct(target) => Rc::clone(target),
        Target::Default => Rc::clone(fallback),
    }
}
