//! Testing utilities for keywatch.
//!
//! # Features
//!
//! - [`MockTarget`]: An in-memory event target that records every listener
//!   install/removal and can fire events at its listeners
//! - [`KeyRecorder`]: A handler that records every key it is called with

use keywatch_core::{BoxError, EventKind, EventTarget, KeyEvent, KeyHandler, Modifiers, NativeListener};
use std::{cell::RefCell, rc::Rc};

// ============================================================================
// Mock Target
// ============================================================================

/// A listener install or removal observed by a [`MockTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerCall {
    /// `add_event_listener` was called.
    Added(EventKind),
    /// `remove_event_listener` was called.
    Removed(EventKind),
}

/// An event target that behaves like a DOM node.
///
/// Adding the same listener twice for the same kind installs it once;
/// removal matches by pointer identity.
///
/// # Example
///
/// ```rust,ignore
/// let window = Rc::new(MockTarget::new());
/// let target: Rc<dyn EventTarget> = window.clone();
///
/// // Subscribe through a registry...
///
/// window.key_down("KeyG");
/// assert_eq!(window.added(EventKind::KeyDown), 1);
/// ```
#[derive(Default)]
pub struct MockTarget {
    listeners: RefCell<Vec<(EventKind, NativeListener)>>,
    calls: RefCell<Vec<ListenerCall>>,
}

impl MockTarget {
    /// Create a target with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every listener installed for its kind.
    ///
    /// Returns the number of listeners invoked.
    pub fn fire(&self, event: KeyEvent) -> usize {
        let listeners: Vec<NativeListener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    /// Fire a `keydown` for `code`.
    pub fn key_down(&self, code: &str) -> usize {
        self.fire(KeyEvent::key_down(code))
    }

    /// Fire a `keyup` for `code`.
    pub fn key_up(&self, code: &str) -> usize {
        self.fire(KeyEvent::key_up(code))
    }

    /// Number of listeners currently installed for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(installed, _)| *installed == kind)
            .count()
    }

    /// Whether any listener is installed.
    pub fn is_listening(&self) -> bool {
        !self.listeners.borrow().is_empty()
    }

    /// Every install/removal call, in order.
    pub fn calls(&self) -> Vec<ListenerCall> {
        self.calls.borrow().clone()
    }

    /// Number of `add_event_listener` calls for `kind`.
    pub fn added(&self, kind: EventKind) -> usize {
        self.count_calls(ListenerCall::Added(kind))
    }

    /// Number of `remove_event_listener` calls for `kind`.
    pub fn removed(&self, kind: EventKind) -> usize {
        self.count_calls(ListenerCall::Removed(kind))
    }

    fn count_calls(&self, call: ListenerCall) -> usize {
        self.calls.borrow().iter().filter(|&&seen| seen == call).count()
    }
}

impl EventTarget for MockTarget {
    fn add_event_listener(&self, kind: EventKind, listener: NativeListener) {
        self.calls.borrow_mut().push(ListenerCall::Added(kind));

        let mut listeners = self.listeners.borrow_mut();
        let installed = listeners
            .iter()
            .any(|(existing, other)| *existing == kind && Rc::ptr_eq(other, &listener));
        if !installed {
            listeners.push((kind, listener));
        }
    }

    fn remove_event_listener(&self, kind: EventKind, listener: &NativeListener) {
        self.calls.borrow_mut().push(ListenerCall::Removed(kind));
        self.listeners
            .borrow_mut()
            .retain(|(existing, other)| !(*existing == kind && Rc::ptr_eq(other, listener)));
    }
}

// ============================================================================
// Key Recorder
// ============================================================================

/// A key observed by a [`KeyRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedKey {
    /// The event's key code.
    pub code: String,
    /// `true` for a press, `false` for a release.
    pub pressed: bool,
    /// Modifiers carried by the event.
    pub modifiers: Modifiers,
}

/// A handler that records every call it receives.
///
/// Clones share the same log.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = KeyRecorder::new();
/// let handle = watcher.watch_with("KeyG", recorder.clone());
///
/// window.key_down("KeyG");
/// assert_eq!(recorder.codes(), vec!["KeyG"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyRecorder {
    keys: Rc<RefCell<Vec<RecordedKey>>>,
}

impl KeyRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn keys(&self) -> Vec<RecordedKey> {
        self.keys.borrow().clone()
    }

    /// The recorded key codes, in order.
    pub fn codes(&self) -> Vec<String> {
        self.keys.borrow().iter().map(|key| key.code.clone()).collect()
    }

    /// Number of recorded calls.
    pub fn count(&self) -> usize {
        self.keys.borrow().len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.keys.borrow_mut().clear();
    }
}

impl KeyHandler for KeyRecorder {
    fn on_key(&self, event: &KeyEvent, pressed: bool) -> Result<(), BoxError> {
        self.keys.borrow_mut().push(RecordedKey {
            code: event.code().unwrap_or_default().to_owned(),
            pressed,
            modifiers: event.modifiers(),
        });
        Ok(())
    }
}
