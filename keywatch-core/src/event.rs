//! Keyboard events as delivered by the host.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Modifier keys held while the event fired.
    ///
    /// Carried through to callbacks untouched; matching never looks at them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Control.
        const CTRL = 1;
        /// Shift.
        const SHIFT = 1 << 1;
        /// Alt / Option.
        const ALT = 1 << 2;
        /// Meta / Command / Windows.
        const META = 1 << 3;
    }
}

/// The native event type a listener is installed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// A key was pressed (`keydown`).
    KeyDown,
    /// A key was released (`keyup`).
    KeyUp,
}

impl EventKind {
    /// The host's name for this event type.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::KeyDown => "keydown",
            EventKind::KeyUp => "keyup",
        }
    }

    /// Whether this is a press-type event.
    pub const fn is_press(self) -> bool {
        matches!(self, EventKind::KeyDown)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which native event types a registry listens for on each target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListenMode {
    /// `keydown` only. Callbacks always see `pressed == true`.
    #[default]
    PressOnly,
    /// `keydown` and `keyup`. Callbacks see `pressed == false` on release.
    PressAndRelease,
}

impl ListenMode {
    /// The native event types installed for this mode, in install order.
    pub const fn event_kinds(self) -> &'static [EventKind] {
        match self {
            ListenMode::PressOnly => &[EventKind::KeyDown],
            ListenMode::PressAndRelease => &[EventKind::KeyDown, EventKind::KeyUp],
        }
    }
}

/// A keyboard event.
///
/// `code` identifies the physical key (`"KeyA"`, `"Escape"`, ...). Hosts that
/// route non-keyboard events through the same listener deliver events
/// without a code; those are never matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    kind: EventKind,
    code: Option<String>,
    modifiers: Modifiers,
    repeat: bool,
}

impl KeyEvent {
    /// Create an event of the given kind.
    pub fn new(kind: EventKind, code: Option<String>) -> Self {
        Self {
            kind,
            code,
            modifiers: Modifiers::empty(),
            repeat: false,
        }
    }

    /// A `keydown` event for `code`.
    pub fn key_down(code: impl Into<String>) -> Self {
        Self::new(EventKind::KeyDown, Some(code.into()))
    }

    /// A `keyup` event for `code`.
    pub fn key_up(code: impl Into<String>) -> Self {
        Self::new(EventKind::KeyUp, Some(code.into()))
    }

    /// Set the held modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Mark the event as an auto-repeat.
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// The native event type.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The key code, if the event carries a usable one.
    ///
    /// An empty string counts as missing.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|code| !code.is_empty())
    }

    /// The held modifiers.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Whether Control was held.
    pub fn ctrl_key(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Whether Shift was held.
    pub fn shift_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Whether Alt was held.
    pub fn alt_key(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Whether Meta was held.
    pub fn meta_key(&self) -> bool {
        self.modifiers.contains(Modifiers::META)
    }

    /// Whether the event is an auto-repeat of a held key.
    pub fn is_repeat(&self) -> bool {
        self.repeat
    }
}
