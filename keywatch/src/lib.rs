//! # keywatch - Shared Keyboard Listeners
//!
//! `keywatch` lets any number of independent consumers react to specific keys
//! on an event target without each of them installing a native listener.
//! One listener is installed per target for as long as anybody watches it,
//! and every event is fanned out to the subscriptions whose key spec matches.
//!
//! ## Quick Start
//!
//! ```rust
//! use keywatch::prelude::*;
//! use keywatch::testing::MockTarget;
//! use std::rc::Rc;
//!
//! let window = Rc::new(MockTarget::new());
//! let watcher = Watcher::new(window.clone());
//!
//! let escape = watcher.watch(["Escape", "KeyQ"], |_event: &KeyEvent, _| {
//!     println!("closing");
//! });
//!
//! // Watch a specific element instead of the global object.
//! let element = Rc::new(MockTarget::new());
//! let search = watcher.watch_on("KeyK", |event: &KeyEvent, _| {
//!     if event.meta_key() {
//!         println!("search");
//!     }
//! }, element.clone());
//!
//! window.key_down("Escape");
//! element.key_down("KeyK");
//!
//! watcher.stop(&escape);
//! watcher.stop(&search);
//! assert!(!window.is_listening() && !element.is_listening());
//! ```
//!
//! ## Press and release
//!
//! A watcher built with [`ListenMode::PressAndRelease`] also listens for
//! `keyup`; callbacks get `pressed == false` for releases.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod handle;
mod watcher;

pub use error::WatchError;
pub use handle::{WatchGuard, WatchHandle};
pub use watcher::{Watcher, WatcherBuilder};

pub use keywatch_core::{
    // Error types
    BoxError,
    CallbackError,
    // Host surface
    EventKind,
    EventTarget,
    // Callbacks
    IntoKeyOutcome,
    KeyEvent,
    KeyHandler,
    // Matching
    KeySpec,
    KeySpecError,
    ListenMode,
    Modifiers,
    NativeListener,
    SubscriptionId,
    // Resolution
    Target,
    TargetId,
    TargetRef,
    resolve,
};

pub use keywatch_std::{
    DispatchReport, Registry, RegistryBuilder, RegistryRef, SubscribeError, Subscription,
};

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use keywatch_std::testing::*;
}

/// Prelude module - common imports for keywatch.
///
/// # Usage
///
/// ```rust,ignore
/// use keywatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        EventTarget, KeyEvent, KeyHandler, KeySpec, ListenMode, Modifiers, Target, TargetRef,
        WatchError, WatchGuard, WatchHandle, Watcher,
    };
}
