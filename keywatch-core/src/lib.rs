//! # keywatch-core
//!
//! Core traits and value types for the keywatch key subscription multiplexer.
//!
//! This crate has minimal dependencies and is meant to be imported by host
//! integrations that only need to expose an [`EventTarget`] or produce
//! [`KeyEvent`]s, without pulling in the registry itself.
//!
//! # Pieces
//!
//! ## Host surface ([`EventTarget`], [`KeyEvent`])
//!
//! An [`EventTarget`] is anything a native key listener can be installed on:
//! the host's global object, a document, a single element. Targets are told
//! apart strictly by reference identity ([`TargetId`]), never by content.
//!
//! ## Matching ([`KeySpec`])
//!
//! A key spec is either one key code or a list of codes where any member
//! matches. Comparison is exact, case-sensitive string equality.
//!
//! ## Resolution ([`Target`], [`TargetRef`])
//!
//! Consumers name a target either directly, through a late-bound
//! [`TargetRef`] whose value may change between calls, or not at all. The
//! descriptor is resolved to a concrete target on every subscribe call.
//!
//! ## Callbacks ([`KeyHandler`])
//!
//! The terminal point of a dispatch. Plain closures
//! `Fn(&KeyEvent, bool) -> R` are handlers as long as `R` converts through
//! [`IntoKeyOutcome`].
//!
//! # Error Types
//!
//! - [`CallbackError`] - A subscriber callback failed or panicked
//! - [`KeySpecError`] - A key spec that can never match

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod event;
mod handler;
mod key_spec;
mod target;

// Re-exports
pub use error::{BoxError, CallbackError, KeySpecError};
pub use event::{EventKind, KeyEvent, ListenMode, Modifiers};
pub use handler::{IntoKeyOutcome, KeyHandler, SubscriptionId};
pub use key_spec::KeySpec;
pub use target::{EventTarget, NativeListener, Target, TargetId, TargetRef, resolve};
