//! Subscriber callbacks.
//!
//! A [`KeyHandler`] is what a subscription calls when a dispatched event
//! matches its key spec. Closures are the usual form:
//!
//! 1. **Infallible closure**: `|event: &KeyEvent, pressed: bool| { ... }`
//! 2. **Fallible closure**: `|event: &KeyEvent, _| -> Result<(), MyError> { ... }`
//! 3. **Struct implementation**: `impl KeyHandler for MyHandler`

use crate::{error::BoxError, event::KeyEvent};
use std::fmt;

/// Identity token of a subscription.
///
/// Two subscriptions with the same key spec and callback still get distinct
/// ids; the registry only ever compares ids, never contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription#{}", self.0)
    }
}

/// Conversion of a callback's return value into success or failure.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<(), E>` → `E` is boxed as the failure
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid key callback result",
    label = "return `()` or `Result<(), E>`",
    note = "Key callbacks must return something implementing `IntoKeyOutcome`."
)]
pub trait IntoKeyOutcome {
    /// Convert the output into success or a boxed error.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoKeyOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoKeyOutcome for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// The callback side of a subscription.
///
/// `pressed` is `true` for `keydown` and `false` for `keyup`. Registries that
/// only listen for presses always pass `true`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `KeyHandler`",
    label = "missing `KeyHandler` implementation",
    note = "Use a closure `Fn(&KeyEvent, bool)` or implement `on_key`."
)]
pub trait KeyHandler: 'static {
    /// Called for each dispatched event matching the subscription's key spec.
    fn on_key(&self, event: &KeyEvent, pressed: bool) -> Result<(), BoxError>;
}

impl<F, R> KeyHandler for F
where
    F: Fn(&KeyEvent, bool) -> R + 'static,
    R: IntoKeyOutcome,
{
    fn on_key(&self, event: &KeyEvent, pressed: bool) -> Result<(), BoxError> {
        self(event, pressed).into_outcome()
    }
}
