//! Dispatch of native key events to subscriptions.
//!
//! The native listener a registry installs on a target is a thin closure
//! around [`dispatch`]: it looks the target up, snapshots its subscriptions,
//! and calls every matching callback in subscription order. Each callback
//! runs to completion before the next one starts.
//!
//! A failing or panicking callback never stops the pass and never detaches
//! the listener; the failure is handed to the registry's [`ErrorSink`].

use crate::{
    registry::RegistryState,
    subscription::Subscription,
};
use keywatch_core::{CallbackError, KeyEvent, NativeListener, TargetId};
use std::{
    any::Any,
    cell::RefCell,
    fmt,
    panic::{self, AssertUnwindSafe},
    rc::{Rc, Weak},
};

/// Receiver for callback failures.
pub type ErrorSink = Rc<dyn Fn(&CallbackError)>;

/// How a registry treats failing callbacks.
#[derive(Clone)]
pub struct DispatchPolicy {
    catch_panics: bool,
    on_error: Option<ErrorSink>,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            catch_panics: true,
            on_error: None,
        }
    }
}

impl DispatchPolicy {
    /// Whether panics in callbacks are caught and reported.
    ///
    /// When disabled a panicking callback unwinds through the native
    /// listener into the host.
    pub fn catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }

    /// Route callback failures to `sink`.
    pub fn on_error(mut self, sink: ErrorSink) -> Self {
        self.on_error = Some(sink);
        self
    }

    fn report(&self, error: &CallbackError) {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!(
                subscription = %error.subscription(),
                code = %error.code(),
                error = %error,
                "key callback failed"
            );
        }

        if let Some(sink) = &self.on_error {
            sink(error);
        }
    }
}

impl fmt::Debug for DispatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchPolicy")
            .field("catch_panics", &self.catch_panics)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Subscriptions whose key spec matched and whose callback was invoked.
    pub matched: usize,
    /// Of those, callbacks that returned an error or panicked.
    pub failed: usize,
}

/// Build the native listener installed on `target`.
///
/// Holds the registry weakly so an installed listener never keeps a dropped
/// registry alive.
pub(crate) fn native_listener(state: Weak<RefCell<RegistryState>>, target: TargetId) -> NativeListener {
    Rc::new(move |event: &KeyEvent| {
        if let Some(state) = state.upgrade() {
            dispatch(&state, target, event);
        }
    })
}

/// Fan `event` out to the subscriptions registered for `target`.
pub(crate) fn dispatch(
    state: &RefCell<RegistryState>,
    target: TargetId,
    event: &KeyEvent,
) -> DispatchReport {
    let Some(code) = event.code() else {
        return DispatchReport::default();
    };

    // No borrow may be held while callbacks run: they are free to subscribe
    // and unsubscribe on this very registry.
    let (snapshot, policy) = {
        let state = state.borrow();
        let Some(subscriptions) = state.subscriptions(target) else {
            return DispatchReport::default();
        };
        (subscriptions, state.policy().clone())
    };

    let pressed = event.kind().is_press();
    let mut report = DispatchReport::default();

    for subscription in &snapshot {
        // Stopped earlier in this pass.
        if !subscription.is_active() {
            continue;
        }
        if !subscription.matches(code) {
            continue;
        }

        report.matched += 1;
        if let Err(error) = invoke(subscription, event, code, pressed, policy.catch_panics) {
            report.failed += 1;
            policy.report(&error);
        }
    }

    #[cfg(feature = "tracing")]
    {
        tracing::trace!(
            target_id = %target,
            code = %code,
            kind = %event.kind(),
            candidates = snapshot.len(),
            matched = report.matched,
            failed = report.failed,
            "dispatched key event"
        );
    }

    report
}

fn invoke(
    subscription: &Subscription,
    event: &KeyEvent,
    code: &str,
    pressed: bool,
    catch_panics: bool,
) -> Result<(), CallbackError> {
    let handler = subscription.handler();

    let outcome = if catch_panics {
        panic::catch_unwind(AssertUnwindSafe(|| handler.on_key(event, pressed))).map_err(
            |payload| CallbackError::Panicked {
                subscription: subscription.id(),
                code: code.to_owned(),
                message: panic_message(payload.as_ref()),
            },
        )?
    } else {
        handler.on_key(event, pressed)
    };

    outcome.map_err(|source| CallbackError::Failed {
        subscription: subscription.id(),
        code: code.to_owned(),
        source,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
