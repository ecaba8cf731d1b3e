//! The consumer-facing watch/stop surface.

use crate::{error::WatchError, handle::WatchHandle};
use keywatch_core::{
    CallbackError, EventTarget, IntoKeyOutcome, KeyEvent, KeyHandler, KeySpec, ListenMode, Target,
    TargetId, resolve,
};
use keywatch_std::{Registry, RegistryBuilder};
use std::{fmt, rc::Rc};

/// Watches keys on event targets through one shared registry.
///
/// Each watch resolves its target descriptor, creates a fresh subscription
/// and registers it; the first watch on a target installs the single native
/// listener and the last stop removes it.
///
/// # Example
///
/// ```rust
/// use keywatch::{Watcher, testing::MockTarget};
/// use std::{cell::Cell, rc::Rc};
///
/// let window = Rc::new(MockTarget::new());
/// let watcher = Watcher::new(window.clone());
///
/// let hits = Rc::new(Cell::new(0));
/// let counter = hits.clone();
/// let handle = watcher.watch("KeyG", move |event, _pressed| {
///     if event.ctrl_key() {
///         println!("Ctrl + G pressed!");
///     }
///     counter.set(counter.get() + 1);
/// });
///
/// window.key_down("KeyG");
/// window.key_down("Escape");
/// assert_eq!(hits.get(), 1);
///
/// watcher.stop(&handle);
/// assert!(!window.is_listening());
/// ```
pub struct Watcher {
    registry: Registry,
    default_target: Rc<dyn EventTarget>,
}

impl Watcher {
    /// A press-only watcher whose default target is `default_target`.
    pub fn new(default_target: Rc<dyn EventTarget>) -> Self {
        WatcherBuilder::new().build(default_target)
    }

    /// Start configuring a watcher.
    pub fn builder() -> WatcherBuilder {
        WatcherBuilder::new()
    }

    /// The target used when a watch names none, or names an unset holder.
    pub fn default_target(&self) -> &Rc<dyn EventTarget> {
        &self.default_target
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve a target descriptor against this watcher's default target.
    pub fn resolve(&self, target: &Target) -> Rc<dyn EventTarget> {
        resolve(target, &self.default_target)
    }

    /// Watch `key_spec` on the default target.
    pub fn watch<F, R>(&self, key_spec: impl Into<KeySpec>, callback: F) -> WatchHandle
    where
        F: Fn(&KeyEvent, bool) -> R + 'static,
        R: IntoKeyOutcome,
    {
        self.watch_with(key_spec, callback, Target::Default)
    }

    /// Watch `key_spec` on `target`.
    pub fn watch_on<F, R>(
        &self,
        key_spec: impl Into<KeySpec>,
        callback: F,
        target: impl Into<Target>,
    ) -> WatchHandle
    where
        F: Fn(&KeyEvent, bool) -> R + 'static,
        R: IntoKeyOutcome,
    {
        self.watch_with(key_spec, callback, target)
    }

    /// Watch `key_spec` on `target` with any [`KeyHandler`].
    pub fn watch_with(
        &self,
        key_spec: impl Into<KeySpec>,
        handler: impl KeyHandler,
        target: impl Into<Target>,
    ) -> WatchHandle {
        self.register(key_spec.into(), Rc::new(handler), &target.into())
    }

    /// Like [`Watcher::watch_on`], rejecting key specs that can never match.
    pub fn try_watch<F, R>(
        &self,
        key_spec: impl Into<KeySpec>,
        callback: F,
        target: impl Into<Target>,
    ) -> Result<WatchHandle, WatchError>
    where
        F: Fn(&KeyEvent, bool) -> R + 'static,
        R: IntoKeyOutcome,
    {
        let key_spec = key_spec.into();
        key_spec.validate()?;
        Ok(self.register(key_spec, Rc::new(callback), &target.into()))
    }

    /// Stop a registration. Stopping twice, or stopping a handle this watcher
    /// never issued, does nothing.
    pub fn stop(&self, handle: &WatchHandle) {
        self.registry
            .unsubscribe(handle.target_id(), handle.subscription());
    }

    /// Replace a live registration's key spec in place.
    ///
    /// The subscription stays registered throughout, so no event can slip
    /// between the old and the new spec.
    pub fn update(&self, handle: &WatchHandle, key_spec: impl Into<KeySpec>) -> Result<(), WatchError> {
        let key_spec = key_spec.into();
        key_spec.validate()?;
        if !handle.is_active() {
            return Err(WatchError::Inactive(handle.id()));
        }

        #[cfg(feature = "tracing")]
        {
            tracing::trace!(subscription = %handle.id(), key_spec = ?key_spec, "updated key spec");
        }

        handle.subscription().set_key_spec(key_spec);
        Ok(())
    }

    /// Replace a live registration's callback in place.
    pub fn update_callback<F, R>(&self, handle: &WatchHandle, callback: F) -> Result<(), WatchError>
    where
        F: Fn(&KeyEvent, bool) -> R + 'static,
        R: IntoKeyOutcome,
    {
        if !handle.is_active() {
            return Err(WatchError::Inactive(handle.id()));
        }
        handle.subscription().set_handler(Rc::new(callback));
        Ok(())
    }

    /// Move a registration to a new key spec, callback and target.
    ///
    /// Stops `handle` and watches anew, returning the new handle. Within the
    /// single event thread nothing can be dispatched in between.
    pub fn rebind<F, R>(
        &self,
        handle: &WatchHandle,
        key_spec: impl Into<KeySpec>,
        callback: F,
        target: impl Into<Target>,
    ) -> WatchHandle
    where
        F: Fn(&KeyEvent, bool) -> R + 'static,
        R: IntoKeyOutcome,
    {
        self.stop(handle);
        let rebound = self.watch_with(key_spec, callback, target);

        #[cfg(feature = "tracing")]
        {
            tracing::trace!(from = %handle.id(), to = %rebound.id(), "rebound subscription");
        }

        rebound
    }

    /// Whether a native listener is installed on what `target` resolves to.
    pub fn is_listening(&self, target: &Target) -> bool {
        self.registry.is_attached(TargetId::of(&self.resolve(target)))
    }

    /// Stop every registration and detach every native listener.
    pub fn shutdown(&self) {
        self.registry.clear();
    }

    fn register(&self, key_spec: KeySpec, handler: Rc<dyn KeyHandler>, target: &Target) -> WatchHandle {
        let target = self.resolve(target);
        let subscription = self.registry.register(&target, key_spec, handler);
        WatchHandle::new(TargetId::of(&target), subscription, self.registry.downgrade())
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("registry", &self.registry)
            .field("default_target", &TargetId::of(&self.default_target))
            .finish()
    }
}

/// Builder for constructing a [`Watcher`].
#[derive(Debug, Default)]
pub struct WatcherBuilder {
    registry: RegistryBuilder,
}

impl WatcherBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for presses only, or presses and releases.
    pub fn mode(mut self, mode: ListenMode) -> Self {
        self.registry = self.registry.mode(mode);
        self
    }

    /// Whether panicking callbacks are isolated. Defaults to `true`.
    pub fn catch_panics(mut self, catch: bool) -> Self {
        self.registry = self.registry.catch_panics(catch);
        self
    }

    /// Receive every callback failure.
    pub fn on_callback_error<F>(mut self, sink: F) -> Self
    where
        F: Fn(&CallbackError) + 'static,
    {
        self.registry = self.registry.on_callback_error(sink);
        self
    }

    /// Build the watcher around the host's global object.
    pub fn build(self, default_target: Rc<dyn EventTarget>) -> Watcher {
        Watcher {
            registry: self.registry.build(),
            default_target,
        }
    }
}
