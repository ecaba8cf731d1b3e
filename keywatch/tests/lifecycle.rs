//! Attach/detach bookkeeping, target resolution and re-binding.

use keywatch::{
    EventKind, EventTarget, KeyEvent, Target, TargetId, TargetRef, WatchError, WatchHandle, Watcher,
    testing::{KeyRecorder, MockTarget},
};
use std::rc::Rc;

mod common;
use common::{counter, host};

#[test]
fn test_listener_attached_iff_subscribed() {
    let host = host();
    let element = Rc::new(MockTarget::new());
    let mut live: Vec<WatchHandle> = Vec::new();

    // Deterministic pseudo-random walk over watch/stop on two targets.
    let mut seed: u32 = 0x2545_f491;
    for step in 0..400 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;

        if seed % 3 != 0 || live.is_empty() {
            let (_hits, callback) = counter();
            let handle = if seed % 2 == 0 {
                host.watcher.watch("KeyA", callback)
            } else {
                host.watcher.watch_on("KeyA", callback, element.clone())
            };
            live.push(handle);
        } else {
            let handle = live.swap_remove(seed as usize % live.len());
            host.watcher.stop(&handle);
            // A stale second stop must never disturb the bookkeeping.
            if step % 5 == 0 {
                host.watcher.stop(&handle);
            }
        }

        for (mock, id) in [
            (&host.window, TargetId::of(&host.window)),
            (&element, TargetId::of(&element)),
        ] {
            let expected = live.iter().filter(|handle| handle.target_id() == id).count();
            assert_eq!(host.watcher.registry().subscription_count(id), expected);
            assert_eq!(mock.is_listening(), expected > 0, "step {step}");
            assert_eq!(mock.listener_count(EventKind::KeyDown), usize::from(expected > 0));
            // Every attach is matched by at most one pending detach.
            let pending = mock.added(EventKind::KeyDown) - mock.removed(EventKind::KeyDown);
            assert_eq!(pending, usize::from(expected > 0));
        }
    }

    for handle in live.drain(..) {
        host.watcher.stop(&handle);
    }
    assert!(host.watcher.registry().is_empty());
    assert!(!host.window.is_listening());
    assert!(!element.is_listening());
}

#[test]
fn test_targets_are_isolated() {
    let host = host();
    let element = Rc::new(MockTarget::new());
    let (window_hits, on_window) = counter();
    let (element_hits, on_element) = counter();

    let _window = host.watcher.watch("KeyG", on_window);
    assert!(!element.is_listening());

    let _element = host.watcher.watch_on("KeyG", on_element, element.clone());
    assert_eq!(host.window.added(EventKind::KeyDown), 1);
    assert_eq!(element.added(EventKind::KeyDown), 1);

    element.key_down("KeyG");
    assert_eq!(window_hits.get(), 0);
    assert_eq!(element_hits.get(), 1);

    host.window.key_down("KeyG");
    assert_eq!(window_hits.get(), 1);
    assert_eq!(element_hits.get(), 1);
}

#[test]
fn test_equal_targets_are_distinct_by_identity() {
    let host = host();
    let first = Rc::new(MockTarget::new());
    let second = Rc::new(MockTarget::new());
    let (_a, a) = counter();
    let (_b, b) = counter();

    let _a = host.watcher.watch_on("KeyA", a, first.clone());
    let _b = host.watcher.watch_on("KeyA", b, second.clone());

    assert_eq!(host.watcher.registry().target_count(), 2);
    assert_eq!(first.added(EventKind::KeyDown), 1);
    assert_eq!(second.added(EventKind::KeyDown), 1);
}

#[test]
fn test_target_ref_resolves_at_watch_time() {
    let host = host();
    let element = Rc::new(MockTarget::new());
    let holder = TargetRef::new();
    let recorder = KeyRecorder::new();

    // Unset holder falls back to the default target.
    let early = host.watcher.watch_with("KeyA", recorder.clone(), &holder);
    assert_eq!(early.target_id(), TargetId::of(&host.window));
    assert!(host.window.is_listening());

    holder.set(element.clone());
    let late = host.watcher.watch_with("KeyB", recorder.clone(), &holder);
    assert_eq!(late.target_id(), TargetId::of(&element));

    // Resolution is not retroactive.
    host.window.key_down("KeyA");
    element.key_down("KeyB");
    element.key_down("KeyA");
    assert_eq!(recorder.codes(), vec!["KeyA", "KeyB"]);

    assert!(host.watcher.is_listening(&Target::from(&holder)));
    holder.clear();
    assert!(host.watcher.is_listening(&Target::from(&holder)));
}

#[test]
fn test_direct_dyn_target() {
    let host = host();
    let element = Rc::new(MockTarget::new());
    let erased: Rc<dyn EventTarget> = element.clone();
    let (hits, callback) = counter();

    let handle = host.watcher.watch_on("KeyA", callback, Target::direct(erased));
    element.key_down("KeyA");

    assert_eq!(hits.get(), 1);
    assert_eq!(handle.target_id(), TargetId::of(&element));
}

#[test]
fn test_update_swaps_spec_without_reattaching() {
    let host = host();
    let recorder = KeyRecorder::new();
    let handle = host.watcher.watch_with("KeyA", recorder.clone(), Target::Default);

    host.watcher.update(&handle, ["KeyB", "KeyC"]).unwrap();
    host.window.key_down("KeyA");
    host.window.key_down("KeyC");

    assert_eq!(recorder.codes(), vec!["KeyC"]);
    assert_eq!(host.window.added(EventKind::KeyDown), 1);
    assert_eq!(host.window.removed(EventKind::KeyDown), 0);
    assert_eq!(handle.key_spec(), keywatch::KeySpec::from(["KeyB", "KeyC"]));
}

#[test]
fn test_update_callback_in_place() {
    let host = host();
    let (old_hits, old) = counter();
    let (new_hits, new) = counter();
    let handle = host.watcher.watch("KeyA", old);

    host.watcher.update_callback(&handle, new).unwrap();
    host.window.key_down("KeyA");

    assert_eq!(old_hits.get(), 0);
    assert_eq!(new_hits.get(), 1);
}

#[test]
fn test_update_refuses_stopped_handle() {
    let host = host();
    let (_hits, callback) = counter();
    let handle = host.watcher.watch("KeyA", callback);
    host.watcher.stop(&handle);

    assert_eq!(
        host.watcher.update(&handle, "KeyB"),
        Err(WatchError::Inactive(handle.id()))
    );
    assert_eq!(
        host.watcher.update_callback(&handle, |_: &KeyEvent, _| {}),
        Err(WatchError::Inactive(handle.id()))
    );
    assert!(!host.window.is_listening());
}

#[test]
fn test_rebind_moves_between_targets() {
    let host = host();
    let element = Rc::new(MockTarget::new());
    let (old_hits, old) = counter();
    let (new_hits, new) = counter();

    let handle = host.watcher.watch("KeyA", old);
    let rebound = host.watcher.rebind(&handle, "KeyB", new, element.clone());

    assert!(!handle.is_active());
    assert!(rebound.is_active());
    assert_ne!(handle.id(), rebound.id());
    assert!(!host.window.is_listening());
    assert!(element.is_listening());

    host.window.key_down("KeyA");
    element.key_down("KeyB");
    assert_eq!(old_hits.get(), 0);
    assert_eq!(new_hits.get(), 1);
}

#[test]
fn test_rebind_on_same_target_keeps_other_subscribers() {
    let host = host();
    let (other_hits, other) = counter();
    let (hits, callback) = counter();
    let (_old_hits, old) = counter();

    let _other = host.watcher.watch("KeyA", other);
    let handle = host.watcher.watch("KeyA", old);
    let _rebound = host.watcher.rebind(&handle, "KeyA", callback, Target::Default);

    host.window.key_down("KeyA");
    assert_eq!(other_hits.get(), 1);
    assert_eq!(hits.get(), 1);
    assert_eq!(host.window.added(EventKind::KeyDown), 1);
    assert_eq!(host.window.removed(EventKind::KeyDown), 0);
}

#[test]
fn test_guard_stops_on_drop() {
    let host = host();
    let (hits, callback) = counter();

    {
        let guard = host.watcher.watch("KeyA", callback).into_guard();
        assert!(guard.handle().is_active());
        host.window.key_down("KeyA");
    }

    host.window.key_down("KeyA");
    assert_eq!(hits.get(), 1);
    assert!(!host.window.is_listening());
}

#[test]
fn test_released_guard_keeps_watching() {
    let host = host();
    let (hits, callback) = counter();

    let guard = host.watcher.watch("KeyA", callback).into_guard();
    let handle = guard.release();

    host.window.key_down("KeyA");
    assert_eq!(hits.get(), 1);
    assert!(handle.is_active());
}

#[test]
fn test_shutdown_and_drop_detach_everything() {
    let host = host();
    let element = Rc::new(MockTarget::new());
    let (_a, a) = counter();
    let (_b, b) = counter();

    let a = host.watcher.watch("KeyA", a);
    let b = host.watcher.watch_on("KeyB", b, element.clone());
    host.watcher.shutdown();

    assert!(!a.is_active());
    assert!(!b.is_active());
    assert!(!host.window.is_listening());
    assert!(!element.is_listening());

    // Handles outliving their watcher are inert.
    let window = Rc::new(MockTarget::new());
    let watcher = Watcher::new(window.clone());
    let (_c, c) = counter();
    let c = watcher.watch("KeyC", c);
    drop(watcher);
    assert!(!window.is_listening());
    c.stop();
    assert!(!c.is_active());
}

#[test]
fn test_watchers_are_isolated() {
    let window = Rc::new(MockTarget::new());
    let first = Watcher::new(window.clone());
    let second = Watcher::new(window.clone());
    let (_a, a) = counter();
    let (_b, b) = counter();

    let a = first.watch("KeyA", a);
    let _b = second.watch("KeyA", b);
    assert_eq!(window.listener_count(EventKind::KeyDown), 2);

    // A handle issued by one watcher is unknown to the other.
    second.stop(&a);
    assert!(a.is_active());

    first.stop(&a);
    assert_eq!(window.listener_count(EventKind::KeyDown), 1);
}
