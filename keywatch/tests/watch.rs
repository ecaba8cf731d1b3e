//! Matching and fan-out through the watch/stop surface.

use keywatch::{
    EventKind, KeyEvent, KeySpecError, Modifiers, WatchError,
    testing::{KeyRecorder, ListenerCall},
};
use std::{cell::RefCell, rc::Rc};

mod common;
use common::{counter, host};

#[test]
fn test_watch_installs_one_keydown_listener() {
    let host = host();
    let (_hits, callback) = counter();

    let _handle = host.watcher.watch("KeyG", callback);

    assert_eq!(host.window.calls(), vec![ListenerCall::Added(EventKind::KeyDown)]);
    assert_eq!(host.window.listener_count(EventKind::KeyDown), 1);
}

#[test]
fn test_stop_removes_listener() {
    let host = host();
    let (_hits, callback) = counter();

    let handle = host.watcher.watch("KeyG", callback);
    host.watcher.stop(&handle);

    assert_eq!(host.window.removed(EventKind::KeyDown), 1);
    assert!(!host.window.is_listening());
    assert!(!handle.is_active());
}

#[test]
fn test_matching_key_invokes_once_with_event() {
    let host = host();
    let recorder = KeyRecorder::new();
    let _handle = host.watcher.watch_with("KeyG", recorder.clone(), keywatch::Target::Default);

    host.window.key_down("KeyG");

    assert_eq!(recorder.count(), 1);
    assert_eq!(recorder.codes(), vec!["KeyG"]);
    assert!(recorder.keys()[0].pressed);
}

#[test]
fn test_other_key_does_not_invoke() {
    let host = host();
    let (hits, callback) = counter();
    let _handle = host.watcher.watch("KeyG", callback);

    host.window.key_down("Escape");

    assert_eq!(hits.get(), 0);
}

#[test]
fn test_matching_is_case_sensitive() {
    let host = host();
    let (hits, callback) = counter();
    let _handle = host.watcher.watch("KeyG", callback);

    host.window.key_down("keyg");
    host.window.key_down("KEYG");

    assert_eq!(hits.get(), 0);
}

#[test]
fn test_modifiers_pass_through_untouched() {
    let host = host();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let _handle = host.watcher.watch("KeyG", move |event: &KeyEvent, _| {
        log.borrow_mut().push(event.clone());
    });

    let event = KeyEvent::key_down("KeyG")
        .with_modifiers(Modifiers::CTRL)
        .with_repeat(true);
    host.window.fire(event.clone());

    let seen = seen.borrow();
    assert_eq!(seen.as_slice(), &[event]);
    assert!(seen[0].ctrl_key());
    assert!(seen[0].is_repeat());
}

#[test]
fn test_any_of_matches_any_member() {
    let host = host();
    let recorder = KeyRecorder::new();
    let _handle = host
        .watcher
        .watch_with(["Escape", "KeyA"], recorder.clone(), keywatch::Target::Default);

    host.window.key_down("KeyA");
    host.window.key_down("KeyB");
    host.window.key_down("Escape");

    assert_eq!(recorder.codes(), vec!["KeyA", "Escape"]);
}

#[test]
fn test_identical_watches_are_independent() {
    let host = host();
    let (hits, callback) = counter();
    let callback = Rc::new(callback);

    let first_cb = callback.clone();
    let first = host.watcher.watch("KeyG", move |event: &KeyEvent, pressed| (*first_cb)(event, pressed));
    let second_cb = callback.clone();
    let second = host.watcher.watch("KeyG", move |event: &KeyEvent, pressed| (*second_cb)(event, pressed));
    assert_ne!(first.id(), second.id());
    assert_eq!(host.window.added(EventKind::KeyDown), 1);

    host.window.key_down("KeyG");
    assert_eq!(hits.get(), 2);

    host.watcher.stop(&first);
    assert!(host.window.is_listening());
    assert!(second.is_active());

    host.window.key_down("KeyG");
    assert_eq!(hits.get(), 3);
}

#[test]
fn test_same_spec_fans_out_exactly_once_each() {
    let host = host();
    let (hits_one, one) = counter();
    let (hits_two, two) = counter();
    let (hits_other, other) = counter();

    let _one = host.watcher.watch("KeyG", one);
    let _two = host.watcher.watch("KeyG", two);
    let _other = host.watcher.watch("Escape", other);

    host.window.key_down("KeyG");

    assert_eq!(hits_one.get(), 1);
    assert_eq!(hits_two.get(), 1);
    assert_eq!(hits_other.get(), 0);
}

#[test]
fn test_stopped_handle_never_fires_again() {
    let host = host();
    let (stopped_hits, stopped) = counter();
    let (live_hits, live) = counter();

    let stopped = host.watcher.watch("KeyG", stopped);
    let _live = host.watcher.watch("KeyG", live);

    host.window.key_down("KeyG");
    host.watcher.stop(&stopped);
    host.window.key_down("KeyG");
    host.window.key_down("KeyG");

    assert_eq!(stopped_hits.get(), 1);
    assert_eq!(live_hits.get(), 3);
}

#[test]
fn test_double_stop_is_noop() {
    let host = host();
    let (_a, first) = counter();
    let (hits, second) = counter();

    let first = host.watcher.watch("KeyG", first);
    let _second = host.watcher.watch("KeyG", second);

    host.watcher.stop(&first);
    host.watcher.stop(&first);
    first.stop();

    assert_eq!(host.window.removed(EventKind::KeyDown), 0);
    assert_eq!(host.watcher.registry().subscription_count(first.target_id()), 1);

    host.window.key_down("KeyG");
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_events_without_code_are_ignored() {
    let host = host();
    let (hits, callback) = counter();
    let _handle = host.watcher.watch(vec!["KeyG", ""], callback);

    host.window.fire(KeyEvent::new(EventKind::KeyDown, None));
    host.window.fire(KeyEvent::key_down(""));

    assert_eq!(hits.get(), 0);
    assert!(host.window.is_listening());
}

#[test]
fn test_try_watch_rejects_unmatchable_specs() {
    let host = host();

    let empty = host
        .watcher
        .try_watch(Vec::<String>::new(), |_: &KeyEvent, _| {}, keywatch::Target::Default);
    assert_eq!(empty.unwrap_err(), WatchError::InvalidKeySpec(KeySpecError::Empty));

    let blank = host
        .watcher
        .try_watch("", |_: &KeyEvent, _| {}, keywatch::Target::Default);
    assert_eq!(
        blank.unwrap_err(),
        WatchError::InvalidKeySpec(KeySpecError::EmptyCode(0))
    );

    assert!(!host.window.is_listening());

    let ok = host
        .watcher
        .try_watch(["KeyA"], |_: &KeyEvent, _| {}, keywatch::Target::Default)
        .unwrap();
    assert!(ok.is_active());
}
