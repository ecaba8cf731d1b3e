#![allow(dead_code)]

use keywatch::{KeyEvent, Watcher, WatcherBuilder, testing::MockTarget};
use std::{cell::Cell, rc::Rc};

// ============================================================================
// Host Fixture
// ============================================================================

/// A watcher whose default target is a mock `window`.
pub struct Host {
    pub window: Rc<MockTarget>,
    pub watcher: Watcher,
}

pub fn host() -> Host {
    host_with(Watcher::builder())
}

pub fn host_with(builder: WatcherBuilder) -> Host {
    let window = Rc::new(MockTarget::new());
    let watcher = builder.build(window.clone());
    Host { window, watcher }
}

// ============================================================================
// Test Callbacks
// ============================================================================

/// A callback that counts its invocations.
pub fn counter() -> (Rc<Cell<usize>>, impl Fn(&KeyEvent, bool) + 'static) {
    let hits = Rc::new(Cell::new(0));
    let count = hits.clone();
    (hits, move |_: &KeyEvent, _: bool| count.set(count.get() + 1))
}
