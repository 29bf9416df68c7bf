//! Shared helpers for integration tests.

use std::sync::{Arc, Mutex};

use tidings::{EmitterConfig, EventEmitter};
use tidings_test::init_test_logging;

/// A labelled emitter with test logging installed.
#[allow(dead_code)]
pub fn emitter(label: &str) -> EventEmitter {
    init_test_logging();
    EventEmitter::with_config(EmitterConfig::labeled(label))
}

/// A labelled emitter built from `config`, with test logging installed.
#[allow(dead_code)]
pub fn emitter_with(config: EmitterConfig) -> EventEmitter {
    init_test_logging();
    EventEmitter::with_config(config)
}

/// Shared vector for closures that collect values.
#[allow(dead_code)]
pub fn shared<T>() -> Arc<Mutex<Vec<T>>> {
    Arc::new(Mutex::new(Vec::new()))
}
