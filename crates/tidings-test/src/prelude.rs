//! Prelude module - commonly used test helpers.
//!
//! Use `use tidings_test::prelude::*;` to import all helpers.

pub use crate::init_test_logging;

// Recording
pub use crate::{Call, MetaRecorder, Recorder};

// Fixtures
pub use crate::{ClickEvent, PointerEvent, Tick, UiEvent, click, pointer};
