//! Typed event fixtures.
//!
//! A three-level hierarchy, `ClickEvent` → `PointerEvent` → `UiEvent`, plus
//! an unrelated [`Tick`].

use std::any::Any;

use tidings::{Event, EventType, TypeKey};

/// Root of the fixture hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEvent {
    /// Widget the event originated from.
    pub source: String,
}

impl EventType for UiEvent {}

/// A pointer event; a [`UiEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    /// Embedded parent.
    pub base: UiEvent,
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
}

impl EventType for PointerEvent {
    fn parent_types() -> Vec<TypeKey> {
        vec![TypeKey::of::<UiEvent>()]
    }

    fn project(&self, target: TypeKey) -> Option<&dyn Any> {
        self.base.view(target)
    }
}

/// A click; a [`PointerEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    /// Embedded parent.
    pub base: PointerEvent,
    /// Mouse button.
    pub button: u8,
}

impl EventType for ClickEvent {
    fn parent_types() -> Vec<TypeKey> {
        vec![TypeKey::of::<PointerEvent>()]
    }

    fn project(&self, target: TypeKey) -> Option<&dyn Any> {
        self.base.view(target)
    }
}

/// An event outside the UI hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Sequence number.
    pub seq: u64,
}

impl EventType for Tick {}

/// A pointer event from `source`.
#[must_use]
pub fn pointer(source: &str, x: i32, y: i32) -> PointerEvent {
    PointerEvent {
        base: UiEvent {
            source: source.to_owned(),
        },
        x,
        y,
    }
}

/// A primary-button click from `source`.
#[must_use]
pub fn click(source: &str, x: i32, y: i32) -> ClickEvent {
    ClickEvent {
        base: pointer(source, x, y),
        button: 0,
    }
}
