//! Typed events and the meta-events synthesized by the emitter.

use std::any::Any;
use std::fmt;

use serde_json::Value;

use crate::key::{EventKey, TypeKey};
use crate::listener::{Callback, Context};

/// A structured event type.
///
/// Implement this for every type that is delivered through
/// [`EventEmitter::emit`](crate::EventEmitter::emit). Types that model a
/// hierarchy declare their direct parents with [`parent_types`] and expose
/// the embedded parent value through [`project`], so that listeners
/// registered on an ancestor type can read the ancestor's fields.
///
/// ```rust
/// use std::any::Any;
/// use tidings::{Event, EventType, TypeKey};
///
/// #[derive(Debug)]
/// struct Input {
///     device: String,
/// }
/// impl EventType for Input {}
///
/// #[derive(Debug)]
/// struct KeyPress {
///     base: Input,
///     key: char,
/// }
/// impl EventType for KeyPress {
///     fn parent_types() -> Vec<TypeKey> {
///         vec![TypeKey::of::<Input>()]
///     }
///
///     fn project(&self, target: TypeKey) -> Option<&dyn Any> {
///         self.base.view(target)
///     }
/// }
///
/// let press = KeyPress { base: Input { device: "kbd".into() }, key: 'a' };
/// let event: &dyn Event = &press;
/// assert_eq!(event.downcast_ref::<Input>().unwrap().device, "kbd");
/// ```
///
/// [`parent_types`]: EventType::parent_types
/// [`project`]: EventType::project
pub trait EventType: Any + Send + Sync + fmt::Debug {
    /// Direct parent types, nearest first.
    fn parent_types() -> Vec<TypeKey> {
        Vec::new()
    }

    /// View of this event as one of its ancestor types.
    ///
    /// Only called for `target` types other than `Self`.
    fn project(&self, target: TypeKey) -> Option<&dyn Any> {
        let _ = target;
        None
    }
}

/// Object-safe side of [`EventType`], used at dispatch time.
///
/// Every [`EventType`] gets this for free. A host with its own reflection
/// facility may implement it directly and override [`ancestor_types`].
///
/// [`ancestor_types`]: Event::ancestor_types
pub trait Event: Any + Send + Sync + fmt::Debug {
    /// The concrete type of this event.
    fn type_key(&self) -> TypeKey;

    /// This event as [`Any`].
    fn as_any(&self) -> &dyn Any;

    /// This event viewed as `target`, which is its own type or an ancestor.
    fn view(&self, target: TypeKey) -> Option<&dyn Any>;

    /// Every type this event is delivered as, nearest first.
    fn ancestor_types(&self) -> Vec<TypeKey> {
        self.type_key().ancestry()
    }
}

impl<E: EventType> Event for E {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<E>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn view(&self, target: TypeKey) -> Option<&dyn Any> {
        if target == TypeKey::of::<E>() {
            Some(self)
        } else {
            self.project(target)
        }
    }
}

impl dyn Event {
    /// Whether this event is delivered as `E`.
    #[must_use]
    pub fn is<E: EventType>(&self) -> bool {
        self.ancestor_types().contains(&TypeKey::of::<E>())
    }

    /// This event as `E`, either its exact type or a projected ancestor.
    #[must_use]
    pub fn downcast_ref<E: EventType>(&self) -> Option<&E> {
        self.view(TypeKey::of::<E>())?.downcast_ref::<E>()
    }
}

/// Synthesized when a named event is triggered with no active listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct DeadEvent {
    /// The unhandled event.
    pub event: EventKey,
    /// The arguments it was triggered with, in order.
    pub data: Vec<Value>,
}

impl EventType for DeadEvent {}

/// Synthesized after every successful registration.
#[derive(Debug, Clone)]
pub struct AddListenerEvent {
    /// Event the listener was registered for.
    pub event: EventKey,
    /// The registered callback.
    pub listener: Callback,
    /// Context the listener was registered with.
    pub context: Option<Context>,
}

impl EventType for AddListenerEvent {}

/// Synthesized once for every listener deactivated by a removal.
#[derive(Debug, Clone)]
pub struct RemoveListenerEvent {
    /// Event the listener was registered for.
    pub event: EventKey,
    /// The removed callback.
    pub listener: Callback,
    /// Context the listener was registered with.
    pub context: Option<Context>,
}

impl EventType for RemoveListenerEvent {}
