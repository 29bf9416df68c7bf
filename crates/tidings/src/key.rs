//! Event channel identities.
//!
//! An event is addressed either by a plain name ([`EventKey::Name`]) or by the
//! Rust type of a structured event value ([`EventKey::Type`]). Name keys match
//! by exact equality only; type keys also match every event whose ancestry
//! includes the type (see [`TypeKey::ancestry`]).

use std::any::TypeId;
use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::event::{Event, EventType};

/// Identity of an event type.
///
/// Carries the [`TypeId`] used for matching, the type name for diagnostics,
/// and the declared direct parents of the type.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    parents: fn() -> Vec<TypeKey>,
}

impl TypeKey {
    /// Type key of `E`.
    #[must_use]
    pub fn of<E: EventType>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
            parents: E::parent_types,
        }
    }

    /// The underlying [`TypeId`].
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path or generic arguments.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Declared direct parents, nearest first.
    #[must_use]
    pub fn parents(&self) -> Vec<TypeKey> {
        (self.parents)()
    }

    /// This type followed by every ancestor, nearest first.
    ///
    /// Parents are walked breadth-first in declaration order, so a type with
    /// several parents lists all of them before any grandparent. A type that
    /// is reachable along more than one path appears once, at its nearest
    /// position, which also keeps the walk finite if declarations form a
    /// cycle.
    #[must_use]
    pub fn ancestry(&self) -> Vec<TypeKey> {
        let mut chain: Vec<TypeKey> = Vec::new();
        let mut queue = VecDeque::from([*self]);

        while let Some(key) = queue.pop_front() {
            if chain.contains(&key) {
                continue;
            }
            chain.push(key);
            queue.extend(key.parents());
        }

        chain
    }

    /// Whether `self` is `other` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &TypeKey) -> bool {
        other.ancestry().contains(self)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Identifies an event channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// Opaque name, matched by exact equality.
    Name(String),
    /// Event type, matched by the type itself and by every descendant.
    Type(TypeKey),
}

impl EventKey {
    /// Name key.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Type key for `E`.
    #[must_use]
    pub fn of<E: EventType>() -> Self {
        Self::Type(TypeKey::of::<E>())
    }

    /// Whether this is a type key.
    #[must_use]
    pub fn is_type(&self) -> bool {
        matches!(self, Self::Type(_))
    }

    /// The name, if this is a name key.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Type(_) => None,
        }
    }

    /// The type, if this is a type key.
    #[must_use]
    pub fn as_type(&self) -> Option<TypeKey> {
        match self {
            Self::Name(_) => None,
            Self::Type(key) => Some(*key),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Type(key) => write!(f, "type:{key}"),
        }
    }
}

impl Serialize for EventKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for EventKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for EventKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for EventKey {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<TypeKey> for EventKey {
    fn from(key: TypeKey) -> Self {
        Self::Type(key)
    }
}

impl From<&EventKey> for EventKey {
    fn from(key: &EventKey) -> Self {
        key.clone()
    }
}

/// What a `trigger` call delivers: a named event or a typed instance.
#[derive(Debug, Clone, Copy)]
pub enum Signal<'a> {
    /// A name key, matched exactly.
    Named(&'a str),
    /// A typed instance, matched through its ancestry.
    Instance(&'a dyn Event),
}

impl<'a> Signal<'a> {
    /// Signal for a typed instance.
    #[must_use]
    pub fn instance(event: &'a dyn Event) -> Self {
        Self::Instance(event)
    }
}

impl<'a> From<&'a str> for Signal<'a> {
    fn from(name: &'a str) -> Self {
        Self::Named(name)
    }
}

impl<'a> From<&'a String> for Signal<'a> {
    fn from(name: &'a String) -> Self {
        Self::Named(name)
    }
}

impl<'a> From<&'a dyn Event> for Signal<'a> {
    fn from(event: &'a dyn Event) -> Self {
        Self::Instance(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Base;
    impl EventType for Base {}

    #[derive(Debug)]
    struct Middle;
    impl EventType for Middle {
        fn parent_types() -> Vec<TypeKey> {
            vec![TypeKey::of::<Base>()]
        }
    }

    #[derive(Debug)]
    struct Mixin;
    impl EventType for Mixin {}

    #[derive(Debug)]
    struct Leaf;
    impl EventType for Leaf {
        fn parent_types() -> Vec<TypeKey> {
            vec![TypeKey::of::<Middle>(), TypeKey::of::<Mixin>()]
        }
    }

    #[derive(Debug)]
    struct Ping;
    impl EventType for Ping {
        fn parent_types() -> Vec<TypeKey> {
            vec![TypeKey::of::<Pong>()]
        }
    }

    #[derive(Debug)]
    struct Pong;
    impl EventType for Pong {
        fn parent_types() -> Vec<TypeKey> {
            vec![TypeKey::of::<Ping>()]
        }
    }

    #[test]
    fn test_ancestry_nearest_first() {
        let chain = TypeKey::of::<Leaf>().ancestry();
        assert_eq!(
            chain,
            vec![
                TypeKey::of::<Leaf>(),
                TypeKey::of::<Middle>(),
                TypeKey::of::<Mixin>(),
                TypeKey::of::<Base>(),
            ]
        );
    }

    #[test]
    fn test_ancestry_terminates_on_cycles() {
        let chain = TypeKey::of::<Ping>().ancestry();
        assert_eq!(chain, vec![TypeKey::of::<Ping>(), TypeKey::of::<Pong>()]);
    }

    #[test]
    fn test_is_ancestor_of() {
        let base = TypeKey::of::<Base>();
        let leaf = TypeKey::of::<Leaf>();
        assert!(base.is_ancestor_of(&leaf));
        assert!(leaf.is_ancestor_of(&leaf));
        assert!(!leaf.is_ancestor_of(&base));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(EventKey::from("saved").to_string(), "saved");
        assert_eq!(EventKey::of::<Leaf>().to_string(), "type:Leaf");
        assert_eq!(TypeKey::of::<Leaf>().short_name(), "Leaf");
    }

    #[test]
    fn test_name_and_type_keys_differ() {
        let named = EventKey::name("Leaf");
        let typed = EventKey::of::<Leaf>();
        assert_ne!(named, typed);
        assert_eq!(named.as_name(), Some("Leaf"));
        assert_eq!(typed.as_type(), Some(TypeKey::of::<Leaf>()));
        assert!(typed.is_type());
    }

    #[test]
    fn test_key_serializes_as_string() {
        let json = serde_json::to_string(&EventKey::of::<Middle>()).unwrap();
        assert_eq!(json, "\"type:Middle\"");
    }
}
