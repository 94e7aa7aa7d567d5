//! Frozen property values.
//!
//! A [`State`] is an independent copy of a live [`Value`](crate::Value):
//! mutating the entity afterwards never changes it. Nested entities are
//! frozen as their own [`Snapshot`], bounded by their definition's observed
//! properties.

use crate::{EntityKey, EntityRef, EntityType, Property};
use std::fmt;

/// A frozen property value.
///
/// Equality is structural: scalars by value, lists by length and
/// element-wise, nested snapshots by entity type and observed state (the
/// instance they were taken from is ignored), and back-references by
/// instance.
#[derive(Clone)]
pub enum State {
    Scalar(serde_json::Value),
    List(Vec<State>),
    Entity(Snapshot),
    /// An entity already being frozen further up the same path (a cycle).
    Ref(EntityRef),
}

impl State {
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(serde_json::Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(serde_json::Value::Null))
    }

    pub fn as_scalar(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(|v| v.as_str())
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(|v| v.as_i64())
    }

    pub fn as_list(&self) -> Option<&[State]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Entity(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::List(a), Self::List(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y),
            (Self::Entity(a), Self::Entity(b)) => a == b,
            (Self::Ref(a), Self::Ref(b)) => EntityKey::of(a) == EntityKey::of(b),
            _ => false,
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Entity(snapshot) => fmt::Debug::fmt(snapshot, f),
            Self::Ref(entity) => write!(f, "<ref {}>", EntityKey::of(entity)),
        }
    }
}

impl From<serde_json::Value> for State {
    fn from(value: serde_json::Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for State {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for State {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for State {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i32> for State {
    fn from(value: i32) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<Vec<State>> for State {
    fn from(items: Vec<State>) -> Self {
        Self::List(items)
    }
}

impl From<Snapshot> for State {
    fn from(snapshot: Snapshot) -> Self {
        Self::Entity(snapshot)
    }
}

impl<T: Into<State>> From<Option<T>> for State {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Into::into)
    }
}

/// Frozen observed state of one entity instance.
///
/// Keeps a handle to the instance it was taken from so rollback can write
/// the values back in place.
#[derive(Clone)]
pub struct Snapshot {
    entity: EntityRef,
    entity_type: EntityType,
    properties: Vec<(Property, State)>,
}

impl Snapshot {
    /// Assembles a snapshot. `properties` must follow the observed order.
    pub fn new(entity: EntityRef, entity_type: EntityType, properties: Vec<(Property, State)>) -> Self {
        Self {
            entity,
            entity_type,
            properties,
        }
    }

    /// The instance this snapshot was taken from.
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::of(&self.entity)
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Frozen properties in observed order.
    pub fn properties(&self) -> &[(Property, State)] {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&State> {
        self.properties
            .iter()
            .find(|(property, _)| property == name)
            .map(|(_, state)| state)
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.entity_type == other.entity_type && self.properties == other.properties
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.entity_type.as_str());
        for (property, state) in &self.properties {
            out.field(property.name(), state);
        }
        out.finish()
    }
}
