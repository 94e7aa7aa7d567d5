use crate::{ModelError, ModelResult, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a tracked entity instance.
///
/// The unit of work and the caller both hold the same allocation; its
/// address is what identifies the instance while it is tracked.
pub type EntityRef = Rc<RefCell<dyn Entity>>;

/// Capability every tracked entity type implements.
///
/// The engine only ever reaches an entity through this trait, and only for
/// the properties its [`Definition`](crate::Definition) names.
pub trait Entity: 'static {
    /// The entity type used to look up its definition.
    fn entity_type(&self) -> &str;

    /// Reads a property. `None` means the entity has no such property.
    fn property(&self, name: &str) -> Option<Value>;

    /// Writes a property in place.
    fn set_property(&mut self, name: &str, value: Value) -> ModelResult<()>;
}

/// Wraps an entity into a shared handle the unit of work can track.
pub fn share<E: Entity>(entity: E) -> Rc<RefCell<E>> {
    Rc::new(RefCell::new(entity))
}

/// Instance identity of a shared entity (its allocation address).
///
/// Two handles to the same allocation produce the same key, whether typed
/// (`Rc<RefCell<Person>>`) or erased (`EntityRef`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey(usize);

impl EntityKey {
    /// Returns the key of a shared entity.
    #[must_use]
    pub fn of<E: Entity + ?Sized>(entity: &Rc<RefCell<E>>) -> Self {
        Self(Rc::as_ptr(entity) as *const () as usize)
    }
}

/// A shared entity handle the unit of work accepts: typed
/// (`Rc<RefCell<Person>>`) or erased ([`EntityRef`]).
pub trait EntityHandle {
    /// Instance identity of the handle's allocation.
    fn key(&self) -> EntityKey;

    /// A type-erased clone of the handle.
    fn to_entity_ref(&self) -> EntityRef;
}

impl<E: Entity> EntityHandle for Rc<RefCell<E>> {
    fn key(&self) -> EntityKey {
        EntityKey::of(self)
    }

    fn to_entity_ref(&self) -> EntityRef {
        Rc::clone(self) as EntityRef
    }
}

impl EntityHandle for EntityRef {
    fn key(&self) -> EntityKey {
        EntityKey::of(self)
    }

    fn to_entity_ref(&self) -> EntityRef {
        Rc::clone(self)
    }
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({:#x})", self.0)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A map-backed entity for callers that do not want a dedicated Rust type.
///
/// Properties keep their insertion order. Reading a property that was never
/// set yields `None`; writing one adds it.
#[derive(Debug, Clone)]
pub struct DynamicEntity {
    entity_type: String,
    properties: Vec<(String, Value)>,
}

impl DynamicEntity {
    /// Creates an entity of the given type with no properties.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            properties: Vec::new(),
        }
    }

    /// Builder-style property assignment.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns a property value by reference.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Sets a property, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.properties.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((name.to_string(), value)),
        }
    }

    /// Removes a property, returning its last value.
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        let index = self.properties.iter().position(|(key, _)| key == name)?;
        Some(self.properties.remove(index).1)
    }

    /// Property names in insertion order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(key, _)| key.as_str())
    }
}

impl Entity for DynamicEntity {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: Value) -> ModelResult<()> {
        if name.is_empty() {
            return Err(ModelError::UnknownProperty {
                entity_type: self.entity_type.clone(),
                property: String::new(),
            });
        }
        self.set(name, value);
        Ok(())
    }
}
