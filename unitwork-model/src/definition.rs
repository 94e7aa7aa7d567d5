use crate::{EditCommandHandler, ModelError, ModelResult, NewCommandHandler, RemoveCommandHandler};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

/// Name of an entity type (the key definitions are looked up by).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityType {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for EntityType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of an entity property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Property(String);

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Property {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Property {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for Property {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Property {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Describes how one entity type is identified, diffed and persisted.
///
/// The identity property tells new entities (no identity value yet) apart
/// from existing ones. Only observed properties are snapshotted, compared and
/// rolled back; the identity property does not have to be one of them.
///
/// Handlers are optional. Whether a missing handler is an error is decided by
/// the command bus, not here.
pub struct Definition {
    entity_type: EntityType,
    identity: Property,
    observed: Vec<Property>,
    new_handler: Option<Rc<dyn NewCommandHandler>>,
    edit_handler: Option<Rc<dyn EditCommandHandler>>,
    remove_handler: Option<Rc<dyn RemoveCommandHandler>>,
}

impl Definition {
    /// Creates a definition with no observed properties and no handlers.
    pub fn new(entity_type: impl Into<EntityType>, identity: impl Into<Property>) -> Self {
        Self {
            entity_type: entity_type.into(),
            identity: identity.into(),
            observed: Vec::new(),
            new_handler: None,
            edit_handler: None,
            remove_handler: None,
        }
    }

    /// Replaces the observed properties. Order is kept; duplicates are rejected.
    pub fn set_observed<I, P>(&mut self, properties: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Property>,
    {
        let mut observed: Vec<Property> = Vec::new();
        for property in properties {
            let property = property.into();
            if observed.contains(&property) {
                return Err(ModelError::DuplicateProperty {
                    entity_type: self.entity_type.to_string(),
                    property: property.to_string(),
                });
            }
            observed.push(property);
        }
        self.observed = observed;
        Ok(())
    }

    /// Builder-style [`set_observed`](Self::set_observed).
    pub fn observe<I, P>(mut self, properties: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Property>,
    {
        self.set_observed(properties)?;
        Ok(self)
    }

    pub fn set_new_handler(&mut self, handler: Rc<dyn NewCommandHandler>) {
        self.new_handler = Some(handler);
    }

    pub fn set_edit_handler(&mut self, handler: Rc<dyn EditCommandHandler>) {
        self.edit_handler = Some(handler);
    }

    pub fn set_remove_handler(&mut self, handler: Rc<dyn RemoveCommandHandler>) {
        self.remove_handler = Some(handler);
    }

    #[must_use]
    pub fn with_new_handler(mut self, handler: Rc<dyn NewCommandHandler>) -> Self {
        self.set_new_handler(handler);
        self
    }

    #[must_use]
    pub fn with_edit_handler(mut self, handler: Rc<dyn EditCommandHandler>) -> Self {
        self.set_edit_handler(handler);
        self
    }

    #[must_use]
    pub fn with_remove_handler(mut self, handler: Rc<dyn RemoveCommandHandler>) -> Self {
        self.set_remove_handler(handler);
        self
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// The property holding the identity value.
    pub fn identity(&self) -> &Property {
        &self.identity
    }

    /// Observed properties in declaration order.
    pub fn observed(&self) -> &[Property] {
        &self.observed
    }

    pub fn is_observed(&self, name: &str) -> bool {
        self.observed.iter().any(|p| p == name)
    }

    pub fn new_handler(&self) -> Option<&Rc<dyn NewCommandHandler>> {
        self.new_handler.as_ref()
    }

    pub fn edit_handler(&self) -> Option<&Rc<dyn EditCommandHandler>> {
        self.edit_handler.as_ref()
    }

    pub fn remove_handler(&self) -> Option<&Rc<dyn RemoveCommandHandler>> {
        self.remove_handler.as_ref()
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("entity_type", &self.entity_type)
            .field("identity", &self.identity)
            .field("observed", &self.observed)
            .field("new_handler", &self.new_handler.is_some())
            .field("edit_handler", &self.edit_handler.is_some())
            .field("remove_handler", &self.remove_handler.is_some())
            .finish()
    }
}
