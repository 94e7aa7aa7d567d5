use crate::snapshot::{entity_type_of, read};
use crate::{UowError, UowResult};
use std::rc::Rc;
use unitwork_model::{Definition, DefinitionRepository, EntityRef, Value};

/// Whether an entity has been persisted before.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityIdentity {
    /// The identity property is unset or empty.
    New,
    /// The identity property holds this value.
    Existing(serde_json::Value),
}

impl EntityIdentity {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }
}

/// Reads identity values through the entity type's definition.
///
/// Independent of tracking: an untracked entity can be identified too.
#[derive(Clone)]
pub struct Identifier {
    definitions: Rc<dyn DefinitionRepository>,
}

impl Identifier {
    pub fn new(definitions: Rc<dyn DefinitionRepository>) -> Self {
        Self { definitions }
    }

    pub fn identity_of(&self, entity: &EntityRef) -> UowResult<EntityIdentity> {
        let entity_type = entity_type_of(entity)?;
        let definition = self.definitions.definition_for(entity_type.as_str())?;
        self.identity_with(entity, &definition)
    }

    pub fn identity_with(&self, entity: &EntityRef, definition: &Definition) -> UowResult<EntityIdentity> {
        let value = read(entity)?.property(definition.identity().name());
        classify(definition, value)
    }

    pub fn is_new(&self, entity: &EntityRef) -> UowResult<bool> {
        Ok(self.identity_of(entity)?.is_new())
    }
}

/// Unset, `null`, `""` and an empty list all count as "no identity yet".
fn classify(definition: &Definition, value: Option<Value>) -> UowResult<EntityIdentity> {
    match value {
        None => Ok(EntityIdentity::New),
        Some(Value::Scalar(serde_json::Value::Null)) => Ok(EntityIdentity::New),
        Some(Value::Scalar(serde_json::Value::String(s))) if s.is_empty() => Ok(EntityIdentity::New),
        Some(Value::List(items)) if items.is_empty() => Ok(EntityIdentity::New),
        Some(Value::Scalar(v)) => Ok(EntityIdentity::Existing(v)),
        Some(other) => Err(UowError::InvalidArgument(format!(
            "identity property `{}` of {} must hold a scalar, got {}",
            definition.identity(),
            definition.entity_type(),
            other.kind_name()
        ))),
    }
}
