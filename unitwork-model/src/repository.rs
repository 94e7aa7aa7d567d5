use crate::{Definition, EntityType, ModelError, ModelResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Lookup of definitions by entity type.
///
/// Definitions may be added after the components holding the repository are
/// built, as long as it happens before they are first used for that type.
pub trait DefinitionRepository {
    /// Registers a definition, replacing any previous one for the same type.
    fn add_definition(&self, definition: Definition) -> Rc<Definition>;

    /// Resolves the definition for an entity type.
    fn definition_for(&self, entity_type: &str) -> ModelResult<Rc<Definition>>;

    fn contains(&self, entity_type: &str) -> bool {
        self.definition_for(entity_type).is_ok()
    }
}

/// In-memory repository. Clones share the same underlying map, so every
/// holder resolves the same `Rc<Definition>` for a type.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDefinitions {
    definitions: Rc<RefCell<HashMap<EntityType, Rc<Definition>>>>,
}

impl InMemoryDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-filled with definitions.
    pub fn from_definitions(definitions: impl IntoIterator<Item = Definition>) -> Self {
        let repository = Self::new();
        for definition in definitions {
            repository.add_definition(definition);
        }
        repository
    }

    pub fn len(&self) -> usize {
        self.definitions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.borrow().is_empty()
    }
}

impl DefinitionRepository for InMemoryDefinitions {
    fn add_definition(&self, definition: Definition) -> Rc<Definition> {
        let definition = Rc::new(definition);
        self.definitions
            .borrow_mut()
            .insert(definition.entity_type().clone(), Rc::clone(&definition));
        definition
    }

    fn definition_for(&self, entity_type: &str) -> ModelResult<Rc<Definition>> {
        self.definitions
            .borrow()
            .get(entity_type)
            .cloned()
            .ok_or_else(|| ModelError::UnknownEntityType(entity_type.to_string()))
    }
}
