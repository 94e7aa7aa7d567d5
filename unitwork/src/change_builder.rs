use crate::snapshot::entity_type_of;
use crate::{
    Command, Comparer, EditCommand, EntityIdentity, Identifier, NewCommand, Registry, UowResult,
};
use std::rc::Rc;
use unitwork_model::{DefinitionRepository, EntityKey, EntityRef};

/// Decides which command, if any, a tracked entity needs.
///
/// - no identity value: [`Command::New`], whatever the snapshot says
/// - identity value and observed changes: [`Command::Edit`]
/// - identity value and no changes: nothing
///
/// Building never mutates the registry or the entity.
pub struct ChangeBuilder {
    definitions: Rc<dyn DefinitionRepository>,
    identifier: Identifier,
    comparer: Comparer,
}

impl ChangeBuilder {
    pub fn new(definitions: Rc<dyn DefinitionRepository>, identifier: Identifier, comparer: Comparer) -> Self {
        Self {
            definitions,
            identifier,
            comparer,
        }
    }

    pub fn build(&self, entity: &EntityRef, registry: &Registry) -> UowResult<Option<Command>> {
        let entity_type = entity_type_of(entity)?;
        let definition = self.definitions.definition_for(entity_type.as_str())?;

        if let EntityIdentity::New = self.identifier.identity_with(entity, &definition)? {
            return Ok(Some(Command::New(NewCommand::new(Rc::clone(entity)))));
        }

        let snapshot = registry.snapshot_of(EntityKey::of(entity))?;
        let changes = self.comparer.diff(snapshot, entity, &definition)?;
        if changes.is_empty() {
            return Ok(None);
        }
        Ok(Some(Command::Edit(EditCommand::new(Rc::clone(entity), changes))))
    }
}
