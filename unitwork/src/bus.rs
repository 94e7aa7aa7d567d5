//! Routing commands to the handlers named in entity definitions.

use crate::snapshot::entity_type_of;
use crate::{Command, CommandKind, DispatchPolicy, UowError, UowResult};
use std::rc::Rc;
use tracing::debug;
use unitwork_model::DefinitionRepository;

/// Delivers commands to persistence handlers.
///
/// Handlers run synchronously and their errors come back unchanged as
/// [`UowError::Handler`].
pub trait CommandBus {
    fn dispatch(&self, command: &Command) -> UowResult<()>;
}

/// Skips commands whose definition has no matching handler.
pub struct SilentBus {
    definitions: Rc<dyn DefinitionRepository>,
}

impl SilentBus {
    pub fn new(definitions: Rc<dyn DefinitionRepository>) -> Self {
        Self { definitions }
    }
}

impl CommandBus for SilentBus {
    fn dispatch(&self, command: &Command) -> UowResult<()> {
        route(self.definitions.as_ref(), command, DispatchPolicy::Silent)
    }
}

/// Fails with [`UowError::MissingHandler`] when no matching handler exists.
pub struct StrictBus {
    definitions: Rc<dyn DefinitionRepository>,
}

impl StrictBus {
    pub fn new(definitions: Rc<dyn DefinitionRepository>) -> Self {
        Self { definitions }
    }
}

impl CommandBus for StrictBus {
    fn dispatch(&self, command: &Command) -> UowResult<()> {
        route(self.definitions.as_ref(), command, DispatchPolicy::Strict)
    }
}

/// Builds the bus matching a dispatch policy.
pub fn bus_for(policy: DispatchPolicy, definitions: Rc<dyn DefinitionRepository>) -> Box<dyn CommandBus> {
    match policy {
        DispatchPolicy::Silent => Box::new(SilentBus::new(definitions)),
        DispatchPolicy::Strict => Box::new(StrictBus::new(definitions)),
    }
}

fn route(definitions: &dyn DefinitionRepository, command: &Command, policy: DispatchPolicy) -> UowResult<()> {
    let entity_type = entity_type_of(command.entity())?;
    let definition = definitions.definition_for(entity_type.as_str())?;

    let handled = match command {
        Command::New(new) => match definition.new_handler() {
            Some(handler) => {
                handler.persist(new.entity())?;
                true
            }
            None => false,
        },
        Command::Edit(edit) => match definition.edit_handler() {
            Some(handler) => {
                handler.persist(edit.entity(), edit.changes())?;
                true
            }
            None => false,
        },
        Command::Remove(remove) => match definition.remove_handler() {
            Some(handler) => {
                handler.remove(remove.entity())?;
                true
            }
            None => false,
        },
    };

    if handled {
        debug!(entity_type = %entity_type, kind = %command.kind(), "Dispatched command");
        return Ok(());
    }
    missing_handler(entity_type.to_string(), command.kind(), policy)
}

fn missing_handler(entity_type: String, kind: CommandKind, policy: DispatchPolicy) -> UowResult<()> {
    match policy {
        DispatchPolicy::Silent => {
            debug!(entity_type = %entity_type, kind = %kind, "No handler defined, command skipped");
            Ok(())
        }
        DispatchPolicy::Strict => Err(UowError::MissingHandler { entity_type, kind }),
    }
}
