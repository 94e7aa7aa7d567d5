//! Commands built from detected state transitions.

use crate::{UowError, UowResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use unitwork_model::{ChangeSet, EntityKey, EntityRef, Value};

/// Which handler a command is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    New,
    Edit,
    Remove,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::Edit => f.write_str("edit"),
            Self::Remove => f.write_str("remove"),
        }
    }
}

fn expect_entity(value: Value, kind: CommandKind) -> UowResult<EntityRef> {
    match value {
        Value::Entity(entity) => Ok(entity),
        other => Err(UowError::InvalidArgument(format!(
            "{kind} command requires an entity, {} given",
            other.kind_name()
        ))),
    }
}

/// Persist an entity that has no identity value yet.
#[derive(Clone)]
pub struct NewCommand {
    entity: EntityRef,
}

impl NewCommand {
    pub fn new(entity: EntityRef) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }
}

impl TryFrom<Value> for NewCommand {
    type Error = UowError;

    fn try_from(value: Value) -> UowResult<Self> {
        expect_entity(value, CommandKind::New).map(Self::new)
    }
}

impl fmt::Debug for NewCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCommand")
            .field("entity", &EntityKey::of(&self.entity))
            .finish()
    }
}

/// Persist the listed changes of an existing entity.
#[derive(Clone)]
pub struct EditCommand {
    entity: EntityRef,
    changes: ChangeSet,
}

impl EditCommand {
    pub fn new(entity: EntityRef, changes: ChangeSet) -> Self {
        Self { entity, changes }
    }

    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }
}

/// Pairs an untyped value with the changes to persist for it.
impl TryFrom<(Value, ChangeSet)> for EditCommand {
    type Error = UowError;

    fn try_from((value, changes): (Value, ChangeSet)) -> UowResult<Self> {
        expect_entity(value, CommandKind::Edit).map(|entity| Self::new(entity, changes))
    }
}

impl fmt::Debug for EditCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditCommand")
            .field("entity", &EntityKey::of(&self.entity))
            .field("changes", &self.changes)
            .finish()
    }
}

/// Delete an entity.
#[derive(Clone)]
pub struct RemoveCommand {
    entity: EntityRef,
}

impl RemoveCommand {
    pub fn new(entity: EntityRef) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }
}

impl TryFrom<Value> for RemoveCommand {
    type Error = UowError;

    fn try_from(value: Value) -> UowResult<Self> {
        expect_entity(value, CommandKind::Remove).map(Self::new)
    }
}

impl fmt::Debug for RemoveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveCommand")
            .field("entity", &EntityKey::of(&self.entity))
            .finish()
    }
}

/// A command produced during commit. Transient; never stored by the engine.
#[derive(Clone)]
pub enum Command {
    New(NewCommand),
    Edit(EditCommand),
    Remove(RemoveCommand),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::New(_) => CommandKind::New,
            Self::Edit(_) => CommandKind::Edit,
            Self::Remove(_) => CommandKind::Remove,
        }
    }

    pub fn entity(&self) -> &EntityRef {
        match self {
            Self::New(command) => command.entity(),
            Self::Edit(command) => command.entity(),
            Self::Remove(command) => command.entity(),
        }
    }

    /// The change set of an edit command.
    pub fn changes(&self) -> Option<&ChangeSet> {
        match self {
            Self::Edit(command) => Some(command.changes()),
            _ => None,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Command");
        out.field("kind", &self.kind())
            .field("entity", &EntityKey::of(self.entity()));
        if let Some(changes) = self.changes() {
            out.field("changes", changes);
        }
        out.finish()
    }
}
