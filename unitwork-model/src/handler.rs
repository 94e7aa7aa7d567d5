use crate::{ChangeSet, EntityRef};

/// Persists an entity that has no identity value yet.
///
/// Implementations usually assign the identity value on the entity so the
/// next commit treats it as existing.
pub trait NewCommandHandler {
    fn persist(&self, entity: &EntityRef) -> anyhow::Result<()>;
}

/// Persists the observed changes of an existing entity.
///
/// `changes` is never empty and is ordered like the definition's observed
/// properties.
pub trait EditCommandHandler {
    fn persist(&self, entity: &EntityRef, changes: &ChangeSet) -> anyhow::Result<()>;
}

/// Deletes an entity from storage.
pub trait RemoveCommandHandler {
    fn remove(&self, entity: &EntityRef) -> anyhow::Result<()>;
}
