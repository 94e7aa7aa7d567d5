//! Freezing live entity state into snapshots and writing it back.

use crate::{UowError, UowResult};
use std::cell::{Ref, RefMut};
use std::collections::HashSet;
use std::rc::Rc;
use unitwork_model::{
    Definition, DefinitionRepository, Entity, EntityKey, EntityRef, EntityType, Snapshot, State,
    Value,
};

/// Borrows an entity for reading, failing instead of panicking when it is
/// mutably borrowed elsewhere.
pub(crate) fn read(entity: &EntityRef) -> UowResult<Ref<'_, dyn Entity>> {
    entity
        .try_borrow()
        .map_err(|_| UowError::EntityBusy(EntityKey::of(entity)))
}

/// Borrows an entity for writing.
pub(crate) fn write(entity: &EntityRef) -> UowResult<RefMut<'_, dyn Entity>> {
    entity
        .try_borrow_mut()
        .map_err(|_| UowError::EntityBusy(EntityKey::of(entity)))
}

pub(crate) fn entity_type_of(entity: &EntityRef) -> UowResult<EntityType> {
    Ok(EntityType::from(read(entity)?.entity_type()))
}

/// Produces independent copies of an entity's observed properties.
///
/// Only properties named by a definition are read, at every level: nested
/// entities are frozen with their own type's observed properties. An entity
/// met again on the path it is being frozen from becomes [`State::Ref`], so
/// cyclic graphs terminate.
///
/// Sharing is not detected: an instance reachable along several paths is
/// frozen again for each one, so a graph that fans out onto the same
/// entities at every level costs a copy per path. `max_depth` bounds that
/// cost; lower it for such graphs.
#[derive(Clone)]
pub struct SnapshotMaker {
    definitions: Rc<dyn DefinitionRepository>,
    max_depth: usize,
}

impl SnapshotMaker {
    pub fn new(definitions: Rc<dyn DefinitionRepository>, max_depth: usize) -> Self {
        Self {
            definitions,
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Snapshots an entity using its registered definition.
    pub fn snapshot(&self, entity: &EntityRef) -> UowResult<Snapshot> {
        let entity_type = entity_type_of(entity)?;
        let definition = self.definitions.definition_for(entity_type.as_str())?;
        self.snapshot_with(entity, &definition)
    }

    /// Snapshots an entity using an already resolved definition.
    pub fn snapshot_with(&self, entity: &EntityRef, definition: &Definition) -> UowResult<Snapshot> {
        let mut path = HashSet::new();
        self.freeze_observed(entity, definition, &mut path, 0)
    }

    fn freeze_entity(
        &self,
        entity: &EntityRef,
        path: &mut HashSet<EntityKey>,
        depth: usize,
    ) -> UowResult<Snapshot> {
        let entity_type = entity_type_of(entity)?;
        if depth > self.max_depth {
            return Err(UowError::DepthExceeded {
                entity_type: entity_type.to_string(),
                max_depth: self.max_depth,
            });
        }
        let definition = self.definitions.definition_for(entity_type.as_str())?;
        self.freeze_observed(entity, &definition, path, depth)
    }

    fn freeze_observed(
        &self,
        entity: &EntityRef,
        definition: &Definition,
        path: &mut HashSet<EntityKey>,
        depth: usize,
    ) -> UowResult<Snapshot> {
        let key = EntityKey::of(entity);
        path.insert(key);

        let mut properties = Vec::with_capacity(definition.observed().len());
        for property in definition.observed() {
            let value = read(entity)?.property(property.name());
            let state = match value {
                Some(value) => self.freeze(&value, path, depth)?,
                None => State::null(),
            };
            properties.push((property.clone(), state));
        }

        path.remove(&key);
        Ok(Snapshot::new(
            Rc::clone(entity),
            definition.entity_type().clone(),
            properties,
        ))
    }

    fn freeze(&self, value: &Value, path: &mut HashSet<EntityKey>, depth: usize) -> UowResult<State> {
        match value {
            Value::Scalar(v) => Ok(State::Scalar(v.clone())),
            Value::List(items) => items
                .iter()
                .map(|item| self.freeze(item, path, depth))
                .collect::<UowResult<Vec<_>>>()
                .map(State::List),
            Value::Entity(nested) if path.contains(&EntityKey::of(nested)) => {
                Ok(State::Ref(Rc::clone(nested)))
            }
            Value::Entity(nested) => self.freeze_entity(nested, path, depth + 1).map(State::Entity),
        }
    }

    /// Writes a snapshot back onto the entity it was taken from, in place.
    ///
    /// Nested snapshots restore their own instances, and collection
    /// properties get back the original instances in their original order.
    /// An instance reachable more than once is restored once.
    pub fn restore(&self, snapshot: &Snapshot) -> UowResult<()> {
        self.restore_skipping(snapshot, &HashSet::new())
    }

    /// Like [`restore`](Self::restore), but leaves the nested instances in
    /// `skip` untouched: they still go back into restored collections, their
    /// own properties are not rewritten. Used for entities that are restored
    /// from their own baseline.
    pub fn restore_skipping(&self, snapshot: &Snapshot, skip: &HashSet<EntityKey>) -> UowResult<()> {
        let root = snapshot.key();
        let mut restored: HashSet<EntityKey> =
            skip.iter().copied().filter(|key| *key != root).collect();
        restore_entity(snapshot, &mut restored)
    }
}

fn restore_entity(snapshot: &Snapshot, restored: &mut HashSet<EntityKey>) -> UowResult<()> {
    if !restored.insert(snapshot.key()) {
        return Ok(());
    }
    for (property, state) in snapshot.properties() {
        let value = thaw(state, restored)?;
        write(snapshot.entity())?.set_property(property.name(), value)?;
    }
    Ok(())
}

fn thaw(state: &State, restored: &mut HashSet<EntityKey>) -> UowResult<Value> {
    Ok(match state {
        State::Scalar(v) => Value::Scalar(v.clone()),
        State::List(items) => Value::List(
            items
                .iter()
                .map(|item| thaw(item, restored))
                .collect::<UowResult<Vec<_>>>()?,
        ),
        State::Entity(nested) => {
            restore_entity(nested, restored)?;
            Value::Entity(Rc::clone(nested.entity()))
        }
        State::Ref(entity) => Value::Entity(Rc::clone(entity)),
    })
}
