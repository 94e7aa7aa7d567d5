use crate::{SnapshotMaker, UowError, UowResult};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;
use unitwork_model::{EntityKey, EntityRef, Snapshot};

/// Tracked entity instances and their current baseline snapshots.
///
/// Entries are keyed by instance identity, not identity value, since new
/// entities have none yet. Iteration follows registration order.
pub struct Registry {
    snapshots: SnapshotMaker,
    entries: HashMap<EntityKey, Snapshot>,
    order: Vec<EntityKey>,
}

impl Registry {
    pub fn new(snapshots: SnapshotMaker) -> Self {
        Self {
            snapshots,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The snapshot maker used at registration.
    pub fn snapshot_maker(&self) -> &SnapshotMaker {
        &self.snapshots
    }

    /// Starts tracking an entity by snapshotting it.
    ///
    /// Returns `false` without taking a new snapshot when the instance is
    /// already tracked.
    pub fn register(&mut self, entity: &EntityRef) -> UowResult<bool> {
        let key = EntityKey::of(entity);
        if self.entries.contains_key(&key) {
            return Ok(false);
        }
        let snapshot = self.snapshots.snapshot(entity)?;
        debug!(entity = %key, entity_type = %snapshot.entity_type(), "Registered entity");
        self.entries.insert(key, snapshot);
        self.order.push(key);
        Ok(true)
    }

    pub fn is_registered(&self, key: EntityKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Stops tracking an entity and drops its snapshot.
    /// Returns whether it was tracked.
    pub fn unregister(&mut self, key: EntityKey) -> bool {
        if self.entries.remove(&key).is_none() {
            return false;
        }
        self.order.retain(|k| *k != key);
        true
    }

    /// The baseline snapshot of a tracked entity.
    pub fn snapshot_of(&self, key: EntityKey) -> UowResult<&Snapshot> {
        self.entries.get(&key).ok_or(UowError::NotFound(key))
    }

    /// Rebases a tracked entity's baseline.
    pub fn replace_snapshot(&mut self, key: EntityKey, snapshot: Snapshot) -> UowResult<()> {
        let slot = self.entries.get_mut(&key).ok_or(UowError::NotFound(key))?;
        *slot = snapshot;
        Ok(())
    }

    /// The tracked instance behind a key.
    pub fn entity(&self, key: EntityKey) -> Option<&EntityRef> {
        self.entries.get(&key).map(Snapshot::entity)
    }

    /// Handles to every tracked entity, in registration order.
    pub fn entities(&self) -> Vec<EntityRef> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key))
            .map(|snapshot| Rc::clone(snapshot.entity()))
            .collect()
    }

    /// Baseline snapshots in registration order.
    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
