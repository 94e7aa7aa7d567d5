use crate::{SnapshotMaker, UowResult};
use unitwork_model::{Change, ChangeSet, Definition, EntityRef, Snapshot, State};

/// Computes what changed between a snapshot and an entity's live state.
///
/// Only the definition's observed properties are read, in declaration order.
/// Scalars compare by value. Collections compare deeply: same length and
/// element-wise equal, where nested entities compare by their own observed
/// state. A collection that differs anywhere is reported as one change
/// carrying the whole old and whole new collection.
#[derive(Clone)]
pub struct Comparer {
    snapshots: SnapshotMaker,
}

impl Comparer {
    pub fn new(snapshots: SnapshotMaker) -> Self {
        Self { snapshots }
    }

    pub fn diff(&self, snapshot: &Snapshot, entity: &EntityRef, definition: &Definition) -> UowResult<ChangeSet> {
        let current = self.snapshots.snapshot_with(entity, definition)?;

        let mut changes = ChangeSet::default();
        for property in definition.observed() {
            let old = snapshot.get(property.name()).cloned().unwrap_or_else(State::null);
            let new = current.get(property.name()).cloned().unwrap_or_else(State::null);
            if old != new {
                changes.push(Change::scalar(property.clone(), old, new));
            }
        }
        Ok(changes)
    }
}
