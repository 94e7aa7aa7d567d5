//! The unit-of-work orchestrator.

use crate::{
    ChangeBuilder, Command, CommandBus, CommandKind, Comparer, EntityIdentity, Identifier, Registry,
    RemoveCommand, SnapshotMaker, UnitOfWorkConfig, UowError, UowResult, bus_for,
};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, info};
use unitwork_model::{DefinitionRepository, EntityHandle, EntityKey, EntityRef, Snapshot};

/// Where a tracked entity stands relative to its last commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityStatus {
    /// No identity value; the next commit persists it as new.
    New,
    /// Observed properties differ from the baseline snapshot.
    Edited,
    /// Nothing to write.
    Persisted,
    /// Marked for removal by the next commit.
    Removed,
}

/// Number of commands dispatched by one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub created: usize,
    pub edited: usize,
    pub removed: usize,
    /// Tracked entities that needed no command.
    pub unchanged: usize,
}

impl CommitReport {
    fn record(&mut self, kind: CommandKind) {
        match kind {
            CommandKind::New => self.created += 1,
            CommandKind::Edit => self.edited += 1,
            CommandKind::Remove => self.removed += 1,
        }
    }

    /// Total commands dispatched.
    pub fn dispatched(&self) -> usize {
        self.created + self.edited + self.removed
    }
}

/// Tracks entities and turns their changes into persistence commands.
///
/// Commit is not atomic across entities. When a handler fails, the error is
/// returned at once: entities handled before it keep their dispatched effects
/// and rebased snapshots, the failing one keeps its old snapshot (or removal
/// mark), and the rest are left for the next commit.
pub struct UnitOfWork {
    definitions: Rc<dyn DefinitionRepository>,
    registry: Registry,
    identifier: Identifier,
    builder: ChangeBuilder,
    bus: Box<dyn CommandBus>,
    removals: Vec<EntityRef>,
}

impl UnitOfWork {
    /// Creates a unit of work with the default configuration (silent dispatch).
    pub fn new(definitions: Rc<dyn DefinitionRepository>) -> Self {
        Self::with_config(definitions, UnitOfWorkConfig::default())
    }

    /// Creates a unit of work whose bus follows the configured dispatch policy.
    pub fn with_config(definitions: Rc<dyn DefinitionRepository>, config: UnitOfWorkConfig) -> Self {
        let bus = bus_for(config.dispatch_policy, Rc::clone(&definitions));
        Self::with_bus(definitions, config, bus)
    }

    /// Creates a unit of work dispatching through a custom bus.
    pub fn with_bus(
        definitions: Rc<dyn DefinitionRepository>,
        config: UnitOfWorkConfig,
        bus: Box<dyn CommandBus>,
    ) -> Self {
        let snapshots = SnapshotMaker::new(Rc::clone(&definitions), config.max_depth);
        let identifier = Identifier::new(Rc::clone(&definitions));
        let builder = ChangeBuilder::new(
            Rc::clone(&definitions),
            identifier.clone(),
            Comparer::new(snapshots.clone()),
        );
        Self {
            definitions,
            registry: Registry::new(snapshots),
            identifier,
            builder,
            bus,
            removals: Vec::new(),
        }
    }

    pub fn definitions(&self) -> &Rc<dyn DefinitionRepository> {
        &self.definitions
    }

    /// Starts tracking an entity. Registering a tracked instance again does nothing.
    pub fn register<H: EntityHandle>(&mut self, entity: &H) -> UowResult<()> {
        self.registry.register(&entity.to_entity_ref())?;
        Ok(())
    }

    /// Marks a tracked entity for removal on the next commit.
    pub fn remove<H: EntityHandle>(&mut self, entity: &H) -> UowResult<()> {
        let key = entity.key();
        let Some(tracked) = self.registry.entity(key) else {
            return Err(UowError::UntrackedEntity(key));
        };
        if self.is_marked(key) {
            return Ok(());
        }
        debug!(entity = %key, "Entity marked for removal");
        self.removals.push(Rc::clone(tracked));
        Ok(())
    }

    pub fn is_registered<H: EntityHandle>(&self, entity: &H) -> bool {
        self.registry.is_registered(entity.key())
    }

    /// Whether the entity is marked for removal and not yet committed.
    pub fn is_removed<H: EntityHandle>(&self, entity: &H) -> bool {
        self.is_marked(entity.key())
    }

    pub fn tracked_count(&self) -> usize {
        self.registry.len()
    }

    /// Reports what the next commit would do with a tracked entity.
    pub fn status_of<H: EntityHandle>(&self, entity: &H) -> UowResult<EntityStatus> {
        let key = entity.key();
        let Some(tracked) = self.registry.entity(key) else {
            return Err(UowError::UntrackedEntity(key));
        };
        if self.is_marked(key) {
            return Ok(EntityStatus::Removed);
        }
        if let EntityIdentity::New = self.identifier.identity_of(tracked)? {
            return Ok(EntityStatus::New);
        }
        Ok(match self.builder.build(tracked, &self.registry)? {
            Some(_) => EntityStatus::Edited,
            None => EntityStatus::Persisted,
        })
    }

    /// Dispatches one command per entity that needs it.
    ///
    /// Removals go first, in the order they were marked; each removed entity
    /// is then untracked. Every other tracked entity, in registration order,
    /// gets a `New` or `Edit` command when it needs one, and after a
    /// successful dispatch its snapshot is rebased on its current state.
    pub fn commit(&mut self) -> UowResult<CommitReport> {
        info!(
            tracked = self.registry.len(),
            removals = self.removals.len(),
            "Committing unit of work"
        );
        let mut report = CommitReport::default();

        while let Some(entity) = self.removals.first().cloned() {
            let key = EntityKey::of(&entity);
            self.bus.dispatch(&Command::Remove(RemoveCommand::new(entity)))?;
            self.removals.remove(0);
            self.registry.unregister(key);
            report.record(CommandKind::Remove);
        }

        for entity in self.registry.entities() {
            let Some(command) = self.builder.build(&entity, &self.registry)? else {
                report.unchanged += 1;
                continue;
            };
            self.bus.dispatch(&command)?;

            let key = EntityKey::of(&entity);
            let rebased = self.registry.snapshot_maker().snapshot(&entity)?;
            debug!(
                entity = %key,
                entity_type = %rebased.entity_type(),
                kind = %command.kind(),
                "Snapshot rebased"
            );
            self.registry.replace_snapshot(key, rebased)?;
            report.record(command.kind());
        }

        info!(
            created = report.created,
            edited = report.edited,
            removed = report.removed,
            unchanged = report.unchanged,
            "Commit complete"
        );
        Ok(report)
    }

    /// Restores every tracked entity to its last committed (or registered)
    /// state and drops pending removal marks.
    pub fn rollback(&mut self) -> UowResult<()> {
        let discarded = self.removals.len();
        self.removals.clear();

        // A tracked entity nested in another is restored only from its own
        // baseline, which may be newer than the copy inside its parent's.
        let tracked: HashSet<EntityKey> = self.registry.snapshots().map(Snapshot::key).collect();
        let snapshots = self.registry.snapshot_maker();
        for snapshot in self.registry.snapshots() {
            snapshots.restore_skipping(snapshot, &tracked)?;
        }
        info!(
            restored = self.registry.len(),
            discarded_removals = discarded,
            "Rolled back unit of work"
        );
        Ok(())
    }

    fn is_marked(&self, key: EntityKey) -> bool {
        self.removals.iter().any(|e| EntityKey::of(e) == key)
    }
}
