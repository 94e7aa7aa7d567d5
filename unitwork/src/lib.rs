//! Unit-of-Work change tracking for unitwork.
//!
//! A [`UnitOfWork`] tracks shared entity instances, freezes a [`Snapshot`] of
//! each one's observed properties when it is registered, and on
//! [`commit`](UnitOfWork::commit) turns what changed into commands:
//!
//! - [`NewCommand`]: the entity has no identity value yet
//! - [`EditCommand`]: an existing entity's observed properties differ from its snapshot
//! - [`RemoveCommand`]: the entity was marked with [`remove`](UnitOfWork::remove)
//!
//! Commands are routed by a [`CommandBus`] to the handlers named in the
//! entity type's [`Definition`]. [`rollback`](UnitOfWork::rollback) writes
//! the snapshots back onto the live entities, undoing everything since the
//! last commit.
//!
//! The engine is single-threaded and synchronous; use one unit of work per
//! logical transaction.
//!
//! [`Snapshot`]: unitwork_model::Snapshot
//! [`Definition`]: unitwork_model::Definition

mod bus;
mod change_builder;
mod command;
mod comparer;
mod config;
mod error;
mod identifier;
mod registry;
mod snapshot;
mod unit_of_work;

pub use bus::{CommandBus, SilentBus, StrictBus, bus_for};
pub use change_builder::ChangeBuilder;
pub use command::{Command, CommandKind, EditCommand, NewCommand, RemoveCommand};
pub use comparer::Comparer;
pub use config::{DEFAULT_MAX_DEPTH, DispatchPolicy, UnitOfWorkConfig};
pub use error::{UowError, UowResult};
pub use identifier::{EntityIdentity, Identifier};
pub use registry::Registry;
pub use snapshot::SnapshotMaker;
pub use unit_of_work::{CommitReport, EntityStatus, UnitOfWork};

pub use unitwork_model::*;
