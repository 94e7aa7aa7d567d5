//! Entity model for unitwork.
//!
//! Defines the types every other unitwork component depends on:
//! - [`Entity`]: capability trait for reading and writing named properties
//! - [`Value`] / [`State`]: live property values and their frozen copies
//! - [`Snapshot`]: frozen observed state of one entity instance
//! - [`ChangeSet`]: ordered per-property differences between two states
//! - [`Definition`]: identity property, observed properties and handlers of one entity type
//! - [`DefinitionRepository`]: shared lookup of definitions by entity type
//!
//! Persistence handlers implement [`NewCommandHandler`], [`EditCommandHandler`]
//! and [`RemoveCommandHandler`]; the engine in the `unitwork` crate calls them.

mod change;
mod definition;
mod entity;
mod error;
mod handler;
mod repository;
mod state;
mod value;

pub use change::{Change, ChangeSet, ScalarChange};
pub use definition::{Definition, EntityType, Property};
pub use entity::{DynamicEntity, Entity, EntityHandle, EntityKey, EntityRef, share};
pub use error::{ModelError, ModelResult};
pub use handler::{EditCommandHandler, NewCommandHandler, RemoveCommandHandler};
pub use repository::{DefinitionRepository, InMemoryDefinitions};
pub use state::{Snapshot, State};
pub use value::Value;
