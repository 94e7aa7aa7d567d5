//! Error types for the unit-of-work engine.

use crate::CommandKind;
use thiserror::Error;
use unitwork_model::{EntityKey, ModelError};

/// Result type for engine operations.
pub type UowResult<T> = Result<T, UowError>;

/// Errors raised by the unit-of-work engine.
///
/// Nothing here is retried internally; every error reaches the caller of the
/// operation that hit it.
#[derive(Debug, Error)]
pub enum UowError {
    /// A command was built from something that is not an entity.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No definition is registered for the entity's type.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    /// The entity was never registered with the unit of work.
    #[error("entity {0} is not registered")]
    UntrackedEntity(EntityKey),

    /// The registry holds no snapshot for the entity.
    #[error("no snapshot stored for entity {0}")]
    NotFound(EntityKey),

    /// Strict dispatch found no handler for the command.
    #[error("no {kind} handler defined for {entity_type}")]
    MissingHandler {
        entity_type: String,
        kind: CommandKind,
    },

    /// Snapshotting nested entities went deeper than allowed.
    #[error("snapshot depth exceeds {max_depth} levels at {entity_type}")]
    DepthExceeded {
        entity_type: String,
        max_depth: usize,
    },

    /// The entity is borrowed elsewhere while the engine needs it.
    #[error("entity {0} is already borrowed")]
    EntityBusy(EntityKey),

    /// Reading or writing an entity property failed.
    #[error(transparent)]
    Model(ModelError),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A persistence handler failed.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl From<ModelError> for UowError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnknownEntityType(entity_type) => Self::UnknownEntityType(entity_type),
            other => Self::Model(other),
        }
    }
}
