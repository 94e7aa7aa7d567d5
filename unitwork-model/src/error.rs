//! Error types for the entity model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while describing or accessing entities.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No definition is registered for the entity type.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    /// A property was listed twice in a definition's observed set.
    #[error("property `{property}` is observed more than once on {entity_type}")]
    DuplicateProperty {
        entity_type: String,
        property: String,
    },

    /// The entity has no property with the given name.
    #[error("{entity_type} has no property `{property}`")]
    UnknownProperty {
        entity_type: String,
        property: String,
    },

    /// A value of the wrong shape was written to a property.
    #[error("property `{property}` expects {expected}, got {actual}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        actual: &'static str,
    },
}
