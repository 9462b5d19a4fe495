//! Error types for the scenario engine
//!
//! Structural misses are reported explicitly as `NotFound`/`ParentNotFound`
//! so callers can tell "nothing happened" from "succeeded".

use netsim_model::{Level, ModelError, NodeKind};

use crate::validate::ValidationError;

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No node with this id or name
    #[error("element not found: {0}")]
    NotFound(String),

    /// Parent named by an element does not exist
    #[error("parent not found: {0}")]
    ParentNotFound(String),

    /// Parent exists but cannot own this kind
    #[error("{kind} cannot be placed under '{parent}'")]
    InvalidParent { kind: NodeKind, parent: String },

    /// A stated parent sits at or below the new node's level
    #[error("cannot attach a {level:?} below '{parent}'")]
    NoAttachPoint { level: Level, parent: String },

    /// Element has no usable type
    #[error("element type is missing or unknown: '{0}'")]
    UnknownType(String),

    /// Field name not recognised
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Element type does not match the node it targets
    #[error("type mismatch for '{name}': node is {actual}, element is {requested}")]
    TypeMismatch {
        name: String,
        actual: NodeKind,
        requested: NodeKind,
    },

    /// Implicit nodes, the public domain and the root cannot be edited directly
    #[error("'{0}' is not directly editable")]
    NotEditable(String),

    /// Two nodes share an id
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// Two nodes share a name
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// Random ids kept colliding
    #[error("could not generate a unique id after {0} attempts")]
    IdExhausted(usize),

    /// Commit rejected by the validator
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Model-level failure
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Engine configuration could not be parsed
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

impl EngineError {
    /// Whether this is a structural miss
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::ParentNotFound(_))
    }
}
