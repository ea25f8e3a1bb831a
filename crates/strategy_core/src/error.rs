//! Error types for the strategy simulation core.

use thiserror::Error;

use crate::components::EntityId;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for all simulation core errors.
///
/// Resource shortfalls are never reported through this type: a
/// [`crate::resources::ResourceContainer::take`] that falls short simply
/// returns the smaller amount.
#[derive(Debug, Error)]
pub enum SimError {
    /// A progress tracker was created with a total that is not positive.
    #[error("Invalid progress total: {0} (must be positive)")]
    InvalidTotal(f32),

    /// Static configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Game data file parsing error.
    #[error("Failed to parse game data: {message}")]
    DataParse {
        /// Error message from the parser.
        message: String,
    },

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A structure, unit or technology type is not defined in the game data.
    #[error("Unknown definition: {0}")]
    UnknownDefinition(String),

    /// Technology cannot be researched right now.
    #[error("Research not possible for '{technology}': {reason}")]
    ResearchUnavailable {
        /// Technology identifier.
        technology: String,
        /// Why research was refused.
        reason: String,
    },

    /// The stage cannot pay the full cost of an action.
    #[error("Insufficient resources for {0}")]
    InsufficientResources(String),

    /// A build queue has reached its maximum length.
    #[error("Build queue of entity {0} is full")]
    QueueFull(EntityId),

    /// Invalid simulation state for the requested action.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Save or restore of stage state failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
