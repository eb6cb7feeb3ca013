//! Scene error types

use quill_geom::GeomError;
use uuid::Uuid;

/// Scene-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneError {
    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),
    #[error("Moving {0} there would create a cycle")]
    WouldCreateCycle(Uuid),
    #[error("Item cannot hold children: {0}")]
    NotAContainer(Uuid),
    #[error("Item has no path geometry: {0}")]
    NotAPath(Uuid),
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeomError),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
