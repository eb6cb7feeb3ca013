//! Error types for geometry operations.

use thiserror::Error;

/// Error raised while parsing SVG-style path data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathDataError {
    #[error("Unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },

    #[error("Expected a number at offset {0}")]
    ExpectedNumber(usize),

    #[error("Unknown command '{0}'")]
    UnknownCommand(char),

    #[error("Command '{0}' is not preceded by a move")]
    MissingMoveTo(char),
}

/// Error type for geometry operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeomError {
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Path data error: {0}")]
    PathData(#[from] PathDataError),

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result type for geometry operations.
pub type GeomResult<T> = Result<T, GeomError>;
