//! Error types for the sweep inference engine.

use thiserror::Error;

use crate::cell::Cell;

/// A specialized `Result` type for inference engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can occur while ingesting observations and propagating knowledge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The accumulated facts cannot all be true. Fatal for the game run.
    #[error("Contradiction: {0}")]
    Contradiction(String),

    /// A cell outside the configured grid was passed in.
    #[error("Cell {cell} is outside the {height}x{width} grid")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },

    /// The cell was already probed and its count already ingested.
    #[error("Cell {0} has already been observed")]
    AlreadyObserved(Cell),

    /// The engine configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Propagation did not settle within the configured number of passes.
    #[error("Max propagation passes exceeded: {passes}")]
    MaxPassesExceeded { passes: usize },

    /// A previous fatal error stopped the engine; it no longer accepts facts.
    #[error("Engine halted: {0}")]
    Halted(String),

    /// An error occurred during data serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Returns `true` for errors after which the knowledge base can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Contradiction(_) | Error::MaxPassesExceeded { .. } | Error::Halted(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidConfig("zero width".to_string());
        assert!(err.to_string().contains("zero width"));
    }

    #[test]
    fn test_contradiction_error() {
        let err = Error::Contradiction("{(0, 1)} = 2".to_string());
        assert!(err.to_string().contains("{(0, 1)} = 2"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = Error::OutOfBounds {
            cell: Cell::new(3, 0),
            height: 3,
            width: 3,
        };
        assert_eq!(err.to_string(), "Cell (3, 0) is outside the 3x3 grid");
        assert!(!err.is_fatal());
    }
}
