//! Error types for Regression Studio

use serde::Serialize;
use thiserror::Error;

/// Result type alias for studio operations
pub type Result<T> = std::result::Result<T, StudioError>;

/// Taxonomy tag carried by every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Upload could not be decoded or parsed
    IngestParse,
    /// Something the operation needs has not been provided yet
    StateMissing,
    /// Prediction token count differs from the feature count
    SelectionMismatch,
    /// Column names that do not fit the dataset or the trained model
    InvalidSelection,
    /// Failure inside the numeric / model layer
    Computation,
}

/// What is missing when an operation is attempted too early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingState {
    Dataset,
    Target,
    Features,
    Model,
    Input,
}

impl std::fmt::Display for MissingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            MissingState::Dataset => "No data uploaded. Please upload a dataset.",
            MissingState::Target => "No target variable selected.",
            MissingState::Features => "No features selected for training.",
            MissingState::Model => "No trained model. Please train a model first.",
            MissingState::Input => "Please enter feature values and select features before predicting.",
        };
        f.write_str(msg)
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Error reading file: {0}")]
    IngestParse(String),

    #[error("Error: {0}")]
    StateMissing(MissingState),

    #[error("Error: Expected {expected} features, but got {actual}.")]
    SelectionMismatch { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StudioError {
    /// Taxonomy tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StudioError::IngestParse(_) => ErrorKind::IngestParse,
            StudioError::StateMissing(_) => ErrorKind::StateMissing,
            StudioError::SelectionMismatch { .. } => ErrorKind::SelectionMismatch,
            StudioError::ColumnNotFound(_) | StudioError::InvalidSelection(_) => {
                ErrorKind::InvalidSelection
            }
            StudioError::Computation(_)
            | StudioError::ModelNotFitted
            | StudioError::Io(_)
            | StudioError::Serialization(_) => ErrorKind::Computation,
        }
    }
}

impl From<polars::error::PolarsError> for StudioError {
    fn from(err: polars::error::PolarsError) -> Self {
        StudioError::Computation(err.to_string())
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        StudioError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for StudioError {
    fn from(err: ndarray::ShapeError) -> Self {
        StudioError::Computation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StudioError::SelectionMismatch { expected: 3, actual: 2 };
        assert_eq!(err.to_string(), "Error: Expected 3 features, but got 2.");

        let err = StudioError::StateMissing(MissingState::Target);
        assert_eq!(err.to_string(), "Error: No target variable selected.");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(StudioError::ColumnNotFound("x".into()).kind(), ErrorKind::InvalidSelection);
        assert_eq!(StudioError::ModelNotFitted.kind(), ErrorKind::Computation);
        assert_eq!(StudioError::IngestParse("bad".into()).kind(), ErrorKind::IngestParse);
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StudioError = io_err.into();
        assert!(matches!(err, StudioError::Io(_)));
    }
}
