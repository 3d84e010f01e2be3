//! Error types for the recalibration pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for recalibrator operations
pub type Result<T> = std::result::Result<T, RecalibratorError>;

/// Main error type for the recalibrator
#[derive(Error, Debug)]
pub enum RecalibratorError {
    #[error("No `{suffix}` file found in {}", .dir.display())]
    MissingInputError { dir: PathBuf, suffix: String },

    #[error("Failed to load {}: {reason}", .path.display())]
    LoadError { path: PathBuf, reason: String },

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumnError(Vec<String>),

    #[error("Output column `{0}` already exists in the input dataset")]
    ColumnConflictError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Unknown category `{value}` in column `{column}`")]
    UnknownCategory { column: String, value: String },

    #[error("Failed to write {}: {reason}", .path.display())]
    WriteError { path: PathBuf, reason: String },
}

impl RecalibratorError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        RecalibratorError::LoadError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        RecalibratorError::WriteError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecalibratorError::TrainingError("test error".to_string());
        assert_eq!(err.to_string(), "Training error: test error");
    }

    #[test]
    fn test_missing_column_lists_every_name() {
        let err = RecalibratorError::MissingColumnError(vec![
            "class_id".to_string(),
            "score".to_string(),
        ]);
        assert_eq!(err.to_string(), "Missing required column(s): class_id, score");
    }

    #[test]
    fn test_path_errors_name_the_path() {
        let err = RecalibratorError::load("/data/in.csv", "empty CSV");
        assert!(err.to_string().contains("/data/in.csv"));
        assert!(err.to_string().contains("empty CSV"));

        let err = RecalibratorError::MissingInputError {
            dir: PathBuf::from("/mnt/inputs"),
            suffix: ".csv".to_string(),
        };
        assert_eq!(err.to_string(), "No `.csv` file found in /mnt/inputs");
    }
}
