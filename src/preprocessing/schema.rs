//! Column schema of a detection export

use crate::error::{RecalibratorError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Names of the columns the pipeline reads and the one it appends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Detected object class name (categorical)
    pub class_name: String,
    /// Numeric class id emitted by the detector
    pub class_id: String,
    /// Original detection confidence, the regression target
    pub score: String,
    /// Column appended with the recalibrated confidence
    pub output: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            class_name: "class_name".to_string(),
            class_id: "class_id".to_string(),
            score: "score".to_string(),
            output: "adjusted_confidence".to_string(),
        }
    }
}

impl ColumnSchema {
    /// Create a schema with the default column names
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = name.into();
        self
    }

    pub fn with_class_id(mut self, name: impl Into<String>) -> Self {
        self.class_id = name.into();
        self
    }

    pub fn with_score(mut self, name: impl Into<String>) -> Self {
        self.score = name.into();
        self
    }

    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.output = name.into();
        self
    }

    /// Input columns that must be present, in reporting order
    pub fn required_inputs(&self) -> [&str; 3] {
        [self.class_name.as_str(), self.class_id.as_str(), self.score.as_str()]
    }

    /// Check that every input column exists and the output column does not.
    ///
    /// All missing inputs are reported together.
    pub fn validate(&self, df: &DataFrame) -> Result<()> {
        let missing: Vec<String> = self
            .required_inputs()
            .iter()
            .filter(|name| df.column(name).is_err())
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(RecalibratorError::MissingColumnError(missing));
        }

        if df.column(&self.output).is_ok() {
            return Err(RecalibratorError::ColumnConflictError(self.output.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detections() -> DataFrame {
        df!(
            "class_name" => &["car", "person"],
            "class_id" => &[2i64, 0],
            "score" => &[0.9, 0.4]
        )
        .unwrap()
    }

    #[test]
    fn test_valid_frame_passes() {
        ColumnSchema::default().validate(&detections()).unwrap();
    }

    #[test]
    fn test_missing_columns_are_named() {
        let df = detections().drop("score").unwrap();
        let err = ColumnSchema::default().validate(&df).unwrap_err();
        match err {
            RecalibratorError::MissingColumnError(cols) => assert_eq!(cols, vec!["score"]),
            other => panic!("unexpected error: {other}"),
        }

        let schema = ColumnSchema::new()
            .with_class_name("agrim_name")
            .with_class_id("agrim_class_id");
        let err = schema.validate(&detections()).unwrap_err();
        match err {
            RecalibratorError::MissingColumnError(cols) => {
                assert_eq!(cols, vec!["agrim_name", "agrim_class_id"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_existing_output_column_conflicts() {
        let schema = ColumnSchema::new().with_output("score");
        let err = schema.validate(&detections()).unwrap_err();
        assert!(matches!(err, RecalibratorError::ColumnConflictError(name) if name == "score"));
    }
}
