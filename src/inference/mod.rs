//! Re-scoring of the full dataset
//!
//! Training rows are scored too, so their adjusted values are optimistic;
//! the held-out metrics are the ones to trust.

use crate::error::{RecalibratorError, Result};
use crate::preprocessing::{ClassEncoder, FeatureBuilder};
use crate::training::RandomForest;
use polars::prelude::*;
use tracing::debug;

/// Applies a fitted forest to every row of a dataset.
///
/// The scorer never refits: it borrows the model and the class encoding
/// produced for the same dataset.
pub struct Scorer<'a> {
    model: &'a RandomForest,
    encoder: &'a ClassEncoder,
    builder: &'a FeatureBuilder,
}

impl<'a> Scorer<'a> {
    pub fn new(
        model: &'a RandomForest,
        encoder: &'a ClassEncoder,
        builder: &'a FeatureBuilder,
    ) -> Self {
        Self {
            model,
            encoder,
            builder,
        }
    }

    /// One prediction per row of `df`, in row order
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<f64>> {
        let x = self.builder.transform(df, self.encoder)?;
        Ok(self.model.predict(&x)?.to_vec())
    }

    /// Copy of `df` with the prediction column appended after the original columns
    pub fn score(&self, df: &DataFrame) -> Result<DataFrame> {
        let output = &self.builder.schema().output;
        if df.column(output).is_ok() {
            return Err(RecalibratorError::ColumnConflictError(output.clone()));
        }

        let predictions = self.predict(df)?;
        let mut augmented = df.clone();
        augmented
            .with_column(Series::new(output.as_str().into(), predictions))
            .map_err(|e| RecalibratorError::ShapeError {
                expected: format!("{} rows", df.height()),
                actual: e.to_string(),
            })?;

        debug!(rows = augmented.height(), column = %output, "Appended adjusted confidence");
        Ok(augmented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::ColumnSchema;

    fn detections() -> DataFrame {
        df!(
            "class_name" => &["car", "person", "car", "dog", "person", "car"],
            "class_id" => &[2i64, 0, 2, 16, 0, 2],
            "score" => &[0.9, 0.4, 0.8, 0.6, 0.5, 0.85],
            "image" => &["a.jpg", "a.jpg", "b.jpg", "c.jpg", "c.jpg", "d.jpg"]
        )
        .unwrap()
    }

    #[test]
    fn test_score_appends_one_column() {
        let df = detections();
        let builder = FeatureBuilder::new(ColumnSchema::default());
        let (features, encoder) = builder.fit(&df).unwrap();
        let mut model = RandomForest::new(20).with_random_state(1);
        model.fit(&features.x, &features.y).unwrap();

        let augmented = Scorer::new(&model, &encoder, &builder).score(&df).unwrap();

        assert_eq!(augmented.height(), df.height());
        assert_eq!(augmented.width(), df.width() + 1);

        let names: Vec<String> = augmented
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["class_name", "class_id", "score", "image", "adjusted_confidence"]
        );
        assert!(augmented
            .column("image")
            .unwrap()
            .as_materialized_series()
            .equals(df.column("image").unwrap().as_materialized_series()));

        let adjusted = augmented
            .column("adjusted_confidence")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect::<Vec<_>>();
        assert!(adjusted.iter().all(|v| (0.4..=0.9).contains(v)));
    }

    #[test]
    fn test_unfitted_model() {
        let df = detections();
        let builder = FeatureBuilder::new(ColumnSchema::default());
        let (_, encoder) = builder.fit(&df).unwrap();
        let model = RandomForest::new(5);

        let err = Scorer::new(&model, &encoder, &builder).score(&df).unwrap_err();
        assert!(matches!(err, RecalibratorError::ModelNotFitted));
    }
}
