//! Feature matrix construction

use super::encoder::ClassEncoder;
use super::schema::ColumnSchema;
use crate::error::{RecalibratorError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::debug;

/// Column names of the feature matrix, in column order
pub const FEATURE_NAMES: [&str; 2] = ["class_id", "class_encoded"];

/// Feature matrix and regression target built from one dataset
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl FeatureSet {
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }
}

/// Builds `[class_id, class_encoded]` rows and the score target.
pub struct FeatureBuilder {
    schema: ColumnSchema,
}

impl FeatureBuilder {
    pub fn new(schema: ColumnSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Validate the schema, fit the class encoding and build features and target.
    ///
    /// The returned encoder must be passed to [`FeatureBuilder::transform`]
    /// whenever the same dataset is scored again.
    pub fn fit(&self, df: &DataFrame) -> Result<(FeatureSet, ClassEncoder)> {
        self.schema.validate(df)?;

        let encoder = ClassEncoder::fit(df, &self.schema.class_name)?;
        let x = self.transform(df, &encoder)?;
        let y = Array1::from_vec(numeric_values(df, &self.schema.score)?);

        debug!(
            rows = x.nrows(),
            classes = encoder.n_classes(),
            "Built feature matrix"
        );

        Ok((FeatureSet { x, y }, encoder))
    }

    /// Feature matrix for `df` using an already fitted encoder
    pub fn transform(&self, df: &DataFrame, encoder: &ClassEncoder) -> Result<Array2<f64>> {
        let class_ids = numeric_values(df, &self.schema.class_id)?;
        let codes = encoder.transform(df)?;

        if class_ids.len() != codes.len() {
            return Err(RecalibratorError::ShapeError {
                expected: format!("{} encoded rows", class_ids.len()),
                actual: format!("{} encoded rows", codes.len()),
            });
        }

        Ok(Array2::from_shape_fn((codes.len(), FEATURE_NAMES.len()), |(r, c)| {
            match c {
                0 => class_ids[r],
                _ => codes[r] as f64,
            }
        }))
    }
}

/// Read a column as `f64`. Nulls, values that do not parse as numbers and
/// non-finite values are rejected.
fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let series = df
        .column(column)
        .map_err(|_| RecalibratorError::MissingColumnError(vec![column.to_string()]))?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| RecalibratorError::TrainingError(format!("column `{column}`: {e}")))?;

    let ca = series
        .f64()
        .map_err(|e| RecalibratorError::TrainingError(format!("column `{column}`: {e}")))?;

    if ca.null_count() > 0 {
        return Err(RecalibratorError::TrainingError(format!(
            "column `{column}` has {} null or non-numeric value(s)",
            ca.null_count()
        )));
    }

    let values: Vec<f64> = ca.into_iter().flatten().collect();
    let non_finite = values.iter().filter(|v| !v.is_finite()).count();
    if non_finite > 0 {
        return Err(RecalibratorError::TrainingError(format!(
            "column `{column}` has {non_finite} non-finite value(s)"
        )));
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn detections() -> DataFrame {
        df!(
            "class_name" => &["person", "car", "person", "dog"],
            "class_id" => &[0i64, 2, 0, 16],
            "score" => &[0.81, 0.66, 0.47, 0.92],
            "frame" => &[1i64, 1, 2, 3]
        )
        .unwrap()
    }

    #[test]
    fn test_fit_builds_features_and_target() {
        let builder = FeatureBuilder::new(ColumnSchema::default());
        let (features, encoder) = builder.fit(&detections()).unwrap();

        assert_eq!(encoder.classes(), &["car", "dog", "person"]);
        assert_eq!(
            features.x,
            array![[0.0, 2.0], [2.0, 0.0], [0.0, 2.0], [16.0, 1.0]]
        );
        assert_eq!(features.y, array![0.81, 0.66, 0.47, 0.92]);
        assert_eq!(features.n_samples(), 4);
    }

    #[test]
    fn test_transform_reuses_encoder() {
        let builder = FeatureBuilder::new(ColumnSchema::default());
        let df = detections();
        let (features, encoder) = builder.fit(&df).unwrap();

        assert_eq!(builder.transform(&df, &encoder).unwrap(), features.x);
    }

    #[test]
    fn test_missing_column_stops_before_encoding() {
        let df = detections().drop("class_id").unwrap();
        let err = FeatureBuilder::new(ColumnSchema::default()).fit(&df).unwrap_err();
        match err {
            RecalibratorError::MissingColumnError(cols) => assert_eq!(cols, vec!["class_id"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_score_is_rejected() {
        let df = df!(
            "class_name" => &["car", "car"],
            "class_id" => &[2i64, 2],
            "score" => &[Some(0.5), None]
        )
        .unwrap();
        let err = FeatureBuilder::new(ColumnSchema::default()).fit(&df).unwrap_err();
        assert!(matches!(err, RecalibratorError::TrainingError(msg) if msg.contains("score")));
    }

    #[test]
    fn test_non_finite_score_is_rejected() {
        for bad in [f64::NAN, f64::INFINITY] {
            let df = df!(
                "class_name" => &["car", "person", "car"],
                "class_id" => &[2i64, 0, 2],
                "score" => &[0.5, bad, 0.7]
            )
            .unwrap();
            let err = FeatureBuilder::new(ColumnSchema::default()).fit(&df).unwrap_err();
            assert!(
                matches!(&err, RecalibratorError::TrainingError(msg)
                    if msg == "column `score` has 1 non-finite value(s)"),
                "unexpected error: {err}"
            );
        }
    }
}
