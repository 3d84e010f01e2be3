//! Label encoding of the class-name column

use crate::error::{RecalibratorError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Maps each distinct class name to an integer in `0..n_classes`.
///
/// Codes follow the sorted order of the labels, so the same set of names
/// always yields the same codes. Numeric label columns sort by value. An encoder is fitted once per dataset and
/// then reused for every transform of that dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEncoder {
    column: String,
    classes: Vec<String>,
    mapping: HashMap<String, usize>,
}

impl ClassEncoder {
    /// Fit the encoder on the labels of `column`
    pub fn fit(df: &DataFrame, column: &str) -> Result<Self> {
        let labels = label_values(df, column)?;
        let mut classes: Vec<String> = labels
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        if is_numeric(df, column) {
            classes.sort_by(|a, b| numeric_key(a).total_cmp(&numeric_key(b)));
        }

        let mapping = classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code))
            .collect();

        Ok(Self {
            column: column.to_string(),
            classes,
            mapping,
        })
    }

    /// Encode every row of the fitted column in `df`
    pub fn transform(&self, df: &DataFrame) -> Result<Vec<usize>> {
        label_values(df, &self.column)?
            .iter()
            .map(|label| {
                self.encode(label).ok_or_else(|| RecalibratorError::UnknownCategory {
                    column: self.column.clone(),
                    value: label.clone(),
                })
            })
            .collect()
    }

    /// Code of a single label, if it was seen during fitting
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.mapping.get(label).copied()
    }

    /// Label behind a code
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Fitted labels, ordered by code
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Name of the column this encoder was fitted on
    pub fn column(&self) -> &str {
        &self.column
    }
}

fn is_numeric(df: &DataFrame, column: &str) -> bool {
    df.column(column).is_ok_and(|c| {
        matches!(
            c.dtype(),
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Float32
                | DataType::Float64
        )
    })
}

fn numeric_key(label: &str) -> f64 {
    label.parse().unwrap_or(f64::INFINITY)
}

/// Read a column as strings, casting numeric labels. Nulls are rejected.
fn label_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let series = df
        .column(column)
        .map_err(|_| RecalibratorError::MissingColumnError(vec![column.to_string()]))?
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| RecalibratorError::TrainingError(format!("column `{column}`: {e}")))?;

    let ca = series
        .str()
        .map_err(|e| RecalibratorError::TrainingError(format!("column `{column}`: {e}")))?;

    if ca.null_count() > 0 {
        return Err(RecalibratorError::TrainingError(format!(
            "column `{column}` has {} null value(s)",
            ca.null_count()
        )));
    }

    Ok(ca.into_iter().flatten().map(str::to_string).collect())
}
