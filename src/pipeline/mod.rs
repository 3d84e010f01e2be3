//! End-to-end recalibration run
//!
//! resolve input → load → build features → train/evaluate → re-score → write.
//! Every stage runs once, in order, and the first failure aborts the run.

use crate::error::{RecalibratorError, Result};
use crate::inference::Scorer;
use crate::preprocessing::{ColumnSchema, FeatureBuilder, FEATURE_NAMES};
use crate::training::{ModelMetrics, TrainEngine, TrainingConfig};
use crate::utils::data_loader::{DataLoader, DataSaver};
use crate::utils::paths::{ensure_parent_dir, resolve_input, resolve_output};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything one run needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Dataset file, or a directory holding it
    pub input_path: PathBuf,
    /// Output file, or a directory to place the default file in
    pub output_path: PathBuf,
    pub schema: ColumnSchema,
    pub training: TrainingConfig,
    /// Optional JSON file receiving the run report
    pub metrics_path: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            schema: ColumnSchema::default(),
            training: TrainingConfig::default(),
            metrics_path: None,
        }
    }

    pub fn with_schema(mut self, schema: ColumnSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    pub fn with_metrics_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }
}

/// What a successful run did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Input location as given
    pub input_path: PathBuf,
    /// Input file actually read
    pub resolved_input: PathBuf,
    /// Output file actually written
    pub output_path: PathBuf,
    /// Shape of the loaded dataset (rows, columns)
    pub shape: (usize, usize),
    /// Column names of the loaded dataset
    pub columns: Vec<String>,
    /// Class labels in code order
    pub classes: Vec<String>,
    /// Held-out evaluation
    pub metrics: ModelMetrics,
    /// Forest feature importances by feature name
    pub feature_importances: Vec<(String, f64)>,
}

/// Run the whole pipeline and return the report, including the output path.
///
/// The output file is only created once the augmented dataset is complete,
/// so any earlier failure leaves the output location untouched.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let resolved_input = resolve_input(&config.input_path)?;
    info!(input = %resolved_input.display(), "Resolved input CSV");

    let df = DataLoader::new().load_csv(&resolved_input)?;
    let columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    info!(rows = df.height(), cols = df.width(), "Loaded dataset");

    let builder = FeatureBuilder::new(config.schema.clone());
    let (features, encoder) = builder.fit(&df)?;

    let mut engine = TrainEngine::new(config.training.clone());
    engine.fit(&features)?;
    let model = engine.model().ok_or(RecalibratorError::ModelNotFitted)?;
    let metrics = engine
        .metrics()
        .cloned()
        .ok_or(RecalibratorError::ModelNotFitted)?;

    let mut augmented = Scorer::new(model, &encoder, &builder).score(&df)?;

    let output_path = resolve_output(&config.output_path);
    ensure_parent_dir(&output_path)?;
    DataSaver::save_csv(&mut augmented, &output_path)?;
    info!(output = %output_path.display(), rows = augmented.height(), "Saved adjusted CSV");

    let feature_importances = engine
        .feature_importances()
        .map(|imp| {
            FEATURE_NAMES
                .iter()
                .zip(imp.iter())
                .map(|(name, &value)| (name.to_string(), value))
                .collect()
        })
        .unwrap_or_default();

    let report = PipelineReport {
        input_path: config.input_path.clone(),
        resolved_input,
        output_path,
        shape: (df.height(), df.width()),
        columns,
        classes: encoder.classes().to_vec(),
        metrics,
        feature_importances,
    };

    if let Some(path) = &config.metrics_path {
        write_report(&report, path)?;
    }

    Ok(report)
}

/// Serialize a run report as pretty JSON
pub fn write_report(report: &PipelineReport, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|e| RecalibratorError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| RecalibratorError::write(path, e))?;
    writer.flush().map_err(|e| RecalibratorError::write(path, e))
}
