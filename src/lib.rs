//! Detection confidence recalibration
//!
//! Reads a CSV of object-detection results, fits a Random Forest that predicts
//! the detection score from the class id and an encoding of the class name,
//! reports held-out error, and writes the dataset back with an
//! `adjusted_confidence` column.
//!
//! # Modules
//!
//! - [`utils`] - Path resolution, CSV loading and saving
//! - [`preprocessing`] - Column schema, class-name encoding, feature matrix
//! - [`training`] - Train/test split, regression trees, Random Forest, metrics
//! - [`inference`] - Re-scoring of the full dataset
//! - [`pipeline`] - The `run` entry point tying the stages together
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Stages
pub mod utils;
pub mod preprocessing;
pub mod training;
pub mod inference;

// Orchestration
pub mod pipeline;
pub mod cli;

pub use error::{RecalibratorError, Result};
pub use pipeline::{run, PipelineConfig, PipelineReport};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{RecalibratorError, Result};
    pub use crate::inference::Scorer;
    pub use crate::pipeline::{run, PipelineConfig, PipelineReport};
    pub use crate::preprocessing::{ClassEncoder, ColumnSchema, FeatureBuilder, FeatureSet};
    pub use crate::training::{ModelMetrics, RandomForest, TrainEngine, TrainingConfig};
    pub use crate::utils::{DataLoader, DataSaver};
}
