//! Training engine: split, fit and held-out evaluation

use super::metrics::ModelMetrics;
use super::random_forest::RandomForest;
use super::split::TrainTestSplit;
use super::TrainingConfig;
use crate::error::{RecalibratorError, Result};
use crate::preprocessing::FeatureSet;
use ndarray::{Array1, Array2};
use std::time::Instant;
use tracing::{info, warn};

/// Main training engine
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
    model: Option<RandomForest>,
    metrics: Option<ModelMetrics>,
    split: Option<TrainTestSplit>,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            model: None,
            metrics: None,
            split: None,
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Split the features, fit the forest on the training part and score the held-out part.
    ///
    /// Held-out metrics are informational; a poor score does not fail the fit.
    pub fn fit(&mut self, features: &FeatureSet) -> Result<&mut Self> {
        let start = Instant::now();

        let split = TrainTestSplit::new(
            features.n_samples(),
            self.config.test_size,
            self.config.random_state,
        )?;
        if split.n_train() < 2 {
            return Err(RecalibratorError::TrainingError(format!(
                "need at least 2 training rows after the split, got {}",
                split.n_train()
            )));
        }

        let (x_train, x_test, y_train, y_test) = split.apply(&features.x, &features.y);

        let mut model = RandomForest::new(self.config.n_estimators)
            .with_max_depth(self.config.max_depth)
            .with_min_samples_split(self.config.min_samples_split)
            .with_min_samples_leaf(self.config.min_samples_leaf)
            .with_random_state(self.config.random_state)
            .with_oob_score(self.config.oob_score);
        model.fit(&x_train, &y_train)?;

        let y_pred = model.predict(&x_test)?;
        let mut metrics = ModelMetrics::compute_regression(&y_test, &y_pred);
        metrics.oob_score = model.oob_score_value();
        metrics.training_time_secs = start.elapsed().as_secs_f64();
        metrics.n_features = features.x.ncols();
        metrics.n_train = split.n_train();

        if metrics.r2.is_nan() {
            warn!(n_test = metrics.n_test, "R² is undefined for fewer than two held-out rows");
        }
        info!(
            n_train = metrics.n_train,
            n_test = metrics.n_test,
            mse = metrics.mse,
            r2 = metrics.r2,
            oob_score = ?metrics.oob_score,
            "Trained random forest"
        );

        self.model = Some(model);
        self.metrics = Some(metrics);
        self.split = Some(split);
        Ok(self)
    }

    /// Predict with the fitted forest
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.model
            .as_ref()
            .ok_or(RecalibratorError::ModelNotFitted)?
            .predict(x)
    }

    /// Held-out metrics of the last fit
    pub fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }

    /// The fitted forest
    pub fn model(&self) -> Option<&RandomForest> {
        self.model.as_ref()
    }

    /// Partition used by the last fit
    pub fn split(&self) -> Option<&TrainTestSplit> {
        self.split.as_ref()
    }

    /// Normalised impurity-based importances of the fitted forest
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.model.as_ref().and_then(|m| m.feature_importances())
    }
}
