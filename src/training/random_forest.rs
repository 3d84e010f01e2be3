//! Random Forest regressor

use super::decision_tree::DecisionTree;
use super::metrics::r2_score;
use crate::error::{RecalibratorError, Result};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Bagged ensemble of regression trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Out-of-bag score
    pub oob_score: bool,
    /// Random state
    pub random_state: Option<u64>,
    oob_score_value: Option<f64>,
    oob_prediction: Option<Array1<f64>>,
    feature_importances: Option<Array1<f64>>,
    n_features: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create a new regressor forest
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            oob_score: false,
            random_state: None,
            oob_score_value: None,
            oob_prediction: None,
            feature_importances: None,
            n_features: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Enable or disable bootstrap sampling
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Enable OOB score computation
    pub fn with_oob_score(mut self, oob_score: bool) -> Self {
        self.oob_score = oob_score;
        self
    }

    /// Fit the forest to training data.
    ///
    /// Tree `i` draws its bootstrap sample from a `ChaCha8Rng` seeded with
    /// `random_state + i`, so a fixed seed reproduces the forest exactly.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(RecalibratorError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if self.n_estimators == 0 {
            return Err(RecalibratorError::TrainingError(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if n_samples < 2 {
            return Err(RecalibratorError::TrainingError(format!(
                "need at least 2 training samples, got {}",
                n_samples
            )));
        }
        if self.oob_score && !self.bootstrap {
            return Err(RecalibratorError::TrainingError(
                "out-of-bag estimation requires bootstrap sampling".to_string(),
            ));
        }
        if let Some(pos) = y.iter().position(|v| !v.is_finite()) {
            return Err(RecalibratorError::TrainingError(format!(
                "target value at training row {} is not finite",
                pos
            )));
        }

        self.n_features = x.ncols();
        let base_seed = self.random_state.unwrap_or(42);

        let mut trees = Vec::with_capacity(self.n_estimators);
        let mut oob_sum = vec![0.0; n_samples];
        let mut oob_count = vec![0usize; n_samples];

        for tree_idx in 0..self.n_estimators {
            let seed = base_seed.wrapping_add(tree_idx as u64);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let sample_indices: Vec<usize> = if self.bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };

            let mut tree = DecisionTree::new()
                .with_max_depth(self.max_depth)
                .with_min_samples_split(self.min_samples_split)
                .with_min_samples_leaf(self.min_samples_leaf);
            tree.fit_indices(x, y, &sample_indices)?;

            if self.oob_score {
                let mut in_bag = vec![false; n_samples];
                for &i in &sample_indices {
                    in_bag[i] = true;
                }
                for (i, row) in x.rows().into_iter().enumerate() {
                    if !in_bag[i] {
                        oob_sum[i] += tree.predict_one(row)?;
                        oob_count[i] += 1;
                    }
                }
            }

            trees.push(tree);
        }

        self.trees = trees;
        self.compute_feature_importances();

        if self.oob_score {
            self.compute_oob_score(y, &oob_sum, &oob_count);
        }

        debug!(
            trees = self.trees.len(),
            samples = n_samples,
            oob_score = ?self.oob_score_value,
            "Fitted random forest"
        );

        Ok(self)
    }

    fn compute_oob_score(&mut self, y: &Array1<f64>, oob_sum: &[f64], oob_count: &[usize]) {
        let covered: Vec<usize> = (0..y.len()).filter(|&i| oob_count[i] > 0).collect();

        if covered.len() < y.len() {
            warn!(
                uncovered = y.len() - covered.len(),
                "Some samples were never left out of a bootstrap sample; OOB estimate uses the rest"
            );
        }

        let prediction: Array1<f64> = (0..y.len())
            .map(|i| {
                if oob_count[i] > 0 {
                    oob_sum[i] / oob_count[i] as f64
                } else {
                    f64::NAN
                }
            })
            .collect();

        let y_cov: Array1<f64> = covered.iter().map(|&i| y[i]).collect();
        let p_cov: Array1<f64> = covered.iter().map(|&i| prediction[i]).collect();
        let score = r2_score(&y_cov, &p_cov);

        self.oob_score_value = if score.is_nan() { None } else { Some(score) };
        self.oob_prediction = Some(prediction);
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total_importances = vec![0.0; self.n_features];
        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (total, &val) in total_importances.iter_mut().zip(imp.iter()) {
                    *total += val;
                }
            }
        }

        let total: f64 = total_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut total_importances {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total_importances));
    }

    /// Mean of the tree predictions for every row of `x`
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(RecalibratorError::ModelNotFitted);
        }

        let mut sum = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            sum += &tree.predict(x)?;
        }

        Ok(sum / self.trees.len() as f64)
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// OOB R², when enough samples were left out of the bootstrap draws
    pub fn oob_score_value(&self) -> Option<f64> {
        self.oob_score_value
    }

    /// Per-sample OOB predictions (NaN where a sample was in every bag)
    pub fn oob_prediction(&self) -> Option<&Array1<f64>> {
        self.oob_prediction.as_ref()
    }

    /// Get number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
