//! Training configuration

use serde::{Deserialize, Serialize};

/// Split and forest settings for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Seed for the split and every bootstrap draw
    pub random_state: u64,
    /// Compute the out-of-bag R²
    pub oob_score: bool,
    /// Maximum tree depth (`None` grows until leaves are pure)
    pub max_depth: Option<usize>,
    /// Minimum samples to split a node
    pub min_samples_split: usize,
    /// Minimum samples in a leaf
    pub min_samples_leaf: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            n_estimators: 100,
            random_state: 42,
            oob_score: true,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_oob_score(mut self, oob_score: bool) -> Self {
        self.oob_score = oob_score;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }
}
