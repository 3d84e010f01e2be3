//! Regression tree (MSE criterion)

use crate::error::{RecalibratorError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node holding the mean target of its samples
    Leaf {
        value: f64,
        n_samples: usize,
    },
    /// Internal node; samples with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Best split found for one node
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Regression tree grown greedily on variance reduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create an unfitted regression tree
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_indices(x, y, &indices)
    }

    /// Fit on the rows of `x` named by `indices` (repeats allowed).
    ///
    /// This is how bootstrap samples are trained without copying the matrix.
    pub fn fit_indices(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(RecalibratorError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        if indices.len() < self.min_samples_split {
            return Err(RecalibratorError::TrainingError(format!(
                "need at least {} samples to grow a tree, got {}",
                self.min_samples_split,
                indices.len()
            )));
        }

        if let Some(&bad) = indices.iter().find(|&&i| i >= x.nrows()) {
            return Err(RecalibratorError::ShapeError {
                expected: format!("row index < {}", x.nrows()),
                actual: format!("row index {}", bad),
            });
        }

        self.n_features = x.ncols();
        let mut importances = vec![0.0; self.n_features];
        let mut indices = indices.to_vec();

        let root = self.build_node(x, y, &mut indices, 0, &mut importances);
        self.root = Some(root);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &mut [usize],
        depth: usize,
        importances: &mut [f64],
    ) -> TreeNode {
        let n_samples = indices.len();
        let (sum, sq_sum) = indices
            .iter()
            .fold((0.0, 0.0), |(s, sq), &i| (s + y[i], sq + y[i] * y[i]));
        let mean = sum / n_samples as f64;
        let impurity = variance(n_samples, sum, sq_sum);

        let leaf = TreeNode::Leaf {
            value: mean,
            n_samples,
        };

        if n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || is_constant(y, indices)
        {
            return leaf;
        }

        let Some(split) = self.find_best_split(x, y, indices, impurity) else {
            return leaf;
        };

        importances[split.feature_idx] += n_samples as f64 * split.gain;

        // Partition in place: left block first, right block after
        let mut boundary = 0;
        for pos in 0..indices.len() {
            if x[[indices[pos], split.feature_idx]] <= split.threshold {
                indices.swap(pos, boundary);
                boundary += 1;
            }
        }
        let (left_idx, right_idx) = indices.split_at_mut(boundary);

        let left = Box::new(self.build_node(x, y, left_idx, depth + 1, importances));
        let right = Box::new(self.build_node(x, y, right_idx, depth + 1, importances));

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    /// Sort-and-sweep search over every feature for the largest variance reduction
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        parent_impurity: f64,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let (total_sum, total_sq) = indices
            .iter()
            .fold((0.0, 0.0), |(s, sq), &i| (s + y[i], sq + y[i] * y[i]));

        let mut best: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for feature_idx in 0..x.ncols() {
            order.sort_by(|&a, &b| x[[a, feature_idx]].total_cmp(&x[[b, feature_idx]]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for pos in 0..n - 1 {
                let yi = y[order[pos]];
                left_sum += yi;
                left_sq += yi * yi;

                let current = x[[order[pos], feature_idx]];
                let next = x[[order[pos + 1], feature_idx]];
                if next <= current {
                    continue;
                }

                let left_n = pos + 1;
                let right_n = n - left_n;
                if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                    continue;
                }

                let weighted = (left_n as f64 * variance(left_n, left_sum, left_sq)
                    + right_n as f64
                        * variance(right_n, total_sum - left_sum, total_sq - left_sq))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > best.map_or(0.0, |b| b.gain) {
                    let mut threshold = current + (next - current) / 2.0;
                    if threshold >= next {
                        threshold = current;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(RecalibratorError::ModelNotFitted)?;
        self.check_width(x)?;

        Ok(x.rows().into_iter().map(|row| predict_row(root, row)).collect())
    }

    /// Predict a single row; the caller guarantees the feature count.
    pub(crate) fn predict_one(&self, row: ArrayView1<'_, f64>) -> Result<f64> {
        let root = self.root.as_ref().ok_or(RecalibratorError::ModelNotFitted)?;
        Ok(predict_row(root, row))
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(RecalibratorError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        self.root.as_ref().map_or(0, node_depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, count_leaves)
    }
}

fn predict_row(mut node: &TreeNode, row: ArrayView1<'_, f64>) -> f64 {
    loop {
        match node {
            TreeNode::Leaf { value, .. } => return *value,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                ..
            } => {
                node = if row[*feature_idx] <= *threshold {
                    left
                } else {
                    right
                };
            }
        }
    }
}

/// Population variance from running sums, clamped against rounding below zero
fn variance(n: usize, sum: f64, sq_sum: f64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    (sq_sum / n - (sum / n).powi(2)).max(0.0)
}

fn is_constant(y: &Array1<f64>, indices: &[usize]) -> bool {
    let first = y[indices[0]];
    indices.iter().all(|&i| (y[i] - first).abs() < 1e-12)
}

fn node_depth(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

fn count_leaves(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => count_leaves(left) + count_leaves(right),
    }
}
