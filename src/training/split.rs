//! Shuffled train/test split

use crate::error::{RecalibratorError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices of one train/test partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

impl TrainTestSplit {
    /// Shuffle `0..n_samples` with a seeded RNG and hold out `ceil(n * test_size)` rows.
    ///
    /// The held-out rows are the head of the permutation, the training rows
    /// the remainder.
    pub fn new(n_samples: usize, test_size: f64, random_state: u64) -> Result<Self> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(RecalibratorError::TrainingError(format!(
                "test_size must be in (0, 1), got {}",
                test_size
            )));
        }

        let n_test = (n_samples as f64 * test_size).ceil() as usize;
        let n_train = n_samples.saturating_sub(n_test);

        if n_test == 0 || n_train == 0 {
            return Err(RecalibratorError::TrainingError(format!(
                "{} row(s) cannot be split with test_size = {}",
                n_samples, test_size
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(random_state);
        indices.shuffle(&mut rng);

        let train_indices = indices.split_off(n_test);
        Ok(Self {
            train_indices,
            test_indices: indices,
        })
    }

    pub fn n_train(&self) -> usize {
        self.train_indices.len()
    }

    pub fn n_test(&self) -> usize {
        self.test_indices.len()
    }

    /// Materialise `(x_train, x_test, y_train, y_test)`
    pub fn apply(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> (Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>) {
        (
            x.select(Axis(0), &self.train_indices),
            x.select(Axis(0), &self.test_indices),
            y.select(Axis(0), &self.train_indices),
            y.select(Axis(0), &self.test_indices),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_split_sizes_and_coverage() {
        let split = TrainTestSplit::new(10, 0.2, 42).unwrap();
        assert_eq!(split.n_test(), 2);
        assert_eq!(split.n_train(), 8);

        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(split.test_indices.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_held_out_rounds_up() {
        let split = TrainTestSplit::new(11, 0.2, 42).unwrap();
        assert_eq!(split.n_test(), 3);
        assert_eq!(split.n_train(), 8);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = TrainTestSplit::new(50, 0.2, 42).unwrap();
        let b = TrainTestSplit::new(50, 0.2, 42).unwrap();
        let c = TrainTestSplit::new(50, 0.2, 7).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_too_few_rows() {
        assert!(TrainTestSplit::new(0, 0.2, 42).is_err());
        assert!(TrainTestSplit::new(1, 0.2, 42).is_err());
        assert!(TrainTestSplit::new(10, 1.0, 42).is_err());
    }

    #[test]
    fn test_apply_selects_rows() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 10.0, 20.0, 30.0, 40.0];
        let split = TrainTestSplit::new(5, 0.2, 3).unwrap();

        let (x_train, x_test, y_train, y_test) = split.apply(&x, &y);
        assert_eq!(x_train.nrows(), 4);
        assert_eq!(x_test.nrows(), 1);
        assert_eq!(y_test[0], x_test[[0, 0]] * 10.0);
        for (row, target) in x_train.rows().into_iter().zip(y_train.iter()) {
            assert_eq!(*target, row[0] * 10.0);
        }
    }
}
