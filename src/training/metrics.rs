//! Regression evaluation metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Held-out evaluation of a regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// R-squared (NaN when fewer than two samples)
    pub r2: f64,
    /// Out-of-bag R² of the fitted forest, if computed
    pub oob_score: Option<f64>,
    /// Training time in seconds
    pub training_time_secs: f64,
    /// Number of features
    pub n_features: usize,
    /// Rows used for fitting
    pub n_train: usize,
    /// Rows used for evaluation
    pub n_test: usize,
}

impl ModelMetrics {
    /// Compute error metrics between held-out truth and predictions
    pub fn compute_regression(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let (mse, mae) = if errors.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            (
                errors.iter().map(|e| e * e).sum::<f64>() / n,
                errors.iter().map(|e| e.abs()).sum::<f64>() / n,
            )
        };

        Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2: r2_score(y_true, y_pred),
            oob_score: None,
            training_time_secs: 0.0,
            n_features: 0,
            n_train: 0,
            n_test: y_true.len(),
        }
    }
}

/// Coefficient of determination.
///
/// Constant truth scores 1.0 for an exact fit and 0.0 otherwise. Fewer than
/// two samples, or any non-finite input, give NaN.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.len() < 2 {
        return f64::NAN;
    }
    if y_true.iter().chain(y_pred.iter()).any(|v| !v.is_finite()) {
        return f64::NAN;
    }

    let n = y_true.len() as f64;
    let y_mean = y_true.sum() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regression_metrics() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];

        let metrics = ModelMetrics::compute_regression(&y_true, &y_pred);

        assert!((metrics.mse - 0.006).abs() < 1e-9);
        assert!((metrics.rmse - 0.006f64.sqrt()).abs() < 1e-9);
        assert!((metrics.mae - 0.06).abs() < 1e-9);
        assert!(metrics.r2 > 0.99);
        assert_eq!(metrics.n_test, 5);
    }

    #[test]
    fn test_r2_edge_cases() {
        assert_eq!(r2_score(&array![0.5, 0.5], &array![0.5, 0.5]), 1.0);
        assert_eq!(r2_score(&array![0.5, 0.5], &array![0.4, 0.5]), 0.0);
        assert!(r2_score(&array![0.5], &array![0.4]).is_nan());

        // Predicting the mean scores exactly zero
        assert_eq!(r2_score(&array![1.0, 3.0], &array![2.0, 2.0]), 0.0);
    }

    #[test]
    fn test_r2_non_finite_is_nan() {
        assert!(r2_score(&array![0.5, f64::NAN], &array![0.5, 0.5]).is_nan());
        assert!(r2_score(&array![0.2, 0.8], &array![f64::INFINITY, 0.8]).is_nan());

        let metrics = ModelMetrics::compute_regression(&array![0.2, f64::NAN], &array![0.3, 0.4]);
        assert!(metrics.mse.is_nan());
        assert!(metrics.r2.is_nan());
    }
}
