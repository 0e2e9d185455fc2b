//! Regression quality metrics

use crate::error::{Result, StudioError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Held-out evaluation of a fitted model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Coefficient of determination
    pub r2: f64,
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Compute metrics for paired true/predicted values.
    ///
    /// When the true values have zero variance R² is 1.0 for a perfect fit
    /// and 0.0 otherwise.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.is_empty() {
            return Err(StudioError::Computation("cannot score an empty split".into()));
        }
        if y_true.len() != y_pred.len() {
            return Err(StudioError::Computation(format!(
                "{} true values but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let mse = ss_res / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();

        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Ok(Self {
            r2,
            mse,
            rmse: mse.sqrt(),
            mae,
            n_samples: y_true.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_fit() {
        let y = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let m = RegressionMetrics::compute(&y, &y).unwrap();
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.mae, 0.0);
    }

    #[test]
    fn test_known_values() {
        let y_true = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let y_pred = Array1::from_vec(vec![1.5, 2.0, 2.5, 4.0]);
        let m = RegressionMetrics::compute(&y_true, &y_pred).unwrap();
        assert!((m.mse - 0.125).abs() < 1e-12);
        assert!((m.mae - 0.25).abs() < 1e-12);
        assert!((m.r2 - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_mean_prediction_scores_zero() {
        let y_true = Array1::from_vec(vec![1.0, 3.0]);
        let y_pred = Array1::from_vec(vec![2.0, 2.0]);
        let m = RegressionMetrics::compute(&y_true, &y_pred).unwrap();
        assert_eq!(m.r2, 0.0);
    }

    #[test]
    fn test_constant_target() {
        let y_true = Array1::from_vec(vec![5.0]);
        assert_eq!(
            RegressionMetrics::compute(&y_true, &Array1::from_vec(vec![5.0])).unwrap().r2,
            1.0
        );
        assert_eq!(
            RegressionMetrics::compute(&y_true, &Array1::from_vec(vec![4.0])).unwrap().r2,
            0.0
        );
    }

    #[test]
    fn test_empty_split() {
        let empty = Array1::<f64>::zeros(0);
        assert!(RegressionMetrics::compute(&empty, &empty).is_err());
    }
}
