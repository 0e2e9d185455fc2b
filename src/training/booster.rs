//! Gradient-boosted regression trees with second-order split scoring
//!
//! - Squared error objective: gradient = pred - y, hessian = 1
//! - Regularized leaf weights: w* = -G / (H + lambda)
//! - Split gain: 0.5 * [GL²/(HL+λ) + GR²/(HR+λ) - (GL+GR)²/(HL+HR+λ)], kept only when > γ
//! - Minimum child weight constraint on both sides of a split

use crate::error::{Result, StudioError};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Booster hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// L1 regularization on leaf weights
    pub reg_alpha: f64,
    /// Minimum loss reduction to make a split
    pub gamma: f64,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub random_state: Option<u64>,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.3,
            max_depth: 3,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            gamma: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: Some(42),
        }
    }
}

impl BoosterConfig {
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Reject values the fitting loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(StudioError::Computation("n_estimators must be positive".into()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(StudioError::Computation("learning_rate must be positive".into()));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(StudioError::Computation("subsample must be in (0, 1]".into()));
        }
        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return Err(StudioError::Computation("colsample_bytree must be in (0, 1]".into()));
        }
        if self.reg_lambda < 0.0 || self.reg_alpha < 0.0 || self.gamma < 0.0 {
            return Err(StudioError::Computation(
                "regularization parameters must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// A single node of a boosted tree
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf { weight: f64 },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, sample: &ArrayView1<f64>) -> f64 {
        match self {
            TreeNode::Leaf { weight } => *weight,
            TreeNode::Split { feature, threshold, left, right } => {
                if sample[*feature] <= *threshold {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }

    fn count_splits(&self, counts: &mut [f64]) {
        if let TreeNode::Split { feature, left, right, .. } = self {
            if *feature < counts.len() {
                counts[*feature] += 1.0;
            }
            left.count_splits(counts);
            right.count_splits(counts);
        }
    }
}

/// Candidate split: (feature, threshold, gain)
type SplitCandidate = (usize, f64, f64);

/// Build a tree using exact greedy split finding
fn build_tree(
    x: &Array2<f64>,
    grad: &Array1<f64>,
    hess: &Array1<f64>,
    indices: &[usize],
    feature_indices: &[usize],
    depth: usize,
    config: &BoosterConfig,
) -> TreeNode {
    let g_sum: f64 = indices.iter().map(|&i| grad[i]).sum();
    let h_sum: f64 = indices.iter().map(|&i| hess[i]).sum();
    let leaf_weight = compute_leaf_weight(g_sum, h_sum, config.reg_lambda, config.reg_alpha);

    if depth >= config.max_depth || indices.len() < 2 || h_sum < config.min_child_weight {
        return TreeNode::Leaf { weight: leaf_weight };
    }

    // Ties on gain go to the lowest feature index so the result does not
    // depend on how rayon schedules the search.
    let best_split = feature_indices
        .par_iter()
        .filter_map(|&f| find_best_split_for_feature(x, grad, hess, indices, f, config))
        .max_by(|a, b| {
            a.2.partial_cmp(&b.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.0.cmp(&a.0))
        });

    match best_split {
        Some((feature, threshold, gain)) if gain > config.gamma => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
                indices.iter().partition(|&&i| x[[i, feature]] <= threshold);

            if left_idx.is_empty() || right_idx.is_empty() {
                return TreeNode::Leaf { weight: leaf_weight };
            }

            let left = build_tree(x, grad, hess, &left_idx, feature_indices, depth + 1, config);
            let right = build_tree(x, grad, hess, &right_idx, feature_indices, depth + 1, config);

            TreeNode::Split {
                feature,
                threshold,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        _ => TreeNode::Leaf { weight: leaf_weight },
    }
}

/// Optimal leaf weight with L1 (alpha) and L2 (lambda) regularization
fn compute_leaf_weight(g_sum: f64, h_sum: f64, lambda: f64, alpha: f64) -> f64 {
    let g_adj = if alpha > 0.0 {
        if g_sum > alpha {
            g_sum - alpha
        } else if g_sum < -alpha {
            g_sum + alpha
        } else {
            return 0.0;
        }
    } else {
        g_sum
    };
    -g_adj / (h_sum + lambda)
}

/// Best split for a single feature using the exact greedy method
fn find_best_split_for_feature(
    x: &Array2<f64>,
    grad: &Array1<f64>,
    hess: &Array1<f64>,
    indices: &[usize],
    feature: usize,
    config: &BoosterConfig,
) -> Option<SplitCandidate> {
    let mut sorted_indices: Vec<usize> = indices.to_vec();
    sorted_indices.sort_by(|&a, &b| {
        x[[a, feature]]
            .partial_cmp(&x[[b, feature]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let g_total: f64 = sorted_indices.iter().map(|&i| grad[i]).sum();
    let h_total: f64 = sorted_indices.iter().map(|&i| hess[i]).sum();
    let lambda = config.reg_lambda;

    let mut g_left = 0.0;
    let mut h_left = 0.0;
    let mut best: Option<SplitCandidate> = None;

    // The last position would leave the right side empty.
    for pos in 0..sorted_indices.len().saturating_sub(1) {
        let idx = sorted_indices[pos];
        let next_idx = sorted_indices[pos + 1];
        g_left += grad[idx];
        h_left += hess[idx];

        let value = x[[idx, feature]];
        let next_value = x[[next_idx, feature]];
        if (next_value - value).abs() < 1e-12 {
            continue;
        }

        let g_right = g_total - g_left;
        let h_right = h_total - h_left;
        if h_left < config.min_child_weight || h_right < config.min_child_weight {
            continue;
        }

        let gain = 0.5
            * ((g_left * g_left) / (h_left + lambda) + (g_right * g_right) / (h_right + lambda)
                - (g_total * g_total) / (h_total + lambda));

        if best.map_or(true, |(_, _, g)| gain > g) {
            best = Some((feature, (value + next_value) / 2.0, gain));
        }
    }

    best
}

/// Gradient-boosted tree regressor (squared error loss)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedTreeRegressor {
    config: BoosterConfig,
    trees: Vec<TreeNode>,
    base_score: f64,
    n_features: usize,
    is_fitted: bool,
}

impl BoostedTreeRegressor {
    pub fn new(config: BoosterConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
            n_features: 0,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.config.validate()?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 {
            return Err(StudioError::Computation("cannot fit on zero rows".into()));
        }
        if y.len() != n_samples {
            return Err(StudioError::Computation(format!(
                "feature matrix has {} rows but target has {}",
                n_samples,
                y.len()
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(StudioError::Computation(
                "training data contains non-finite values".into(),
            ));
        }

        self.n_features = n_features;
        self.base_score = y.mean().unwrap_or(0.0);
        let mut preds = Array1::from_elem(n_samples, self.base_score);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        self.trees.clear();
        let hess = Array1::from_elem(n_samples, 1.0);

        for _ in 0..self.config.n_estimators {
            let grad: Array1<f64> = &preds - y;

            let row_indices = subsample(&mut rng, n_samples, self.config.subsample);
            let col_indices = subsample(&mut rng, n_features, self.config.colsample_bytree);

            let tree = build_tree(x, &grad, &hess, &row_indices, &col_indices, 0, &self.config);

            for (i, row) in x.rows().into_iter().enumerate() {
                preds[i] += self.config.learning_rate * tree.predict(&row);
            }

            self.trees.push(tree);
        }

        self.is_fitted = true;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(StudioError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(StudioError::Computation(format!(
                "expected {} encoded columns, got {}",
                self.n_features,
                x.ncols()
            )));
        }

        let preds = x
            .rows()
            .into_iter()
            .map(|row| {
                self.trees.iter().fold(self.base_score, |acc, tree| {
                    acc + self.config.learning_rate * tree.predict(&row)
                })
            })
            .collect();
        Ok(preds)
    }

    /// Split-count importances, normalized to sum to 1 (all zero without splits)
    pub fn feature_importances(&self) -> Option<Array1<f64>> {
        if !self.is_fitted {
            return None;
        }
        let mut counts = vec![0.0f64; self.n_features];
        for tree in &self.trees {
            tree.count_splits(&mut counts);
        }
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            for c in counts.iter_mut() {
                *c /= total;
            }
        }
        Some(Array1::from_vec(counts))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn config(&self) -> &BoosterConfig {
        &self.config
    }
}

fn subsample(rng: &mut Xoshiro256PlusPlus, n: usize, ratio: f64) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n).collect();
    }
    let k = ((n as f64) * ratio).ceil().max(1.0) as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(k);
    indices.sort_unstable();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::metrics::RegressionMetrics;

    fn regression_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec((50, 2), (0..100).map(|i| i as f64 * 0.1).collect()).unwrap();
        let y: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|r| r[0] * 2.0 + r[1] * 0.5 + 1.0)
            .collect();
        (x, y)
    }

    #[test]
    fn test_regressor_fits_training_data() {
        let (x, y) = regression_data();
        let mut model = BoostedTreeRegressor::new(BoosterConfig::default());
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        let metrics = RegressionMetrics::compute(&y, &preds).unwrap();
        assert!(metrics.r2 > 0.95, "R² = {}", metrics.r2);
        assert_eq!(model.n_trees(), 200);
    }

    #[test]
    fn test_regressor_is_deterministic() {
        let (x, y) = regression_data();
        let config = BoosterConfig::default().with_n_estimators(20);
        let mut a = BoostedTreeRegressor::new(config.clone());
        let mut b = BoostedTreeRegressor::new(config);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_constant_target_predicts_constant() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = Array1::from_elem(4, 7.0);
        let mut model = BoostedTreeRegressor::new(BoosterConfig::default());
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        assert!(preds.iter().all(|p| (p - 7.0).abs() < 1e-9));
    }

    #[test]
    fn test_zero_columns_predicts_base_score() {
        let x = Array2::<f64>::zeros((3, 0));
        let y = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let mut model = BoostedTreeRegressor::new(BoosterConfig::default().with_n_estimators(5));
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&Array2::<f64>::zeros((1, 0))).unwrap();
        assert!((preds[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_predict_checks_width() {
        let (x, y) = regression_data();
        let mut model = BoostedTreeRegressor::new(BoosterConfig::default().with_n_estimators(3));
        model.fit(&x, &y).unwrap();
        let wrong = Array2::<f64>::zeros((1, 3));
        assert!(matches!(model.predict(&wrong), Err(StudioError::Computation(_))));
    }

    #[test]
    fn test_feature_importances_sum_to_one() {
        let (x, y) = regression_data();
        let mut model = BoostedTreeRegressor::new(BoosterConfig::default().with_n_estimators(10));
        model.fit(&x, &y).unwrap();
        let imp = model.feature_importances().unwrap();
        assert_eq!(imp.len(), 2);
        assert!((imp.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_config() {
        let (x, y) = regression_data();
        let mut model = BoostedTreeRegressor::new(BoosterConfig {
            subsample: 0.0,
            ..Default::default()
        });
        assert!(model.fit(&x, &y).is_err());
    }

    #[test]
    fn test_predict_before_fit() {
        let model = BoostedTreeRegressor::new(BoosterConfig::default());
        assert!(matches!(
            model.predict(&Array2::zeros((1, 1))),
            Err(StudioError::ModelNotFitted)
        ));
    }
}
