//! Training engine implementation

use super::{
    train_test_split, BoostedTreeRegressor, EncodedSchema, ModelArtifact, RegressionMetrics,
    TrainingConfig,
};
use crate::dataset::{generate_id, Dataset};
use crate::error::{MissingState, Result, StudioError};
use crate::preprocessing::DataPreprocessor;
use crate::schema::{classify, ColumnKind};
use chrono::Utc;
use ndarray::Array1;
use polars::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Builds and fits the preprocessing + regressor pipeline
#[derive(Debug, Clone, Default)]
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Fit a fresh artifact for `target` over `features`.
    ///
    /// Rows with a missing target are dropped before the split.
    pub fn fit(&self, dataset: &Dataset, target: &str, features: &[String]) -> Result<ModelArtifact> {
        let start = Instant::now();
        self.config.validate()?;
        validate_selection(dataset, target, features)?;

        let y_all = dataset.numeric_values(target)?;
        let usable: Vec<usize> = y_all
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect();

        if usable.len() < 2 {
            return Err(StudioError::Computation(format!(
                "at least 2 rows with a value for '{}' are needed to train, found {}",
                target,
                usable.len()
            )));
        }

        info!(
            target,
            features = features.len(),
            rows = usable.len(),
            dropped = dataset.height() - usable.len(),
            "Training started"
        );

        let split = train_test_split(usable.len(), self.config.test_size, self.config.random_state)?;
        // Rows keep file order inside each side of the split
        let mut train_rows: Vec<usize> = split.train.iter().map(|&p| usable[p]).collect();
        let mut test_rows: Vec<usize> = split.test.iter().map(|&p| usable[p]).collect();
        train_rows.sort_unstable();
        test_rows.sort_unstable();

        let x = dataset.frame().select(features.iter().map(|s| s.as_str()))?;
        let x_train = take_rows(&x, &train_rows)?;
        let x_test = take_rows(&x, &test_rows)?;
        let y_train = gather(&y_all, &train_rows);
        let y_test = gather(&y_all, &test_rows);

        let mut preprocessor = DataPreprocessor::with_config(self.config.preprocessing.clone());
        let train_features = preprocessor.fit_transform(&x_train)?;
        let test_features = preprocessor.transform(&x_test)?;
        if !test_features.unknown.is_empty() {
            debug!(
                count = test_features.unknown.len(),
                "Held-out rows contain categories unseen during fitting"
            );
        }

        let encoded_schema = EncodedSchema::new(preprocessor.feature_names_out())?;
        if train_features.matrix.ncols() != encoded_schema.len() {
            return Err(StudioError::Computation(format!(
                "preprocessor produced {} columns for a schema of {}",
                train_features.matrix.ncols(),
                encoded_schema.len()
            )));
        }

        let mut regressor = BoostedTreeRegressor::new(self.config.booster.clone());
        regressor.fit(&train_features.matrix, &y_train)?;

        let y_pred = regressor.predict(&test_features.matrix)?;
        let metrics = RegressionMetrics::compute(&y_test, &y_pred)?;

        let feature_importances = regressor
            .feature_importances()
            .map(|imp| {
                encoded_schema
                    .columns()
                    .iter()
                    .cloned()
                    .zip(imp.iter().copied())
                    .collect()
            })
            .unwrap_or_default();

        let artifact = ModelArtifact {
            id: generate_id(),
            target: target.to_string(),
            feature_selection: features.to_vec(),
            preprocessor,
            regressor,
            encoded_schema,
            metrics,
            feature_importances,
            n_train: train_rows.len(),
            n_test: test_rows.len(),
            trained_at: Utc::now(),
        };

        info!(
            model_id = artifact.id(),
            r2 = metrics.r2,
            rmse = metrics.rmse,
            encoded_columns = artifact.encoded_schema().len(),
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Model trained"
        );

        Ok(artifact)
    }
}

/// Check target and feature names against the dataset
pub fn validate_selection(dataset: &Dataset, target: &str, features: &[String]) -> Result<()> {
    if target.is_empty() {
        return Err(StudioError::StateMissing(MissingState::Target));
    }
    if features.is_empty() {
        return Err(StudioError::StateMissing(MissingState::Features));
    }

    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = features
        .iter()
        .filter(|f| !seen.insert(f.as_str()))
        .map(|f| f.as_str())
        .collect();
    if !duplicates.is_empty() {
        return Err(StudioError::InvalidSelection(format!(
            "features listed more than once: {}",
            duplicates.join(", ")
        )));
    }

    let unknown: Vec<&str> = std::iter::once(target)
        .chain(features.iter().map(|f| f.as_str()))
        .filter(|name| !dataset.has_column(name))
        .collect();
    if !unknown.is_empty() {
        return Err(StudioError::InvalidSelection(format!(
            "unknown columns: {}",
            unknown.join(", ")
        )));
    }

    if features.iter().any(|f| f == target) {
        return Err(StudioError::InvalidSelection(format!(
            "target '{}' cannot also be a feature",
            target
        )));
    }

    let schema = classify(dataset)?;
    if schema.kind(target) != Some(ColumnKind::Numeric) {
        return Err(StudioError::InvalidSelection(format!(
            "target '{}' is not a numeric column",
            target
        )));
    }

    Ok(())
}

fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec("idx".into(), rows.iter().map(|&r| r as IdxSize).collect());
    Ok(df.take(&idx)?)
}

fn gather(values: &[Option<f64>], rows: &[usize]) -> Array1<f64> {
    rows.iter().map(|&r| values[r].unwrap_or(f64::NAN)).collect()
}
