//! Fitted model artifact

use super::{BoostedTreeRegressor, RegressionMetrics};
use crate::error::{Result, StudioError};
use crate::preprocessing::DataPreprocessor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered encoded column names the regressor was fitted on
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncodedSchema {
    columns: Vec<String>,
}

impl EncodedSchema {
    /// Encoded names must be unique; `<feature>_<category>` can collide with
    /// another feature's name or encoding.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut duplicates: Vec<&str> = columns
            .iter()
            .filter(|c| !seen.insert(c.as_str()))
            .map(|c| c.as_str())
            .collect();
        if !duplicates.is_empty() {
            duplicates.dedup();
            return Err(StudioError::InvalidSelection(format!(
                "selected features produce clashing encoded columns: {}",
                duplicates.join(", ")
            )));
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Everything needed to turn a raw feature row into a prediction
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub(crate) id: String,
    pub(crate) target: String,
    pub(crate) feature_selection: Vec<String>,
    pub(crate) preprocessor: DataPreprocessor,
    pub(crate) regressor: BoostedTreeRegressor,
    pub(crate) encoded_schema: EncodedSchema,
    pub(crate) metrics: RegressionMetrics,
    pub(crate) feature_importances: Vec<(String, f64)>,
    pub(crate) n_train: usize,
    pub(crate) n_test: usize,
    pub(crate) trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Features in the order they were selected for training
    pub fn feature_selection(&self) -> &[String] {
        &self.feature_selection
    }

    pub fn preprocessor(&self) -> &DataPreprocessor {
        &self.preprocessor
    }

    pub fn regressor(&self) -> &BoostedTreeRegressor {
        &self.regressor
    }

    pub fn encoded_schema(&self) -> &EncodedSchema {
        &self.encoded_schema
    }

    pub fn metrics(&self) -> &RegressionMetrics {
        &self.metrics
    }

    /// R² on the held-out split
    pub fn quality_score(&self) -> f64 {
        self.metrics.r2
    }

    /// `(encoded column, importance)` in schema order
    pub fn feature_importances(&self) -> &[(String, f64)] {
        &self.feature_importances
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn outcome(&self) -> TrainingOutcome {
        TrainingOutcome {
            model_id: self.id.clone(),
            r2: self.metrics.r2,
            metrics: self.metrics,
            n_train: self.n_train,
            n_test: self.n_test,
            feature_importances: self.feature_importances.clone(),
        }
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            id: self.id.clone(),
            target: self.target.clone(),
            features: self.feature_selection.clone(),
            encoded_schema: self.encoded_schema.columns().to_vec(),
            metrics: self.metrics,
            feature_importances: self.feature_importances.clone(),
            n_train: self.n_train,
            n_test: self.n_test,
            n_trees: self.regressor.n_trees(),
            trained_at: self.trained_at,
        }
    }
}

/// Result of a successful training run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingOutcome {
    pub model_id: String,
    pub r2: f64,
    pub metrics: RegressionMetrics,
    pub n_train: usize,
    pub n_test: usize,
    pub feature_importances: Vec<(String, f64)>,
}

/// Read-only description of the installed model
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub id: String,
    pub target: String,
    pub features: Vec<String>,
    pub encoded_schema: Vec<String>,
    pub metrics: RegressionMetrics,
    pub feature_importances: Vec<(String, f64)>,
    pub n_train: usize,
    pub n_test: usize,
    pub n_trees: usize,
    pub trained_at: DateTime<Utc>,
}
