//! Feature preprocessing pipeline

use super::{
    config::PreprocessingConfig,
    encoder::{OneHotEncoder, UnknownCategory},
    imputer::Imputer,
    scaler::Scaler,
};
use crate::dataset::series_to_f64;
use crate::error::{Result, StudioError};
use crate::schema::{kind_of, ColumnKind};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Output of [`DataPreprocessor::transform`]
#[derive(Debug, Clone)]
pub struct TransformedFeatures {
    /// One row per input row, one column per entry of `feature_names_out`
    pub matrix: Array2<f64>,
    /// Categorical values outside the fitted vocabulary
    pub unknown: Vec<UnknownCategory>,
}

/// Imputation, scaling and one-hot encoding over a feature frame.
///
/// Output columns are the numeric features in input order followed by the
/// one-hot block of every categorical feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPreprocessor {
    config: PreprocessingConfig,
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numeric_imputer: Option<Imputer>,
    categorical_imputer: Option<Imputer>,
    scaler: Option<Scaler>,
    encoder: Option<OneHotEncoder>,
    is_fitted: bool,
    /// Rows seen by the last fit
    n_samples_seen: usize,
    /// Seconds spent in the last fit
    fit_time: Option<f64>,
}

impl Default for DataPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPreprocessor {
    /// Create a new preprocessor with default configuration
    pub fn new() -> Self {
        Self::with_config(PreprocessingConfig::default())
    }

    /// Create a new preprocessor with custom configuration
    pub fn with_config(config: PreprocessingConfig) -> Self {
        Self {
            config,
            numeric_columns: Vec::new(),
            categorical_columns: Vec::new(),
            numeric_imputer: None,
            categorical_imputer: None,
            scaler: None,
            encoder: None,
            is_fitted: false,
            n_samples_seen: 0,
            fit_time: None,
        }
    }

    /// Fit every stage on `df`. All columns of `df` are treated as features.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let start = Instant::now();

        self.detect_column_types(df);
        let numeric: Vec<&str> = self.numeric_columns.iter().map(|s| s.as_str()).collect();
        let categorical: Vec<&str> = self.categorical_columns.iter().map(|s| s.as_str()).collect();

        let mut working = df.clone();

        self.numeric_imputer = None;
        self.scaler = None;
        if !numeric.is_empty() {
            let mut imputer = Imputer::new(self.config.numeric_impute_strategy.clone());
            working = imputer.fit_transform(&working, &numeric)?;
            self.numeric_imputer = Some(imputer);

            let mut scaler = Scaler::new(self.config.scaler_type.clone());
            scaler.fit(&working, &numeric)?;
            self.scaler = Some(scaler);
        }

        self.categorical_imputer = None;
        self.encoder = None;
        if !categorical.is_empty() {
            let mut imputer = Imputer::new(self.config.categorical_impute_strategy.clone());
            working = imputer.fit_transform(&working, &categorical)?;
            self.categorical_imputer = Some(imputer);

            let mut encoder = OneHotEncoder::new();
            encoder.fit(&working, &categorical)?;
            self.encoder = Some(encoder);
        }

        self.is_fitted = true;
        self.n_samples_seen = df.height();
        self.fit_time = Some(start.elapsed().as_secs_f64());

        debug!(
            rows = df.height(),
            numeric = self.numeric_columns.len(),
            categorical = self.categorical_columns.len(),
            outputs = self.n_features_out(),
            "Preprocessor fitted"
        );
        Ok(self)
    }

    /// Transform a frame holding (at least) the fitted feature columns
    pub fn transform(&self, df: &DataFrame) -> Result<TransformedFeatures> {
        if !self.is_fitted {
            return Err(StudioError::ModelNotFitted);
        }

        for name in self.input_columns() {
            let column = df
                .column(&name)
                .map_err(|_| StudioError::ColumnNotFound(name.clone()))?;
            if self.numeric_columns.contains(&name)
                && kind_of(column.dtype()) != ColumnKind::Numeric
                && column.dtype() != &DataType::Null
            {
                return Err(StudioError::Computation(format!(
                    "feature '{}' expects numeric values, got {}",
                    name,
                    column.dtype()
                )));
            }
        }

        let mut working = df.select(self.input_columns())?;
        if let Some(imputer) = &self.numeric_imputer {
            working = imputer.transform(&working)?;
        }
        if let Some(scaler) = &self.scaler {
            working = scaler.transform(&working)?;
        }
        if let Some(imputer) = &self.categorical_imputer {
            working = imputer.transform(&working)?;
        }

        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(self.n_features_out());
        for name in &self.numeric_columns {
            let column = working.column(name)?;
            let values = series_to_f64(column.as_materialized_series())?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            columns.push(values);
        }

        let mut unknown = Vec::new();
        if let Some(encoder) = &self.encoder {
            let block = encoder.transform(&working)?;
            columns.extend(block.columns);
            unknown = block.unknown;
        }

        let n_rows = working.height();
        let matrix = Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| columns[j][i]);

        Ok(TransformedFeatures { matrix, unknown })
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<TransformedFeatures> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Output column names: numeric features then `<feature>_<category>`
    pub fn feature_names_out(&self) -> Vec<String> {
        let mut names = self.numeric_columns.clone();
        if let Some(encoder) = &self.encoder {
            names.extend(encoder.feature_names_out());
        }
        names
    }

    pub fn n_features_out(&self) -> usize {
        self.numeric_columns.len()
            + self
                .encoder
                .as_ref()
                .map(|e| e.feature_names_out().len())
                .unwrap_or(0)
    }

    /// Fitted input columns, numeric first
    pub fn input_columns(&self) -> Vec<String> {
        let mut names = self.numeric_columns.clone();
        names.extend(self.categorical_columns.iter().cloned());
        names
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Kind an input column was fitted as
    pub fn input_kind(&self, name: &str) -> Option<ColumnKind> {
        if self.numeric_columns.iter().any(|c| c == name) {
            Some(ColumnKind::Numeric)
        } else if self.categorical_columns.iter().any(|c| c == name) {
            Some(ColumnKind::Categorical)
        } else {
            None
        }
    }

    pub fn encoder(&self) -> Option<&OneHotEncoder> {
        self.encoder.as_ref()
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    pub fn fit_time(&self) -> Option<f64> {
        self.fit_time
    }

    fn detect_column_types(&mut self, df: &DataFrame) {
        self.numeric_columns.clear();
        self.categorical_columns.clear();

        for column in df.get_columns() {
            let name = column.name().to_string();
            match kind_of(column.dtype()) {
                ColumnKind::Numeric => self.numeric_columns.push(name),
                ColumnKind::Categorical => self.categorical_columns.push(name),
            }
        }
    }
}
