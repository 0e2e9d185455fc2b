//! Column classification
//!
//! A column is numeric iff the CSV reader inferred an integer or floating
//! dtype for it. Everything else (text, booleans, dates, columns mixing
//! numbers and text) is categorical. The rule is applied the same way to the
//! whole dataset and to the feature slice used for training.

use crate::dataset::{series_to_f64, Dataset};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of a column as seen by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Classify a polars dtype
pub fn kind_of(dtype: &DataType) -> ColumnKind {
    match dtype {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => ColumnKind::Numeric,
        _ => ColumnKind::Categorical,
    }
}

/// Per-column profile
#[derive(Debug, Clone, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub dtype: String,
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnProfile {
    fn from_column(column: &Column) -> Result<Self> {
        let series = column.as_materialized_series();
        let kind = kind_of(series.dtype());

        let mut profile = Self {
            name: series.name().to_string(),
            kind,
            dtype: format!("{:?}", series.dtype()),
            count: series.len(),
            null_count: series.null_count(),
            unique_count: series.n_unique().unwrap_or(0),
            mean: None,
            min: None,
            max: None,
        };

        if kind == ColumnKind::Numeric {
            let values: Vec<f64> = series_to_f64(series)?.into_iter().flatten().collect();
            if !values.is_empty() {
                profile.mean = Some(values.iter().sum::<f64>() / values.len() as f64);
                profile.min = values.iter().copied().reduce(f64::min);
                profile.max = values.iter().copied().reduce(f64::max);
            }
        }

        Ok(profile)
    }
}

/// Result of classifying every column of a frame
#[derive(Debug, Clone, Serialize)]
pub struct SchemaReport {
    pub n_rows: usize,
    pub columns: Vec<ColumnProfile>,
}

impl SchemaReport {
    /// Numeric column names in original order
    pub fn numeric_columns(&self) -> Vec<String> {
        self.names_of(ColumnKind::Numeric)
    }

    /// Categorical column names in original order
    pub fn categorical_columns(&self) -> Vec<String> {
        self.names_of(ColumnKind::Categorical)
    }

    /// Columns that can serve as a regression target
    pub fn target_candidates(&self) -> Vec<String> {
        self.numeric_columns()
    }

    /// Every column, numeric ones first
    pub fn feature_candidates(&self) -> Vec<String> {
        let mut names = self.numeric_columns();
        names.extend(self.categorical_columns());
        names
    }

    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    fn names_of(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Classify the columns of a frame
pub fn classify_frame(df: &DataFrame) -> Result<SchemaReport> {
    let columns = df
        .get_columns()
        .iter()
        .map(ColumnProfile::from_column)
        .collect::<Result<Vec<_>>>()?;

    Ok(SchemaReport {
        n_rows: df.height(),
        columns,
    })
}

/// Classify the columns of a dataset
pub fn classify(dataset: &Dataset) -> Result<SchemaReport> {
    classify_frame(dataset.frame())
}
