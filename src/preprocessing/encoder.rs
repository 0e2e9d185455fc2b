//! One-hot encoding of categorical columns

use crate::dataset::series_to_text;
use crate::error::{Result, StudioError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Categories observed for one column, in first-observed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    pub column: String,
    pub categories: Vec<String>,
}

impl CategoryVocabulary {
    /// Output column names: `<column>_<category>`
    pub fn output_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.column, c))
            .collect()
    }

    fn index_of(&self, value: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == value)
    }
}

/// A value the encoder has never seen for a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownCategory {
    pub column: String,
    pub value: String,
    pub row: usize,
}

/// Dense output of [`OneHotEncoder::transform`]
#[derive(Debug, Clone, Default)]
pub struct EncodedBlock {
    /// Output column names in order
    pub names: Vec<String>,
    /// One vector of 0/1 values per output column
    pub columns: Vec<Vec<f64>>,
    /// Values that were not part of the fitted vocabulary
    pub unknown: Vec<UnknownCategory>,
}

/// One-hot encoder; unknown categories encode as all zeros
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    vocabularies: Vec<CategoryVocabulary>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the encoder to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.vocabularies = columns
            .iter()
            .map(|col_name| {
                let column = df
                    .column(col_name)
                    .map_err(|_| StudioError::ColumnNotFound(col_name.to_string()))?;
                Ok(CategoryVocabulary {
                    column: col_name.to_string(),
                    categories: Self::build_vocabulary(column.as_materialized_series())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode the fitted columns of `df`
    pub fn transform(&self, df: &DataFrame) -> Result<EncodedBlock> {
        if !self.is_fitted {
            return Err(StudioError::ModelNotFitted);
        }

        let mut block = EncodedBlock::default();

        for vocab in &self.vocabularies {
            let column = df
                .column(&vocab.column)
                .map_err(|_| StudioError::ColumnNotFound(vocab.column.clone()))?;
            let values = series_to_text(column.as_materialized_series())?;

            let mut dense = vec![vec![0.0; values.len()]; vocab.categories.len()];
            for (row, value) in values.iter().enumerate() {
                let Some(value) = value else { continue };
                match vocab.index_of(value) {
                    Some(idx) => dense[idx][row] = 1.0,
                    None => block.unknown.push(UnknownCategory {
                        column: vocab.column.clone(),
                        value: value.clone(),
                        row,
                    }),
                }
            }

            block.names.extend(vocab.output_names());
            block.columns.extend(dense);
        }

        Ok(block)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<EncodedBlock> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Output column names for every fitted column, in order
    pub fn feature_names_out(&self) -> Vec<String> {
        self.vocabularies
            .iter()
            .flat_map(|v| v.output_names())
            .collect()
    }

    pub fn vocabularies(&self) -> &[CategoryVocabulary] {
        &self.vocabularies
    }

    pub fn vocabulary(&self, column: &str) -> Option<&CategoryVocabulary> {
        self.vocabularies.iter().find(|v| v.column == column)
    }

    fn build_vocabulary(series: &Series) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for value in series_to_text(series)?.into_iter().flatten() {
            if seen.insert(value.clone()) {
                categories.push(value);
            }
        }
        Ok(categories)
    }
}
