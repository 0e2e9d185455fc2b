//! In-memory dataset held by a session
//!
//! A [`Dataset`] wraps the polars `DataFrame` parsed from an upload together
//! with an id and the upload name. It is immutable once built; a new upload
//! produces a new `Dataset` that replaces the old one wholesale.

mod loader;

pub use loader::CsvLoader;

use crate::error::{Result, StudioError};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

/// Short description of a loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub id: String,
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
}

/// The currently loaded table
#[derive(Debug, Clone)]
pub struct Dataset {
    id: String,
    name: String,
    frame: DataFrame,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Wrap an already parsed frame
    pub fn from_frame(name: impl Into<String>, frame: DataFrame) -> Result<Self> {
        let mut seen = HashSet::new();
        for col in frame.get_column_names() {
            if !seen.insert(col.to_string()) {
                return Err(StudioError::IngestParse(format!("duplicate column name '{}'", col)));
            }
        }

        Ok(Self {
            id: generate_id(),
            name: name.into(),
            frame,
            loaded_at: Utc::now(),
        })
    }

    /// Parse CSV bytes (header row required)
    pub fn from_csv_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let frame = CsvLoader::new().load_bytes(bytes)?;
        Self::from_frame(name, frame)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Column names in file order
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Values of a column as floats; nulls, NaN and unparseable cells become `None`
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self
            .frame
            .column(name)
            .map_err(|_| StudioError::ColumnNotFound(name.to_string()))?;
        series_to_f64(column.as_materialized_series())
    }

    /// Values of a column rendered as text
    pub fn text_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self
            .frame
            .column(name)
            .map_err(|_| StudioError::ColumnNotFound(name.to_string()))?;
        series_to_text(column.as_materialized_series())
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            rows: self.height(),
            columns: self.width(),
            column_names: self.column_names(),
        }
    }
}

pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()[..8].to_string()
}

/// Cast a series to `Float64` and collect it, treating NaN as missing
pub(crate) fn series_to_f64(series: &Series) -> Result<Vec<Option<f64>>> {
    let casted = series.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Cast a series to `String` and collect it
pub(crate) fn series_to_text(series: &Series) -> Result<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_bytes() {
        let ds = Dataset::from_csv_bytes("houses.csv", b"size,color\n10,red\n,blue\n").unwrap();
        assert_eq!(ds.name(), "houses.csv");
        assert_eq!(ds.height(), 2);
        assert_eq!(ds.column_names(), vec!["size", "color"]);
        assert_eq!(ds.numeric_values("size").unwrap(), vec![Some(10.0), None]);
        assert_eq!(
            ds.text_values("color").unwrap(),
            vec![Some("red".to_string()), Some("blue".to_string())]
        );
    }

    #[test]
    fn test_unknown_column() {
        let ds = Dataset::from_csv_bytes("t.csv", b"a\n1\n").unwrap();
        assert!(matches!(ds.numeric_values("b"), Err(StudioError::ColumnNotFound(_))));
    }

    #[test]
    fn test_summary() {
        let ds = Dataset::from_csv_bytes("t.csv", b"a,b\n1,2\n3,4\n5,6\n").unwrap();
        let summary = ds.summary();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.id.len(), 8);
    }
}
