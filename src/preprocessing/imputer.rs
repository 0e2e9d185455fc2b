//! Missing value imputation strategies

use crate::dataset::{series_to_f64, series_to_text};
use crate::error::{Result, StudioError};
use crate::schema::{kind_of, ColumnKind};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Strategy for imputing missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with mean (numeric only)
    Mean,
    /// Replace with median (numeric only)
    Median,
    /// Replace with the most frequent value; ties go to the smallest value
    MostFrequent,
    /// Replace with a constant value
    Constant(f64),
    /// Replace with a constant string (categorical)
    ConstantString(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ImputeValue {
    Numeric(f64),
    Text(String),
}

/// Imputer for handling missing values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: HashMap<String, ImputeValue>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn one fill value per column
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| StudioError::ColumnNotFound(col_name.to_string()))?;

            let fill_value = self.compute_fill_value(column.as_materialized_series())?;
            self.fill_values.insert(col_name.to_string(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace missing values in every fitted column present in `df`
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(StudioError::ModelNotFitted);
        }

        let columns = df
            .get_columns()
            .iter()
            .map(|column| {
                let series = column.as_materialized_series();
                match self.fill_values.get(series.name().as_str()) {
                    Some(fill) => Self::fill_series(series, fill).map(Column::from),
                    None => Ok(column.clone()),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DataFrame::new(columns)?)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Fill value learned for a column, rendered as text
    pub fn fill_value(&self, column: &str) -> Option<String> {
        self.fill_values.get(column).map(|v| match v {
            ImputeValue::Numeric(x) => x.to_string(),
            ImputeValue::Text(s) => s.clone(),
        })
    }

    fn compute_fill_value(&self, series: &Series) -> Result<ImputeValue> {
        match &self.strategy {
            ImputeStrategy::Mean => {
                let values: Vec<f64> = series_to_f64(series)?.into_iter().flatten().collect();
                let mean = if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                };
                Ok(ImputeValue::Numeric(mean))
            }
            ImputeStrategy::Median => {
                let mut values: Vec<f64> = series_to_f64(series)?.into_iter().flatten().collect();
                Ok(ImputeValue::Numeric(median(&mut values).unwrap_or(0.0)))
            }
            ImputeStrategy::MostFrequent => {
                if kind_of(series.dtype()) == ColumnKind::Numeric {
                    let values: Vec<f64> = series_to_f64(series)?.into_iter().flatten().collect();
                    Ok(ImputeValue::Numeric(mode_numeric(values).unwrap_or(0.0)))
                } else {
                    let values = series_to_text(series)?;
                    Ok(ImputeValue::Text(mode_text(values.into_iter().flatten()).unwrap_or_default()))
                }
            }
            ImputeStrategy::Constant(val) => Ok(ImputeValue::Numeric(*val)),
            ImputeStrategy::ConstantString(val) => Ok(ImputeValue::Text(val.clone())),
        }
    }

    fn fill_series(series: &Series, fill_value: &ImputeValue) -> Result<Series> {
        let name = series.name().clone();
        match fill_value {
            ImputeValue::Numeric(fill) => {
                if kind_of(series.dtype()) == ColumnKind::Numeric {
                    let values: Vec<f64> = series_to_f64(series)?
                        .into_iter()
                        .map(|v| v.unwrap_or(*fill))
                        .collect();
                    Ok(Series::new(name, values))
                } else {
                    let fill = fill.to_string();
                    let values: Vec<String> = series_to_text(series)?
                        .into_iter()
                        .map(|v| v.unwrap_or_else(|| fill.clone()))
                        .collect();
                    Ok(Series::new(name, values))
                }
            }
            ImputeValue::Text(fill) => {
                let values: Vec<String> = series_to_text(series)?
                    .into_iter()
                    .map(|v| v.unwrap_or_else(|| fill.clone()))
                    .collect();
                Ok(Series::new(name, values))
            }
        }
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Most frequent number, smallest on ties
fn mode_numeric(mut values: Vec<f64>) -> Option<f64> {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < values.len() {
        let mut j = i;
        while j < values.len() && values[j] == values[i] {
            j += 1;
        }
        let run = j - i;
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((values[i], run));
        }
        i = j;
    }
    best.map(|(value, _)| value)
}

/// Most frequent string, smallest on ties
fn mode_text(values: impl Iterator<Item = String>) -> Option<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_imputation() {
        let df = df!("x" => &[Some(1.0), None, Some(3.0)]).unwrap();
        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        let out = imputer.fit_transform(&df, &["x"]).unwrap();

        let values: Vec<Option<f64>> = out.column("x").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_most_frequent_text_breaks_ties_by_smallest() {
        let df = df!("c" => &[Some("b"), Some("a"), None, Some("b"), Some("a")]).unwrap();
        let mut imputer = Imputer::new(ImputeStrategy::MostFrequent);
        imputer.fit(&df, &["c"]).unwrap();
        assert_eq!(imputer.fill_value("c"), Some("a".to_string()));

        let out = imputer.transform(&df).unwrap();
        assert_eq!(out.column("c").unwrap().null_count(), 0);
    }

    #[test]
    fn test_most_frequent_numeric() {
        assert_eq!(mode_numeric(vec![3.0, 1.0, 3.0, 2.0, 1.0]), Some(1.0));
        assert_eq!(mode_numeric(vec![5.0, 5.0, 2.0]), Some(5.0));
        assert_eq!(mode_numeric(vec![]), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_all_missing_numeric_falls_back_to_zero() {
        let df = df!("x" => &[None::<f64>, None]).unwrap();
        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        let out = imputer.fit_transform(&df, &["x"]).unwrap();
        let values: Vec<Option<f64>> = out.column("x").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_transform_before_fit() {
        let df = df!("x" => &[1.0]).unwrap();
        let imputer = Imputer::new(ImputeStrategy::Mean);
        assert!(matches!(imputer.transform(&df), Err(StudioError::ModelNotFitted)));
    }
}
