//! Feature scaling implementations

use crate::dataset::series_to_f64;
use crate::error::{Result, StudioError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of scaler to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// No scaling
    None,
}

/// Parameters for a fitted scaler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    center: f64, // mean or min
    scale: f64,  // population std or range
}

/// Feature scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| StudioError::ColumnNotFound(col_name.to_string()))?;

            let params = self.compute_params(column.as_materialized_series())?;
            self.params.insert(col_name.to_string(), params);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale every fitted column present in `df`; other columns pass through
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(StudioError::ModelNotFitted);
        }

        let columns = df
            .get_columns()
            .iter()
            .map(|column| {
                let series = column.as_materialized_series();
                match self.params.get(series.name().as_str()) {
                    Some(params) => Self::scale_series(series, params).map(Column::from),
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

    /// Fitted `(center, scale)` for a column
    pub fn params(&self, column: &str) -> Option<(f64, f64)> {
        self.params.get(column).map(|p| (p.center, p.scale))
    }

    fn compute_params(&self, series: &Series) -> Result<ScalerParams> {
        let values: Vec<f64> = series_to_f64(series)?.into_iter().flatten().collect();
        if values.is_empty() {
            return Ok(ScalerParams { center: 0.0, scale: 1.0 });
        }

        let params = match self.scaler_type {
            ScalerType::Standard => {
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                ScalerParams {
                    center: mean,
                    scale: non_zero(variance.sqrt()),
                }
            }
            ScalerType::MinMax => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                ScalerParams {
                    center: min,
                    scale: non_zero(max - min),
                }
            }
            ScalerType::None => ScalerParams { center: 0.0, scale: 1.0 },
        };

        Ok(params)
    }

    fn scale_series(series: &Series, params: &ScalerParams) -> Result<Series> {
        let values: Vec<Option<f64>> = series_to_f64(series)?
            .into_iter()
            .map(|v| v.map(|x| (x - params.center) / params.scale))
            .collect();
        Ok(Series::new(series.name().clone(), values))
    }
}

fn non_zero(scale: f64) -> f64 {
    if scale.abs() < 1e-12 || !scale.is_finite() {
        1.0
    } else {
        scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name).unwrap().f64().unwrap().into_no_null_iter().collect()
    }

    #[test]
    fn test_standard_scaler_population_std() {
        let df = df!("x" => &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut scaler = Scaler::new(ScalerType::Standard);
        let out = scaler.fit_transform(&df, &["x"]).unwrap();

        let (center, scale) = scaler.params("x").unwrap();
        assert!((center - 2.5).abs() < 1e-12);
        assert!((scale - 1.25f64.sqrt()).abs() < 1e-12);

        let scaled = values(&out, "x");
        let mean: f64 = scaled.iter().sum::<f64>() / 4.0;
        assert!(mean.abs() < 1e-10);
    }

    #[test]
    fn test_zero_variance_scales_by_one() {
        let df = df!("x" => &[5.0, 5.0, 5.0]).unwrap();
        let mut scaler = Scaler::new(ScalerType::Standard);
        let out = scaler.fit_transform(&df, &["x"]).unwrap();
        assert_eq!(values(&out, "x"), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_minmax_scaler() {
        let df = df!("x" => &[0.0, 5.0, 10.0], "y" => &["a", "b", "c"]).unwrap();
        let mut scaler = Scaler::new(ScalerType::MinMax);
        let out = scaler.fit_transform(&df, &["x"]).unwrap();
        assert_eq!(values(&out, "x"), vec![0.0, 0.5, 1.0]);
        assert_eq!(out.column("y").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_integer_column_becomes_float() {
        let df = df!("x" => &[1i64, 3]).unwrap();
        let mut scaler = Scaler::new(ScalerType::Standard);
        let out = scaler.fit_transform(&df, &["x"]).unwrap();
        assert_eq!(values(&out, "x"), vec![-1.0, 1.0]);
    }
}
