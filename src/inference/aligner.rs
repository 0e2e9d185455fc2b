//! Turns a typed feature row into the exact encoded layout a model expects

use crate::error::{MissingState, Result, StudioError};
use crate::schema::ColumnKind;
use crate::training::ModelArtifact;
use ndarray::Array2;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Parsed value of one comma-separated token
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Empty token
    Missing,
    Number(f64),
    Text(String),
}

/// A trimmed token and its parsed value
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedToken {
    pub raw: String,
    pub value: FeatureValue,
}

impl ParsedToken {
    pub fn parse(token: &str) -> Self {
        let raw = token.trim().to_string();
        let value = if raw.is_empty() {
            FeatureValue::Missing
        } else {
            match raw.parse::<f64>() {
                Ok(x) if x.is_finite() => FeatureValue::Number(x),
                _ => FeatureValue::Text(raw.clone()),
            }
        };
        Self { raw, value }
    }
}

/// Split raw input on commas and parse every token
pub fn parse_tokens(raw: &str) -> Vec<ParsedToken> {
    raw.split(',').map(ParsedToken::parse).collect()
}

/// Non-fatal mismatch found while encoding a prediction row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentWarning {
    /// Category not seen during training; its one-hot block is all zeros
    UnknownCategory { feature: String, value: String },
    /// Encoded schema column the row did not produce; filled with 0
    MissingColumn { column: String },
    /// Column the row produced that the schema does not know; dropped
    ExtraColumn { column: String },
}

impl std::fmt::Display for AlignmentWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentWarning::UnknownCategory { feature, value } => write!(
                f,
                "category '{}' was not seen for feature '{}' during training",
                value, feature
            ),
            AlignmentWarning::MissingColumn { column } => {
                write!(f, "encoded column '{}' was absent and set to 0", column)
            }
            AlignmentWarning::ExtraColumn { column } => {
                write!(f, "encoded column '{}' is not part of the model and was dropped", column)
            }
        }
    }
}

/// A single prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub value: f64,
    pub warnings: Vec<AlignmentWarning>,
}

/// A feature row laid out in encoded schema order
#[derive(Debug, Clone)]
pub struct AlignedRow {
    pub values: Array2<f64>,
    pub warnings: Vec<AlignmentWarning>,
}

/// Aligns raw prediction input with a fitted artifact
pub struct PredictionAligner<'a> {
    artifact: &'a ModelArtifact,
}

impl<'a> PredictionAligner<'a> {
    pub fn new(artifact: &'a ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Parse, encode and reconcile `raw` against the artifact's schema
    pub fn align(&self, raw: &str, features: &[String]) -> Result<AlignedRow> {
        if raw.trim().is_empty() || features.is_empty() {
            return Err(StudioError::StateMissing(MissingState::Input));
        }

        let tokens = parse_tokens(raw);
        if tokens.len() != features.len() {
            return Err(StudioError::SelectionMismatch {
                expected: features.len(),
                actual: tokens.len(),
            });
        }

        self.check_selection(features)?;

        let frame = self.build_frame(&tokens, features)?;
        let transformed = self.artifact.preprocessor().transform(&frame)?;

        let mut warnings: Vec<AlignmentWarning> = transformed
            .unknown
            .into_iter()
            .map(|u| AlignmentWarning::UnknownCategory {
                feature: u.column,
                value: u.value,
            })
            .collect();

        let produced = self.artifact.preprocessor().feature_names_out();
        let values = self.reconcile(&produced, &transformed.matrix, &mut warnings);

        for warning in &warnings {
            warn!(model_id = self.artifact.id(), "{}", warning);
        }

        Ok(AlignedRow { values, warnings })
    }

    /// Align and run the regressor on the single row
    pub fn predict(&self, raw: &str, features: &[String]) -> Result<Prediction> {
        let row = self.align(raw, features)?;
        let output = self.artifact.regressor().predict(&row.values)?;
        let value = output
            .first()
            .copied()
            .ok_or_else(|| StudioError::Computation("regressor returned no output".into()))?;

        debug!(model_id = self.artifact.id(), value, "Prediction computed");
        Ok(Prediction {
            value,
            warnings: row.warnings,
        })
    }

    /// The selection must name exactly the trained features, in any order
    fn check_selection(&self, features: &[String]) -> Result<()> {
        let trained: HashSet<&str> = self
            .artifact
            .feature_selection()
            .iter()
            .map(|s| s.as_str())
            .collect();
        let given: HashSet<&str> = features.iter().map(|s| s.as_str()).collect();

        if given.len() != features.len() || given != trained {
            return Err(StudioError::InvalidSelection(format!(
                "features [{}] do not match the trained model's features [{}]",
                features.join(", "),
                self.artifact.feature_selection().join(", ")
            )));
        }
        Ok(())
    }

    /// One-row frame with a typed column per selected feature
    fn build_frame(&self, tokens: &[ParsedToken], features: &[String]) -> Result<DataFrame> {
        let preprocessor = self.artifact.preprocessor();

        let columns = features
            .iter()
            .zip(tokens)
            .map(|(feature, token)| {
                let series = match preprocessor.input_kind(feature) {
                    Some(ColumnKind::Numeric) => {
                        let value = match &token.value {
                            FeatureValue::Missing => None,
                            FeatureValue::Number(x) => Some(*x),
                            FeatureValue::Text(text) => {
                                return Err(StudioError::Computation(format!(
                                    "feature '{}' expects a number, got '{}'",
                                    feature, text
                                )))
                            }
                        };
                        Series::new(feature.as_str().into(), [value])
                    }
                    Some(ColumnKind::Categorical) => {
                        let value = match token.value {
                            FeatureValue::Missing => None,
                            _ => Some(token.raw.as_str()),
                        };
                        Series::new(feature.as_str().into(), [value])
                    }
                    None => {
                        return Err(StudioError::InvalidSelection(format!(
                            "feature '{}' is not part of the trained model",
                            feature
                        )))
                    }
                };
                Ok(Column::from(series))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DataFrame::new(columns)?)
    }

    /// Lay the produced columns out in schema order; absent columns are 0.
    ///
    /// Produced names and the schema come from the same fitted preprocessor,
    /// so the row is taken as is when the layouts agree. Name matching is only
    /// used when they differ.
    fn reconcile(
        &self,
        produced: &[String],
        matrix: &Array2<f64>,
        warnings: &mut Vec<AlignmentWarning>,
    ) -> Array2<f64> {
        let schema = self.artifact.encoded_schema();
        if produced == schema.columns() && matrix.ncols() == schema.len() {
            return matrix.clone();
        }

        let mut row = Array2::zeros((1, schema.len()));
        let mut filled = vec![false; schema.len()];

        for (j, name) in produced.iter().enumerate() {
            match schema.position(name) {
                Some(pos) if !filled[pos] => {
                    row[[0, pos]] = matrix[[0, j]];
                    filled[pos] = true;
                }
                _ => warnings.push(AlignmentWarning::ExtraColumn {
                    column: name.clone(),
                }),
            }
        }

        for (pos, done) in filled.iter().enumerate() {
            if !done {
                warnings.push(AlignmentWarning::MissingColumn {
                    column: schema.columns()[pos].clone(),
                });
            }
        }

        row
    }
}
