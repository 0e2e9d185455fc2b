//! Prediction for manually typed feature rows
//!
//! Raw comma-separated text is paired with the selected feature names, encoded
//! with the fitted preprocessor stored in the model artifact and reconciled
//! against the artifact's encoded schema before the regressor runs.

mod aligner;

pub use aligner::{
    parse_tokens, AlignedRow, AlignmentWarning, FeatureValue, ParsedToken, Prediction,
    PredictionAligner,
};
