//! Display strings for the outcome of session operations

use crate::dataset::DatasetSummary;
use crate::error::{MissingState, Result, StudioError};
use crate::inference::Prediction;
use crate::training::TrainingOutcome;

pub const NO_UPLOAD: &str = "No file uploaded.";
pub const TRAIN_PROMPT: &str = "Click 'Train Model' to start training.";

/// `Uploaded file: houses.csv (Rows: 20, Columns: 3)` or the parse error
pub fn upload_feedback(result: &Result<DatasetSummary>) -> String {
    match result {
        Ok(summary) => format!(
            "Uploaded file: {} (Rows: {}, Columns: {})",
            summary.name, summary.rows, summary.columns
        ),
        Err(StudioError::IngestParse(msg)) => format!("Error reading file: {}", msg),
        Err(e) => format!("Error reading file: {}", e),
    }
}

/// `Model trained successfully! R^2 score: 0.1234` or the failure
pub fn training_feedback(result: &Result<TrainingOutcome>) -> String {
    match result {
        Ok(outcome) => format!("Model trained successfully! R^2 score: {:.4}", outcome.r2),
        Err(e @ StudioError::StateMissing(_)) => e.to_string(),
        Err(e) => format!("Error during training: {}", e),
    }
}

/// `Prediction: 123.4` or the failure
pub fn prediction_feedback(result: &Result<Prediction>) -> String {
    match result {
        Ok(prediction) => format!("Prediction: {}", format_value(prediction.value)),
        Err(StudioError::StateMissing(MissingState::Input)) => MissingState::Input.to_string(),
        Err(e @ (StudioError::StateMissing(_) | StudioError::SelectionMismatch { .. })) => {
            e.to_string()
        }
        Err(e) => format!("Error: {}", e),
    }
}

/// Render a float the way a plain decimal repr does: integral values keep `.0`
fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
