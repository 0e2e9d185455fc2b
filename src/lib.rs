//! Regression Studio - interactive tabular regression
//!
//! Upload a CSV, pick a numeric target and a set of features, train a
//! gradient-boosted tree regressor on a seeded split, then predict from a
//! typed-in comma-separated row.
//!
//! # Modules
//!
//! ## Data
//! - [`dataset`] - CSV ingestion into an immutable table
//! - [`schema`] - Numeric / categorical column classification
//! - [`relevance`] - Category means and target correlations
//!
//! ## Modelling
//! - [`preprocessing`] - Imputation, scaling and one-hot encoding
//! - [`training`] - Split, fit, score and package a model artifact
//! - [`inference`] - Align a raw input row with the trained encoding
//!
//! ## Services
//! - [`session`] - Shared dataset / model state behind every surface
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data
pub mod dataset;
pub mod schema;
pub mod relevance;

// Modelling
pub mod preprocessing;
pub mod training;
pub mod inference;

// Services
pub mod session;
pub mod server;
pub mod cli;

pub use error::{ErrorKind, Result, StudioError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ErrorKind, MissingState, Result, StudioError};

    // Data
    pub use crate::dataset::{Dataset, DatasetSummary};
    pub use crate::schema::{ColumnKind, SchemaReport};
    pub use crate::relevance::RelevanceReport;

    // Preprocessing
    pub use crate::preprocessing::{DataPreprocessor, PreprocessingConfig, ScalerType};

    // Training
    pub use crate::training::{
        BoosterConfig, ModelArtifact, RegressionMetrics, TrainEngine, TrainingConfig,
        TrainingOutcome,
    };

    // Inference
    pub use crate::inference::{AlignmentWarning, Prediction, PredictionAligner};

    // Session
    pub use crate::session::Session;
}
