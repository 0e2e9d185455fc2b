//! Feature preprocessing
//!
//! Turns a mixed numeric/categorical feature frame into a dense matrix:
//! - Missing value imputation (mean / median / most frequent / constant)
//! - Feature scaling (standard, min-max)
//! - One-hot encoding with a fixed, first-observed category order

mod config;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use config::PreprocessingConfig;
pub use encoder::{CategoryVocabulary, EncodedBlock, OneHotEncoder, UnknownCategory};
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::{DataPreprocessor, TransformedFeatures};
pub use scaler::{Scaler, ScalerType};
