//! Model training
//!
//! Fits the preprocessing pipeline and a gradient-boosted tree regressor on a
//! seeded train split, scores it on the held-out rows and packages the result
//! as an immutable [`ModelArtifact`].

mod artifact;
mod booster;
mod config;
mod engine;
mod metrics;
mod split;

pub use artifact::{EncodedSchema, ModelArtifact, ModelSummary, TrainingOutcome};
pub use booster::{BoostedTreeRegressor, BoosterConfig};
pub use config::TrainingConfig;
pub use engine::{validate_selection, TrainEngine};
pub use metrics::RegressionMetrics;
pub use split::{train_test_split, SplitIndices};
