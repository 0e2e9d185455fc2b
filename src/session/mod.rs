//! Session state: the current dataset and the current model
//!
//! A [`Session`] is the explicit context every surface talks to. The dataset
//! and the model artifact are each held as `Option<Arc<_>>` behind a
//! `parking_lot::RwLock`. Readers take one snapshot of the `Arc` per
//! operation. Writers (ingest, train) serialize on a separate mutex, do their
//! work without holding the data locks and swap the result in at the end, so
//! a failed write never disturbs what is installed.

pub mod feedback;

use crate::dataset::{Dataset, DatasetSummary};
use crate::error::{MissingState, Result, StudioError};
use crate::inference::{Prediction, PredictionAligner};
use crate::relevance::{self, RelevanceReport};
use crate::schema::{classify, SchemaReport};
use crate::training::{ModelArtifact, TrainEngine, TrainingConfig, TrainingOutcome};
use parking_lot::{Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Dataset + model context shared by every surface
#[derive(Default)]
pub struct Session {
    dataset: RwLock<Option<Arc<Dataset>>>,
    model: RwLock<Option<Arc<ModelArtifact>>>,
    writer: Mutex<()>,
    engine: TrainEngine,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose training runs use `config`
    pub fn with_config(config: TrainingConfig) -> Self {
        Self {
            engine: TrainEngine::new(config),
            ..Self::default()
        }
    }

    pub fn training_config(&self) -> &TrainingConfig {
        self.engine.config()
    }

    /// Parse an upload and make it the current dataset. On failure the
    /// previous dataset stays installed.
    pub fn ingest(&self, name: &str, bytes: &[u8]) -> Result<DatasetSummary> {
        self.load(name, bytes).map(|dataset| dataset.summary())
    }

    /// Same as [`Session::ingest`], returning the installed snapshot so
    /// callers can derive everything else from that one dataset
    pub fn load(&self, name: &str, bytes: &[u8]) -> Result<Arc<Dataset>> {
        let _guard = self.writer.lock();

        let dataset = match Dataset::from_csv_bytes(name, bytes) {
            Ok(dataset) => Arc::new(dataset),
            Err(e) => {
                warn!(file = name, error = %e, "Upload rejected");
                return Err(e);
            }
        };

        *self.dataset.write() = Some(Arc::clone(&dataset));

        info!(
            dataset_id = dataset.id(),
            file = name,
            rows = dataset.height(),
            columns = dataset.width(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Snapshot of the current dataset
    pub fn dataset(&self) -> Option<Arc<Dataset>> {
        self.dataset.read().clone()
    }

    /// Snapshot of the current model
    pub fn model(&self) -> Option<Arc<ModelArtifact>> {
        self.model.read().clone()
    }

    pub fn schema(&self) -> Result<SchemaReport> {
        let dataset = self
            .dataset()
            .ok_or(StudioError::StateMissing(MissingState::Dataset))?;
        classify(&dataset)
    }

    /// Numeric columns in file order; empty without a dataset
    pub fn target_options(&self) -> Vec<String> {
        self.schema()
            .map(|s| s.target_candidates())
            .unwrap_or_default()
    }

    /// Numeric then categorical columns; empty without a dataset
    pub fn feature_options(&self) -> Vec<String> {
        self.schema()
            .map(|s| s.feature_candidates())
            .unwrap_or_default()
    }

    pub fn categorical_options(&self) -> Vec<String> {
        self.schema()
            .map(|s| s.categorical_columns())
            .unwrap_or_default()
    }

    pub fn report(&self, target: Option<&str>, category: Option<&str>) -> RelevanceReport {
        let dataset = self.dataset();
        relevance::report(dataset.as_deref(), target, category)
    }

    /// Train on the current dataset and install the new artifact
    pub fn train(&self, target: Option<&str>, features: &[String]) -> Result<TrainingOutcome> {
        let _guard = self.writer.lock();

        let dataset = self
            .dataset()
            .ok_or(StudioError::StateMissing(MissingState::Dataset))?;
        let target = target
            .filter(|t| !t.is_empty())
            .ok_or(StudioError::StateMissing(MissingState::Target))?;
        if features.is_empty() {
            return Err(StudioError::StateMissing(MissingState::Features));
        }

        let artifact = guarded("training", || self.engine.fit(&dataset, target, features))
            .map_err(|e| {
                warn!(target, error = %e, "Training failed; previous model kept");
                e
            })?;

        let outcome = artifact.outcome();
        *self.model.write() = Some(Arc::new(artifact));
        Ok(outcome)
    }

    /// Predict one row of comma-separated values with the current model
    pub fn predict(&self, raw: &str, features: &[String]) -> Result<Prediction> {
        let model = self
            .model()
            .ok_or(StudioError::StateMissing(MissingState::Model))?;

        guarded("prediction", || PredictionAligner::new(&model).predict(raw, features))
    }
}

/// Run `f`, turning a panic into a computation error
fn guarded<T>(operation: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(operation, detail = %detail, "Panic caught");
            Err(StudioError::Computation(format!("{} panicked: {}", operation, detail)))
        }
    }
}
