//! Training configuration

use super::BoosterConfig;
use crate::error::{Result, StudioError};
use crate::preprocessing::PreprocessingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of usable rows held out for scoring
    pub test_size: f64,

    /// Seed of the train/test shuffle
    pub random_state: u64,

    /// Imputation / scaling settings
    pub preprocessing: PreprocessingConfig,

    /// Regressor hyperparameters
    pub booster: BoosterConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            preprocessing: PreprocessingConfig::default(),
            booster: BoosterConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set the split seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set preprocessing settings
    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    /// Builder method to set booster hyperparameters
    pub fn with_booster(mut self, booster: BoosterConfig) -> Self {
        self.booster = booster;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(StudioError::Computation(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        self.booster.validate()
    }

    /// Read a configuration from a JSON file; missing fields take defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.booster.n_estimators, 200);
        assert_eq!(config.booster.max_depth, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(TrainingConfig::new().with_test_size(0.0).validate().is_err());
        assert!(TrainingConfig::new().with_test_size(1.0).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainingConfig = serde_json::from_str(r#"{"test_size": 0.25}"#).unwrap();
        assert_eq!(config.test_size, 0.25);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.booster, BoosterConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.json");
        let config = TrainingConfig::new()
            .with_random_state(7)
            .with_booster(BoosterConfig::default().with_n_estimators(10));
        config.save(&path).unwrap();

        let loaded = TrainingConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
