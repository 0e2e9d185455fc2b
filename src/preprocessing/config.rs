//! Preprocessing configuration

use super::{ImputeStrategy, ScalerType};
use serde::{Deserialize, Serialize};

/// Configuration for feature preprocessing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Strategy for handling missing numeric values
    pub numeric_impute_strategy: ImputeStrategy,

    /// Strategy for handling missing categorical values
    pub categorical_impute_strategy: ImputeStrategy,

    /// Type of scaler to use for numeric features
    pub scaler_type: ScalerType,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            numeric_impute_strategy: ImputeStrategy::Mean,
            categorical_impute_strategy: ImputeStrategy::MostFrequent,
            scaler_type: ScalerType::Standard,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set numeric impute strategy
    pub fn with_numeric_impute(mut self, strategy: ImputeStrategy) -> Self {
        self.numeric_impute_strategy = strategy;
        self
    }

    /// Builder method to set categorical impute strategy
    pub fn with_categorical_impute(mut self, strategy: ImputeStrategy) -> Self {
        self.categorical_impute_strategy = strategy;
        self
    }

    /// Builder method to set scaler type
    pub fn with_scaler(mut self, scaler_type: ScalerType) -> Self {
        self.scaler_type = scaler_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreprocessingConfig::default();
        assert_eq!(config.numeric_impute_strategy, ImputeStrategy::Mean);
        assert_eq!(config.categorical_impute_strategy, ImputeStrategy::MostFrequent);
        assert_eq!(config.scaler_type, ScalerType::Standard);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PreprocessingConfig::new()
            .with_scaler(ScalerType::MinMax)
            .with_numeric_impute(ImputeStrategy::Median)
            .with_categorical_impute(ImputeStrategy::ConstantString("missing".into()));

        assert_eq!(config.scaler_type, ScalerType::MinMax);
        assert_eq!(config.numeric_impute_strategy, ImputeStrategy::Median);
        assert!(matches!(
            config.categorical_impute_strategy,
            ImputeStrategy::ConstantString(ref s) if s == "missing"
        ));
    }

    #[test]
    fn test_config_json() {
        let config = PreprocessingConfig::new().with_scaler(ScalerType::None);
        let json = serde_json::to_string(&config).unwrap();
        let back: PreprocessingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
