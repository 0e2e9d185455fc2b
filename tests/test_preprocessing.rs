//! Integration test: Preprocessing pipeline end-to-end

use regression_studio::preprocessing::{
    DataPreprocessor, ImputeStrategy, Imputer, OneHotEncoder, PreprocessingConfig, ScalerType,
};
use polars::prelude::*;

fn sample_df() -> DataFrame {
    df!(
        "age" => &[Some(25.0), Some(30.0), None, Some(40.0), Some(45.0), Some(50.0)],
        "city" => &[Some("oslo"), Some("rome"), Some("oslo"), None, Some("lima"), Some("oslo")],
        "income" => &[30000.0, 45000.0, 55000.0, 70000.0, 80000.0, 90000.0],
    )
    .unwrap()
}

#[test]
fn test_preprocessing_fit_transform() {
    let df = sample_df();
    let mut preprocessor = DataPreprocessor::new();

    let out = preprocessor.fit_transform(&df).unwrap();
    assert_eq!(out.matrix.nrows(), 6, "row count should be preserved");
    assert_eq!(
        preprocessor.feature_names_out(),
        vec!["age", "income", "city_oslo", "city_rome", "city_lima"]
    );
    assert!(out.matrix.iter().all(|v| v.is_finite()), "no missing values remain");
    assert!(out.unknown.is_empty());
}

#[test]
fn test_numeric_columns_are_standardized() {
    let df = sample_df();
    let mut preprocessor = DataPreprocessor::with_config(
        PreprocessingConfig::default().with_scaler(ScalerType::Standard),
    );
    let out = preprocessor.fit_transform(&df).unwrap();

    let income = out.matrix.column(1);
    let mean = income.sum() / income.len() as f64;
    let var = income.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / income.len() as f64;
    assert!(mean.abs() < 1e-9);
    assert!((var - 1.0).abs() < 1e-9);
}

#[test]
fn test_preprocessing_minmax_scaler() {
    let df = sample_df();
    let config = PreprocessingConfig::default().with_scaler(ScalerType::MinMax);
    let mut preprocessor = DataPreprocessor::with_config(config);

    let out = preprocessor.fit_transform(&df).unwrap();
    let income = out.matrix.column(1);
    assert!((income[0] - 0.0).abs() < 1e-12);
    assert!((income[5] - 1.0).abs() < 1e-12);
}

#[test]
fn test_missing_category_takes_most_frequent() {
    let df = sample_df();
    let mut preprocessor = DataPreprocessor::new();
    let out = preprocessor.fit_transform(&df).unwrap();

    // Row 3 has no city; "oslo" is the mode
    let names = preprocessor.feature_names_out();
    let oslo = names.iter().position(|n| n == "city_oslo").unwrap();
    assert_eq!(out.matrix[[3, oslo]], 1.0);
}

#[test]
fn test_unknown_category_encodes_as_zeros() {
    let mut preprocessor = DataPreprocessor::new();
    preprocessor.fit(&sample_df()).unwrap();

    let row = df!(
        "age" => &[33.0],
        "city" => &["paris"],
        "income" => &[60000.0],
    )
    .unwrap();
    let out = preprocessor.transform(&row).unwrap();

    assert_eq!(out.matrix.ncols(), 5);
    assert!(out.matrix.row(0).iter().skip(2).all(|v| *v == 0.0));
    assert_eq!(out.unknown.len(), 1);
    assert_eq!(out.unknown[0].column, "city");
    assert_eq!(out.unknown[0].value, "paris");
}

#[test]
fn test_transform_before_fit_fails() {
    let preprocessor = DataPreprocessor::new();
    assert!(preprocessor.transform(&sample_df()).is_err());
}

#[test]
fn test_transform_missing_column_fails() {
    let mut preprocessor = DataPreprocessor::new();
    preprocessor.fit(&sample_df()).unwrap();

    let partial = df!("age" => &[33.0], "income" => &[1.0]).unwrap();
    assert!(preprocessor.transform(&partial).is_err());
}

#[test]
fn test_imputer_strategies() {
    let df = df!("x" => &[Some(1.0), None, Some(3.0), Some(3.0), Some(10.0)]).unwrap();

    let mut mean = Imputer::new(ImputeStrategy::Mean);
    let filled = mean.fit_transform(&df, &["x"]).unwrap();
    let values: Vec<f64> = filled.column("x").unwrap().f64().unwrap().into_no_null_iter().collect();
    assert_eq!(values[1], 4.25);

    let mut median = Imputer::new(ImputeStrategy::Median);
    median.fit(&df, &["x"]).unwrap();
    assert_eq!(median.fill_value("x").as_deref(), Some("3"));

    let mut mode = Imputer::new(ImputeStrategy::MostFrequent);
    mode.fit(&df, &["x"]).unwrap();
    assert_eq!(mode.fill_value("x").as_deref(), Some("3"));
}

#[test]
fn test_encoder_keeps_first_seen_order() {
    let df = df!("color" => &["blue", "red", "blue", "green"]).unwrap();
    let mut encoder = OneHotEncoder::new();
    let block = encoder.fit_transform(&df, &["color"]).unwrap();

    assert_eq!(block.names, vec!["color_blue", "color_red", "color_green"]);
    assert_eq!(block.columns[0], vec![1.0, 0.0, 1.0, 0.0]);
    assert_eq!(block.columns[2], vec![0.0, 0.0, 0.0, 1.0]);
}
