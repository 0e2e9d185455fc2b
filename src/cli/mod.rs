//! Regression Studio CLI Module
//!
//! Command-line interface for inspecting a CSV, training on it and serving
//! the HTTP API.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::session::{feedback, Session};
use crate::training::TrainingConfig;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}
fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}
fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}
fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}
fn fail(s: &str) -> ColoredString {
    s.truecolor(230, 100, 100)
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_fail(msg: &str) {
    println!("  {} {}", fail("✗"), msg);
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "regression-studio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Upload a table, pick a numeric target, train a boosted regressor, predict")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Server port
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Server host
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Training configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show column types and, for a target, the relevance report
    Inspect {
        /// Input CSV file
        data: PathBuf,

        /// Numeric target column
        #[arg(short, long)]
        target: Option<String>,

        /// Categorical column to aggregate the target by
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Train a model and optionally predict one row
    Train {
        /// Input CSV file
        data: PathBuf,

        /// Numeric target column
        #[arg(short, long)]
        target: String,

        /// Feature columns, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        features: Vec<String>,

        /// Comma separated feature values to predict after training
        #[arg(long)]
        predict: Option<String>,

        /// Training configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Read the training configuration, falling back to defaults
pub fn load_training_config(path: Option<&Path>) -> anyhow::Result<TrainingConfig> {
    match path {
        Some(path) => TrainingConfig::load(path)
            .with_context(|| format!("failed to load training config from {}", path.display())),
        None => Ok(TrainingConfig::default()),
    }
}

fn ingest_file(session: &Session, path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let result = session.ingest(&name, &bytes);
    let message = feedback::upload_feedback(&result);
    match result {
        Ok(_) => {
            step_ok(&message);
            Ok(())
        }
        Err(e) => {
            step_fail(&message);
            Err(e.into())
        }
    }
}

// ─── Inspect ───────────────────────────────────────────────────────────────────

pub fn cmd_inspect(data: &Path, target: Option<&str>, category: Option<&str>) -> anyhow::Result<()> {
    let session = Session::new();
    section("Dataset");
    ingest_file(&session, data)?;

    let schema = session.schema()?;
    println!();
    println!(
        "  {:<20} {:<12} {:<12} {:>6} {:>8}",
        muted("Column"),
        muted("Kind"),
        muted("Type"),
        muted("Nulls"),
        muted("Unique")
    );
    println!("  {}", dim(&"─".repeat(62)));
    for col in &schema.columns {
        println!(
            "  {:<20} {:<12} {:<12} {:>6} {:>8}",
            col.name,
            format!("{:?}", col.kind),
            col.dtype.truecolor(140, 140, 140),
            col.null_count,
            col.unique_count
        );
    }

    println!();
    println!("  {:<12} {}", muted("Targets"), schema.target_candidates().join(", "));
    println!("  {:<12} {}", muted("Features"), schema.feature_candidates().join(", "));

    let Some(target) = target else {
        return Ok(());
    };

    let report = session.report(Some(target), category);
    section(&format!("Relevance of {}", target));
    if report.is_empty() {
        println!("  {}", dim("no report: target is not a numeric column"));
        return Ok(());
    }

    if let Some(category) = category {
        println!("  {}", accent(&format!("Mean {} by {}", target, category)));
        for (key, mean) in &report.category_means {
            println!("    {:<24} {:>12.4}", key, mean);
        }
        println!();
    }

    println!("  {}", accent("Absolute correlation with target"));
    if report.correlations.is_empty() {
        println!("    {}", dim("no other numeric columns"));
    }
    for (name, r) in &report.correlations {
        println!("    {:<24} {:>8.4}", name, r);
    }
    println!();
    Ok(())
}

// ─── Train ─────────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data: &Path,
    target: &str,
    features: &[String],
    predict: Option<&str>,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_training_config(config)?;
    let session = Session::with_config(config);

    section("Training");
    ingest_file(&session, data)?;

    let start = Instant::now();
    let result = session.train(Some(target), features);
    let message = feedback::training_feedback(&result);
    let outcome = match result {
        Ok(outcome) => {
            step_ok(&format!("{} {}", message, dim(&format!("({:.2}s)", start.elapsed().as_secs_f64()))));
            outcome
        }
        Err(e) => {
            step_fail(&message);
            return Err(e.into());
        }
    };

    println!();
    println!("  {:<12} {}", muted("Model"), outcome.model_id);
    println!("  {:<12} {} / {}", muted("Train/test"), outcome.n_train, outcome.n_test);
    println!("  {:<12} {:.4}", muted("RMSE"), outcome.metrics.rmse);
    println!("  {:<12} {:.4}", muted("MAE"), outcome.metrics.mae);

    let mut importances = outcome.feature_importances.clone();
    importances.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    if !importances.is_empty() {
        println!();
        println!("  {}", accent("Split importance"));
        for (name, value) in importances.iter().take(10) {
            println!("    {:<24} {:>8.4}", name, value);
        }
    }

    if let Some(raw) = predict {
        section("Prediction");
        let result = session.predict(raw, features);
        let message = feedback::prediction_feedback(&result);
        match result {
            Ok(prediction) => {
                step_ok(&message);
                for warning in &prediction.warnings {
                    println!("  {} {}", accent("!"), warning);
                }
            }
            Err(e) => {
                step_fail(&message);
                return Err(e.into());
            }
        }
    }

    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: &str, port: u16, config: Option<&Path>) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let training = load_training_config(config)?;

    section("Regression Studio");
    println!("  {:<10} {}", muted("API"), format!("http://{}:{}/api", host, port));
    println!("  {:<10} {}", muted("Health"), format!("http://{}:{}/api/health", host, port));
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    let config = ServerConfig::default().with_host(host).with_port(port);
    run_server(config, Session::with_config(training)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_command() {
        let cli = Cli::try_parse_from([
            "regression-studio",
            "train",
            "houses.csv",
            "--target",
            "price",
            "--features",
            "size,color",
            "--predict",
            "10,red",
        ])
        .unwrap();

        match cli.command {
            Commands::Train { data, target, features, predict, config } => {
                assert_eq!(data, PathBuf::from("houses.csv"));
                assert_eq!(target, "price");
                assert_eq!(features, vec!["size", "color"]);
                assert_eq!(predict.as_deref(), Some("10,red"));
                assert!(config.is_none());
            }
            _ => panic!("expected train command"),
        }
    }

    #[test]
    fn test_train_requires_features() {
        assert!(Cli::try_parse_from(["regression-studio", "train", "a.csv", "--target", "y"]).is_err());
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["regression-studio", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { port, host, config } => {
                assert_eq!(port, 8080);
                assert_eq!(host, "0.0.0.0");
                assert!(config.is_none());
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_cmd_train_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("houses.csv");
        let mut csv = String::from("size,color,price\n");
        for i in 0..15 {
            csv.push_str(&format!("{},{},{}\n", 10 + i, ["red", "blue"][i % 2], 100 + 7 * i));
        }
        std::fs::write(&path, csv).unwrap();

        let features = vec!["size".to_string(), "color".to_string()];
        cmd_train(&path, "price", &features, Some("12,red"), None).unwrap();
        assert!(cmd_train(&path, "price", &features, Some("12"), None).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(load_training_config(Some(Path::new("/nonexistent/config.json"))).is_err());
    }
}
