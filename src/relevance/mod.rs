//! Feature relevance diagnostics
//!
//! Two read-only views over the dataset for a chosen target: the mean target
//! per category of one categorical column, and the absolute Pearson
//! correlation between the target and every other numeric column. Nothing
//! here is retained and nothing here fails; missing inputs produce empty
//! results.

use crate::dataset::Dataset;
use crate::schema::{classify, ColumnKind, SchemaReport};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Diagnostics for one target
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelevanceReport {
    /// Categorical columns that can be aggregated
    pub categorical_options: Vec<String>,
    /// `(category, mean target)` ordered by category
    pub category_means: Vec<(String, f64)>,
    /// `(column, |r|)` sorted by strength, strongest first
    pub correlations: Vec<(String, f64)>,
}

impl RelevanceReport {
    pub fn is_empty(&self) -> bool {
        self.categorical_options.is_empty()
            && self.category_means.is_empty()
            && self.correlations.is_empty()
    }
}

/// Build the relevance report. Returns an empty report when there is no
/// dataset, no target, or the target is not a numeric column.
pub fn report(
    dataset: Option<&Dataset>,
    target: Option<&str>,
    category: Option<&str>,
) -> RelevanceReport {
    let (dataset, target) = match (dataset, target.filter(|t| !t.is_empty())) {
        (Some(d), Some(t)) => (d, t),
        _ => return RelevanceReport::default(),
    };

    let schema = match classify(dataset) {
        Ok(schema) => schema,
        Err(e) => {
            warn!(error = %e, "Schema classification failed, returning empty report");
            return RelevanceReport::default();
        }
    };

    if schema.kind(target) != Some(ColumnKind::Numeric) {
        debug!(target, "Target is not a numeric column, returning empty report");
        return RelevanceReport::default();
    }

    let category_means = match category.filter(|c| !c.is_empty()) {
        Some(column) => category_means(dataset, target, column),
        None => Vec::new(),
    };

    RelevanceReport {
        categorical_options: schema.categorical_columns(),
        category_means,
        correlations: correlations(dataset, &schema, target),
    }
}

/// Mean target per value of `column`. Rows with a missing key are dropped;
/// groups without a single usable target value are absent.
pub fn category_means(dataset: &Dataset, target: &str, column: &str) -> Vec<(String, f64)> {
    let (keys, values) = match (dataset.text_values(column), dataset.numeric_values(target)) {
        (Ok(k), Ok(v)) => (k, v),
        _ => return Vec::new(),
    };

    let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for (key, value) in keys.into_iter().zip(values) {
        if let (Some(key), Some(value)) = (key, value) {
            let entry = groups.entry(key).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// Absolute Pearson correlation between the target and every other numeric column
pub fn correlations(dataset: &Dataset, schema: &SchemaReport, target: &str) -> Vec<(String, f64)> {
    let y = match dataset.numeric_values(target) {
        Ok(y) => y,
        Err(_) => return Vec::new(),
    };

    let mut result: Vec<(String, f64)> = schema
        .numeric_columns()
        .into_iter()
        .filter(|name| name != target)
        .filter_map(|name| {
            let x = dataset.numeric_values(&name).ok()?;
            let r = pearson_correlation(&x, &y)?;
            Some((name, r.abs()))
        })
        .collect();

    result.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    result
}

/// Pearson correlation over pairwise-complete observations. `None` when it is
/// undefined (fewer than two pairs or a constant side).
pub fn pearson_correlation(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom < 1e-12 {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}
