//! HTTP request handlers

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::error::{MissingState, StudioError};
use crate::schema::classify;
use crate::session::{feedback, Session};

use super::error::{Result, ServerError};
use super::state::AppState;

/// Run a blocking session operation off the async runtime
async fn blocking<T, F>(session: &Arc<Session>, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Session) -> T + Send + 'static,
{
    let session = Arc::clone(session);
    tokio::task::spawn_blocking(move || op(&session))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))
}

// ============================================================================
// Data Handlers
// ============================================================================

/// Upload a CSV file and make it the current dataset
pub async fn upload_data(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        let file_name = field.file_name().unwrap_or("data.csv").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;

        info!(file = %file_name, bytes = data.len(), "Received upload");

        let name = file_name.clone();
        let (dataset, schema) = blocking(&state.session, move |s| {
            let dataset = s.load(&name, &data)?;
            let schema = classify(&dataset)?;
            Ok::<_, StudioError>((dataset, schema))
        })
        .await??;
        let summary = dataset.summary();

        return Ok(Json(json!({
            "success": true,
            "message": feedback::upload_feedback(&Ok(summary.clone())),
            "dataset": summary,
            "target_options": schema.target_candidates(),
            "feature_options": schema.feature_candidates(),
        })));
    }

    Err(ServerError::BadRequest(feedback::NO_UPLOAD.to_string()))
}

/// Column classification of the current dataset
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>> {
    let dataset = state
        .session
        .dataset()
        .ok_or(StudioError::StateMissing(MissingState::Dataset))?;
    let schema = classify(&dataset)?;

    Ok(Json(json!({
        "dataset": dataset.summary(),
        "target_options": schema.target_candidates(),
        "feature_options": schema.feature_candidates(),
        "categorical_options": schema.categorical_columns(),
        "columns": schema.columns,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub target: Option<String>,
    pub category: Option<String>,
}

/// Relevance diagnostics for a target
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<serde_json::Value>> {
    let report = state
        .session
        .report(query.target.as_deref(), query.category.as_deref());
    Ok(Json(serde_json::to_value(report).map_err(|e| ServerError::Internal(e.to_string()))?))
}

// ============================================================================
// Training / Inference Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub target: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

pub async fn start_training(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TrainRequest>,
) -> Result<Json<serde_json::Value>> {
    let result = blocking(&state.session, move |s| {
        s.train(request.target.as_deref(), &request.features)
    })
    .await?;
    let message = feedback::training_feedback(&result);
    let outcome = result?;

    Ok(Json(json!({
        "success": true,
        "message": message,
        "outcome": outcome,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub features: Vec<String>,
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<serde_json::Value>> {
    let result = blocking(&state.session, move |s| s.predict(&request.input, &request.features)).await?;
    let message = feedback::prediction_feedback(&result);
    let prediction = result?;

    Ok(Json(json!({
        "success": true,
        "message": message,
        "value": prediction.value,
        "warnings": prediction.warnings,
    })))
}

/// Description of the installed model
pub async fn get_model(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>> {
    let model = state
        .session
        .model()
        .ok_or_else(|| ServerError::NotFound(MissingState::Model.to_string()))?;
    Ok(Json(serde_json::to_value(model.summary()).map_err(|e| ServerError::Internal(e.to_string()))?))
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime_secs(),
        "dataset_loaded": state.session.dataset().is_some(),
        "model_loaded": state.session.model().is_some(),
    }))
}
