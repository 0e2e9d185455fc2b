//! Error types for the server

use crate::error::{ErrorKind, StudioError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Studio(#[from] StudioError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Studio(e) => match e.kind() {
                ErrorKind::IngestParse => StatusCode::BAD_REQUEST,
                ErrorKind::StateMissing => StatusCode::CONFLICT,
                ErrorKind::SelectionMismatch | ErrorKind::InvalidSelection => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ErrorKind::Computation => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ServerError::Studio(e) => {
                if e.kind() == ErrorKind::Computation {
                    tracing::warn!(detail = %e, "Computation failed");
                }
                json!({
                    "error": true,
                    "kind": e.kind(),
                    "message": e.to_string(),
                })
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                json!({
                    "error": true,
                    "message": "An internal error occurred",
                })
            }
            other => json!({
                "error": true,
                "message": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
