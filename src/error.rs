//! Error taxonomy for the expense API and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validate::ValidationErrors;

/// Errors surfaced by the expense service to the REST boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The creation payload failed validation; carries field-level detail.
    #[error("invalid input")]
    InvalidInput(ValidationErrors),

    /// Delete was requested without an id.
    #[error("missing identifier")]
    MissingIdentifier,

    /// No record with the requested id exists.
    #[error("expense not found")]
    NotFound,

    /// The persistence layer failed.
    #[error("store failure: {0}")]
    StoreFailure(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidInput(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": { "fieldErrors": errors.field_errors } })),
            )
                .into_response(),
            ApiError::MissingIdentifier => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "ID is required" })),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Expense not found" })),
            )
                .into_response(),
            ApiError::StoreFailure(e) => {
                error!("Store failure: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
