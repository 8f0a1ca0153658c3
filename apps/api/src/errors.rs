#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::enhancement::enhancer::EnhanceError;

/// The generic retryable message shown for every upstream failure.
/// Malformed payloads get the same user-visible text but are logged distinctly.
const RETRY_MESSAGE: &str = "Connection timeout. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Enhancement error: {0}")]
    Enhance(#[from] EnhanceError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Enhance(e) => match e {
                EnhanceError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                EnhanceError::Busy => (
                    StatusCode::CONFLICT,
                    "ENHANCEMENT_IN_PROGRESS",
                    "An enhancement is already running for this session".to_string(),
                ),
                EnhanceError::Superseded => (
                    StatusCode::CONFLICT,
                    "SUPERSEDED",
                    "The request was superseded by a newer one".to_string(),
                ),
                EnhanceError::Timeout => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "UPSTREAM_TIMEOUT",
                    RETRY_MESSAGE.to_string(),
                ),
                EnhanceError::Unavailable(source) => {
                    tracing::warn!("model unavailable: {source}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_UNAVAILABLE",
                        RETRY_MESSAGE.to_string(),
                    )
                }
                EnhanceError::EmptyResponse => (
                    StatusCode::BAD_GATEWAY,
                    "EMPTY_COMPLETION",
                    RETRY_MESSAGE.to_string(),
                ),
                EnhanceError::Malformed(detail) => {
                    tracing::error!("malformed model response: {detail}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "MALFORMED_COMPLETION",
                        RETRY_MESSAGE.to_string(),
                    )
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
