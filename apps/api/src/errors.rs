use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::matching::extract::ExtractError;

/// Which uploaded document an extraction error refers to. Clients need this
/// to know which file to replace when both sides were uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    Resume,
    JobDescription,
}

impl DocumentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentRole::Resume => "resume",
            DocumentRole::JobDescription => "job_description",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{} extraction failed: {source}", .document.as_str())]
    Extraction {
        document: DocumentRole,
        #[source]
        source: ExtractError,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn extraction(document: DocumentRole, source: ExtractError) -> Self {
        AppError::Extraction { document, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, document) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Extraction { document, source } => {
                let (status, code) = match source {
                    ExtractError::UnsupportedFormat(_) => {
                        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT")
                    }
                    ExtractError::Corrupt(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "CORRUPT_DOCUMENT")
                    }
                    ExtractError::Empty => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_DOCUMENT"),
                    ExtractError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, "EXTRACTION_TIMEOUT"),
                };
                (status, code, source.to_string(), Some(*document))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({ "code": code, "message": message });
        if let Some(document) = document {
            error["document"] = json!(document);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
