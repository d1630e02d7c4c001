use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::editing::EditError;
use crate::transfer::ImportError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant is raised before the session is touched, so a failed request
/// leaves the session as it was.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed path: {0}")]
    MalformedPath(String),

    #[error("Incompatible value: {0}")]
    IncompatibleValue(String),

    #[error("Import rejected: {0}")]
    ImportSchema(#[from] ImportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<EditError> for AppError {
    fn from(e: EditError) -> Self {
        match e {
            EditError::MalformedPath { .. } => AppError::MalformedPath(e.to_string()),
            EditError::IncompatibleValue { .. } => AppError::IncompatibleValue(e.to_string()),
            EditError::Encode(inner) => AppError::Internal(inner.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MalformedPath(msg) => {
                tracing::warn!("Rejected edit: {msg}");
                (StatusCode::BAD_REQUEST, "MALFORMED_PATH", msg.clone())
            }
            AppError::IncompatibleValue(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INCOMPATIBLE_VALUE",
                msg.clone(),
            ),
            AppError::ImportSchema(e) => (
                StatusCode::BAD_REQUEST,
                "IMPORT_SCHEMA_ERROR",
                format!("Invalid JSON structure: {e}"),
            ),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::FieldPath;

    #[test]
    fn test_edit_errors_map_to_distinct_variants() {
        let malformed = FieldPath::parse("").unwrap_err();
        assert!(matches!(AppError::from(malformed), AppError::MalformedPath(_)));

        let doc = crate::models::ResumeDocument::sample();
        let incompatible =
            crate::editing::path::set(&doc, &FieldPath::parse("name").unwrap(), json!([1]))
                .unwrap_err();
        assert!(matches!(
            AppError::from(incompatible),
            AppError::IncompatibleValue(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::MalformedPath("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::IncompatibleValue("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::ImportSchema(ImportError::MissingKey("settings")),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
