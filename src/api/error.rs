//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::pipeline::import::UploadError;
use crate::webhook::WebhookError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage failure: {0}")]
    StorageFailure(String),
    #[error("Record failure: {0}")]
    RecordFailure(String),
    #[error("Invalid payload")]
    InvalidPayload(Vec<String>),
    #[error("Rejected by receiver: {message}")]
    RejectedByReceiver { message: String, errors: Vec<String> },
    #[error("Delivery failure: {0}")]
    DeliveryFailure(String),
    #[error("Webhook submission is not configured")]
    WebhookDisabled,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, code, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::InvalidInput(detail) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", detail),
            ApiError::StorageFailure(detail) => {
                tracing::error!(detail, "Upload storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_FAILURE",
                    "The document could not be stored".to_string(),
                )
            }
            ApiError::RecordFailure(detail) => {
                tracing::error!(detail, "Upload record failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RECORD_FAILURE",
                    "The extraction record could not be created".to_string(),
                )
            }
            ApiError::InvalidPayload(errors) => {
                let message = format!("Payload has {} validation error(s)", errors.len());
                details = Some(errors);
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_PAYLOAD", message)
            }
            ApiError::RejectedByReceiver { message, errors } => {
                details = Some(errors);
                (StatusCode::UNPROCESSABLE_ENTITY, "REJECTED_BY_RECEIVER", message)
            }
            ApiError::DeliveryFailure(detail) => {
                tracing::error!(detail, "Webhook delivery failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "DELIVERY_FAILURE",
                    "The quote could not be delivered".to_string(),
                )
            }
            ApiError::WebhookDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "WEBHOOK_DISABLED",
                "Webhook submission is not configured".to_string(),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Unauthorized => ApiError::Unauthorized,
            UploadError::InvalidInput(detail) => ApiError::InvalidInput(detail),
            UploadError::StorageFailure(detail) => ApiError::StorageFailure(detail),
            UploadError::RecordFailure(detail) => ApiError::RecordFailure(detail),
        }
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::InvalidPayload(errors) => ApiError::InvalidPayload(errors),
            WebhookError::RejectedByReceiver { message, errors } => ApiError::RejectedByReceiver {
                message: message.unwrap_or_else(|| "The receiver rejected the quote".into()),
                errors,
            },
            WebhookError::DeliveryFailure(failure) => ApiError::DeliveryFailure(failure.to_string()),
            WebhookError::Client(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
