//! API error types with structured JSON responses.
//!
//! Every failure leaves the service as `{"error": ..., "details"?: ...}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::advisory::AdvisoryError;
use crate::core_state::CoreError;
use crate::db::DatabaseError;

/// Context reported when a chat-completion call fails.
pub const UPSTREAM_CONTEXT: &str = "Together API Error";
/// Context reported when consent analysis fails upstream.
pub const ANALYSIS_CONTEXT: &str = "Analysis failed";

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{context}: {details}")]
    Upstream { context: &'static str, details: Value },
    #[error("Invalid AI response format")]
    InvalidFormat,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map an advisory failure, naming the operation that failed.
    pub fn advisory(err: AdvisoryError, context: &'static str) -> Self {
        match err {
            AdvisoryError::InvalidFormat(_) => ApiError::InvalidFormat,
            AdvisoryError::Upstream { body, .. } => ApiError::Upstream {
                context,
                details: upstream_details(body),
            },
            AdvisoryError::AccessRules { .. } => ApiError::Internal(err.to_string()),
            other => ApiError::Upstream {
                context,
                details: Value::String(other.to_string()),
            },
        }
    }
}

/// Relay the upstream body as JSON when it is JSON, as a string otherwise.
fn upstream_details(body: String) -> Value {
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    details: None,
                },
            ),
            ApiError::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    error: message,
                    details: None,
                },
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: message,
                    details: None,
                },
            ),
            ApiError::Upstream { context, details } => {
                tracing::error!(context, %details, "upstream call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: context.to_string(),
                        details: Some(details),
                    },
                )
            }
            ApiError::InvalidFormat => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Invalid AI response format".to_string(),
                    details: None,
                },
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Internal server error".to_string(),
                        details: Some(Value::String(detail)),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, .. } => {
                ApiError::NotFound(format!("{entity_type} not found"))
            }
            DatabaseError::ConstraintViolation(detail) => ApiError::BadRequest(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AdvisoryError> for ApiError {
    fn from(err: AdvisoryError) -> Self {
        ApiError::advisory(err, UPSTREAM_CONTEXT)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Database(e) => e.into(),
            CoreError::Advisory(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
