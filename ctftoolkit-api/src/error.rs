/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `ApiResult<T>`; errors render as a failed
/// [`Envelope`](crate::envelope::Envelope) with the matching status code.
///
/// Internal errors carry two messages: a generic one returned to the client
/// and a detailed one that is only logged.
///
/// # Example
///
/// ```
/// use ctftoolkit_api::error::{ApiError, ApiResult};
///
/// fn require_text(text: &str) -> ApiResult<&str> {
///     if text.is_empty() {
///         return Err(ApiError::BadRequest("Text is required".to_string()));
///     }
///     Ok(text)
/// }
/// ```

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ctftoolkit_shared::{
    auth::{jwt::JwtError, middleware::AuthError, password::PasswordError},
    db::StoreError,
    tools::DispatchError,
    uploads::UploadError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::envelope::Envelope;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate username
    Conflict(String),

    /// Validation errors (400) with per-field details
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    ///
    /// `message` is returned to the client, `detail` is only logged.
    InternalError { message: String, detail: String },
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ApiError {
    /// Internal error with a client-facing message and a logged detail
    pub fn internal(message: impl Into<String>, detail: impl fmt::Display) -> Self {
        ApiError::InternalError {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError { message, detail } => {
                write!(f, "Internal error: {} ({})", message, detail)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let envelope = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => Envelope::failure(msg),
            ApiError::ValidationError(errors) => Envelope::failure("Validation failed")
                .with_data(serde_json::to_value(errors).unwrap_or_default()),
            ApiError::InternalError { message, detail } => {
                // Log internal errors but don't expose details to clients
                tracing::error!(error = %detail, "{}", message);
                Envelope::failure(message)
            }
        };

        (status, Json(envelope)).into_response()
    }
}

/// Convert validator errors into a field-by-field listing
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        tracing::debug!(error = %err, "Rejected JSON body");
        ApiError::BadRequest("Invalid request body".to_string())
    }
}

impl From<FormRejection> for ApiError {
    fn from(err: FormRejection) -> Self {
        tracing::debug!(error = %err, "Rejected form body");
        ApiError::BadRequest("Invalid request body".to_string())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        tracing::debug!(error = %err, "Rejected multipart body");
        ApiError::BadRequest("Invalid multipart request".to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        tracing::debug!(error = %err, "Malformed multipart field");
        ApiError::BadRequest("Invalid multipart request".to_string())
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(_) => ApiError::internal("Failed to generate token", err),
            _ => ApiError::Unauthorized("Invalid or expired token".to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::internal("An internal error occurred", err)
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => ApiError::Conflict(err.to_string()),
            StoreError::Backend(_) => ApiError::internal("Database error", err),
        }
    }
}

/// Convert dispatch errors to API errors
///
/// Every failure is a generic 500; stderr and exit codes stay in the logs.
impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::InvalidOutput { .. } => ApiError::internal("Failed to parse result", err),
            _ => ApiError::internal("Tool execution failed", err),
        }
    }
}

/// Convert upload errors to API errors
impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidFileName(_) => ApiError::BadRequest("Invalid file name".to_string()),
            _ => ApiError::internal("Failed to save uploaded file", err),
        }
    }
}
