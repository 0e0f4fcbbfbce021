// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden - carries the authorization refusal reason code
    Forbidden { message: String, reason: &'static str },

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden { .. } => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden { message, .. } => message,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden { reason, .. } => reason,
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>, reason: &'static str) -> Self {
        ApiError::Forbidden {
            message: message.into(),
            reason,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert module-level error types to ApiError
impl From<crate::database::manager::DatastoreError> for ApiError {
    fn from(err: crate::database::manager::DatastoreError) -> Self {
        use crate::database::manager::DatastoreError;
        match err {
            DatastoreError::NotFound(msg) => ApiError::not_found(msg),
            DatastoreError::InvalidId(msg) => {
                ApiError::bad_request(format!("Invalid identifier: {}", msg))
            }
            DatastoreError::Conflict(msg) => ApiError::conflict(msg),
            DatastoreError::ConfigMissing(_) | DatastoreError::InvalidDatabaseUrl => {
                ApiError::service_unavailable("Datastore is not configured")
            }
            DatastoreError::Driver(e) => {
                // Don't expose driver internals to clients
                tracing::error!("MongoDB driver error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            DatastoreError::Encode(e) => {
                tracing::error!("BSON encode error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            DatastoreError::Decode(e) => {
                tracing::error!("BSON decode error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::identity::AuthError> for ApiError {
    fn from(err: crate::identity::AuthError) -> Self {
        use crate::identity::AuthError;
        match err {
            AuthError::InvalidToken(msg) => {
                ApiError::unauthorized(format!("Invalid token: {}", msg))
            }
            AuthError::WrongAudience { .. } => {
                ApiError::unauthorized("Token was issued for a different audience")
            }
            AuthError::Provider(msg) => {
                tracing::error!("Identity provider error: {}", msg);
                ApiError::service_unavailable("Identity provider unavailable")
            }
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<crate::authz::AuthzError> for ApiError {
    fn from(err: crate::authz::AuthzError) -> Self {
        use crate::authz::{AuthzError, DeniedReason};
        match err {
            AuthzError::Denied(reason) => match reason {
                DeniedReason::NotSignedIn => ApiError::unauthorized("Not signed in"),
                DeniedReason::NoMembership => ApiError::forbidden(
                    "You are not a member of this project",
                    "NO_MEMBERSHIP",
                ),
                DeniedReason::InsufficientRole => ApiError::forbidden(
                    "Your role does not permit this action",
                    "INSUFFICIENT_ROLE",
                ),
            },
            AuthzError::Store(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
