// Client-side API error types
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure of a call against the back-office API, classified by HTTP status
/// so callers can tell bad credentials from an expired session from a
/// plain server fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 401 Unauthorized (invalid credentials or no session at all)
    #[error("{0}")]
    Unauthorized(String),

    // 403 Forbidden (the API also uses this for an expired access token)
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 409 Conflict
    #[error("{0}")]
    Conflict(String),

    // 422 Unprocessable Entity
    #[error("{0}")]
    Unprocessable(String),

    // Any other non-success status (5xx included)
    #[error("{message}")]
    Status { status: u16, message: String },

    // The request never produced an HTTP response
    #[error("network error: {0}")]
    Transport(String),

    // A response arrived but did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    // Rejected locally before anything was sent
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: BTreeMap<String, String>,
    },
}

impl ApiError {
    /// Build an error from a non-success response, preferring the server's
    /// own `error` / `message` text.
    pub fn from_status(status: u16, body: &Value) -> Self {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .or_else(|| body.get("message").and_then(Value::as_str))
            .or_else(|| body.as_str().filter(|s| !s.trim().is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| default_message(status).to_string());

        match status {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            422 => ApiError::Unprocessable(message),
            _ => ApiError::Status { status, message },
        }
    }

    /// HTTP status code, when the error came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest(_) => Some(400),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Conflict(_) => Some(409),
            ApiError::Unprocessable(_) => Some(422),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::Validation { .. } => None,
        }
    }

    /// User-facing message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::Transport(msg)
            | ApiError::Decode(msg) => msg,
            ApiError::Status { message, .. } => message,
            ApiError::Validation { message, .. } => message,
        }
    }

    /// Stable code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Unprocessable(_) => "UNPROCESSABLE_ENTITY",
            ApiError::Status { status, .. } if *status >= 500 => "SERVER_ERROR",
            ApiError::Status { .. } => "HTTP_ERROR",
            ApiError::Transport(_) => "NETWORK_ERROR",
            ApiError::Decode(_) => "INVALID_RESPONSE",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation { message, field_errors } => json!({
                "success": false,
                "error": message,
                "error_code": self.error_code(),
                "field_errors": field_errors,
            }),
            _ => json!({
                "success": false,
                "error": self.message(),
                "error_code": self.error_code(),
            }),
        }
    }
}

impl ApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        ApiError::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        ApiError::Decode(err.to_string())
    }

    pub fn validation(message: impl Into<String>, field_errors: BTreeMap<String, String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field_errors,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::decode(err)
        } else {
            ApiError::transport(err)
        }
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Invalid credentials",
        403 => "Access token expired",
        404 => "Not found",
        409 => "Conflict",
        422 => "Unprocessable entity",
        500..=599 => "Server error",
        _ => "Request failed",
    }
}
