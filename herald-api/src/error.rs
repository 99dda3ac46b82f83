//! API error types.
//!
//! Each variant maps to an HTTP status and a machine-readable code so
//! clients can branch without parsing messages. Engine errors convert
//! losslessly via the `From` impls; registry errors arrive typed, never
//! as silent state corruption.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use herald_core::error::{RegistryError, StoreError};

/// API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed identity headers.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Capability violation.
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Malformed request outside the config taxonomy.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Malformed subscription configuration.
    #[error("Invalid subscription config: {0}")]
    InvalidConfig(String),

    /// Requested channel outside the subscriber's plan.
    #[error("Channel not allowed on current plan: {0}")]
    ChannelNotAllowed(String),

    /// Enabled-subscription ceiling reached.
    #[error("Subscription quota exceeded (limit {0})")]
    QuotaExceeded(u32),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::InvalidConfig(_) | Self::ChannelNotAllowed(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::QuotaExceeded(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ChannelNotAllowed(_) => "CHANNEL_NOT_ALLOWED",
            Self::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::InvalidConfig(reason) => Self::InvalidConfig(reason),
            RegistryError::ChannelNotAllowed(channel) => {
                Self::ChannelNotAllowed(channel.to_string())
            }
            RegistryError::Forbidden(reason) => Self::Forbidden(reason),
            RegistryError::QuotaExceeded { limit } => Self::QuotaExceeded(limit),
            RegistryError::NotFound(id) => Self::NotFound(format!("subscription {id}")),
            RegistryError::UnknownSubscriber(id) => Self::NotFound(format!("subscriber {id}")),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Self::NotFound(format!("notification {id}")),
            // Ownership failures are reported as not-found so one
            // subscriber cannot probe another's notification ids.
            StoreError::NotOwner(id) => Self::NotFound(format!("notification {id}")),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: &'static str,
    /// Machine-readable error code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            status: "error",
            code: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
