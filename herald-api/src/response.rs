//! API response types.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// Response status.
    pub status: &'static str,
    /// Response data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response with data.
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data: Some(data),
            message: None,
        }
    }

    /// Creates a successful response with data and message.
    #[must_use]
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            status: "success",
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Empty success response (for operations that don't return data).
#[derive(Debug, Serialize)]
pub struct EmptyResponse {
    /// Response status.
    pub status: &'static str,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EmptyResponse {
    /// Creates an empty success response.
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: "success",
            message: None,
        }
    }

    /// Creates an empty success response with a message.
    #[must_use]
    pub fn success_with_message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
        }
    }
}

impl IntoResponse for EmptyResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Created response (HTTP 201).
#[derive(Debug, Serialize)]
pub struct CreatedResponse<T>
where
    T: Serialize,
{
    /// Response status.
    pub status: &'static str,
    /// Created resource.
    pub data: T,
}

impl<T: Serialize> CreatedResponse<T> {
    /// Creates a new created response.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for CreatedResponse<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success("data");
        assert_eq!(response.status, "success");
        assert_eq!(response.data, Some("data"));
        assert!(response.message.is_none());
    }

    #[test]
    fn test_api_response_with_message() {
        let response = ApiResponse::success_with_message(1, "done");
        assert_eq!(response.message, Some("done".to_string()));
    }

    #[test]
    fn test_empty_response() {
        let response = EmptyResponse::success();
        assert_eq!(response.status, "success");
        assert!(response.message.is_none());
    }
}
