//! API error types

use serde::{Deserialize, Serialize};

/// Error codes reported to clients
pub mod error_codes {
    /// The caller presented no valid credentials
    pub const UNAUTHENTICATED: &str = "unauthenticated";
    /// The caller is known but may not perform this action
    pub const PERMISSION_DENIED: &str = "permission-denied";
    /// A referenced document does not exist
    pub const NOT_FOUND: &str = "not-found";
    /// The request is malformed or violates a rule
    pub const INVALID_ARGUMENT: &str = "invalid-argument";
    /// Anything else
    pub const INTERNAL: &str = "internal";
}

/// Error categories surfaced by every endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// No valid credentials
    Unauthenticated,
    /// Authenticated but not allowed
    PermissionDenied,
    /// Missing document
    NotFound,
    /// Bad input
    InvalidArgument,
    /// Unexpected failure
    Internal,
}

impl ErrorCode {
    /// Returns the wire string for this code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => error_codes::UNAUTHENTICATED,
            ErrorCode::PermissionDenied => error_codes::PERMISSION_DENIED,
            ErrorCode::NotFound => error_codes::NOT_FOUND,
            ErrorCode::InvalidArgument => error_codes::INVALID_ARGUMENT,
            ErrorCode::Internal => error_codes::INTERNAL,
        }
    }

    /// Returns the HTTP status code used for this category
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::Unauthenticated => 401,
            ErrorCode::PermissionDenied => 403,
            ErrorCode::NotFound => 404,
            ErrorCode::InvalidArgument => 400,
            ErrorCode::Internal => 500,
        }
    }
}

/// Error detail object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    /// Error category
    pub code: ErrorCode,
    /// Human readable message
    pub message: String,
}

/// Error response body: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{}] {}", .error.code.as_str(), .error.message)]
pub struct ApiError {
    /// The error
    pub error: ApiErrorDetail,
}

impl ApiError {
    /// Creates a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code,
                message: message.into(),
            },
        }
    }

    /// Creates an unauthenticated error
    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "Authentication required")
    }

    /// Creates a permission denied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Creates a not found error
    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Creates an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Creates an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Returns the error category
    pub fn code(&self) -> ErrorCode {
        self.error.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = ApiError::not_found("Mentorship request");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["error"]["code"], "not-found");
        assert_eq!(json["error"]["message"], "Mentorship request not found");
    }

    #[test]
    fn test_codes_match_wire_strings() {
        for code in [
            ErrorCode::Unauthenticated,
            ErrorCode::PermissionDenied,
            ErrorCode::NotFound,
            ErrorCode::InvalidArgument,
            ErrorCode::Internal,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_display() {
        let error = ApiError::permission_denied("Only the recipient can accept this request");
        assert_eq!(
            error.to_string(),
            "[permission-denied] Only the recipient can accept this request"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::Unauthenticated.http_status(), 401);
        assert_eq!(ErrorCode::PermissionDenied.http_status(), 403);
        assert_eq!(ErrorCode::InvalidArgument.http_status(), 400);
    }
}
