//! Server error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use doc_store::StoreError;
use rpc_protocol::{ApiError, ErrorCode};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication required.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Permission denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Document store error.
    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    /// Blob storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] crate::services::blob_store::BlobError),
}

impl ServerError {
    /// Returns the wire error category.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerError::InvalidRequest(_) => ErrorCode::InvalidArgument,
            ServerError::NotFound(_) => ErrorCode::NotFound,
            ServerError::AuthenticationRequired | ServerError::Auth(_) => {
                ErrorCode::Unauthenticated
            }
            ServerError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            ServerError::Database(StoreError::NotFound { .. }) => ErrorCode::NotFound,
            ServerError::Database(StoreError::AlreadyExists { .. }) => ErrorCode::InvalidArgument,
            ServerError::Storage(crate::services::blob_store::BlobError::InvalidKey(_)) => {
                ErrorCode::InvalidArgument
            }
            ServerError::Database(_) | ServerError::Storage(_) => {
                ErrorCode::Internal
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ServerError::InvalidRequest(msg)
            | ServerError::NotFound(msg)
            | ServerError::PermissionDenied(msg) => msg.clone(),
            ServerError::AuthenticationRequired => "Authentication required".to_string(),
            ServerError::Database(
                e @ (StoreError::NotFound { .. } | StoreError::AlreadyExists { .. }),
            ) => e.to_string(),
            ServerError::Storage(crate::services::blob_store::BlobError::InvalidKey(key)) => {
                format!("Invalid file name: {}", key)
            }
            ServerError::Auth(e) => e.to_string(),
            ServerError::Database(_) | ServerError::Storage(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let code = self.code();
        if code == ErrorCode::Internal {
            tracing::error!(error = %self, "Request failed");
        }

        let status = StatusCode::from_u16(code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ApiError::new(code, self.message());

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Parses a string id from a request body.
pub fn parse_id(value: &str, field: &str) -> ServerResult<uuid::Uuid> {
    value
        .parse()
        .map_err(|_| ServerError::InvalidRequest(format!("Invalid {}", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_codes() {
        let missing = ServerError::from(StoreError::not_found("User", "u1"));
        assert_eq!(missing.code(), ErrorCode::NotFound);

        let duplicate = ServerError::from(StoreError::already_exists("Skill", "Rust"));
        assert_eq!(duplicate.code(), ErrorCode::InvalidArgument);

        let other = ServerError::from(StoreError::TransactionFinished);
        assert_eq!(other.code(), ErrorCode::Internal);
        assert_eq!(other.message(), "Internal server error");
    }

    #[test]
    fn test_status_codes() {
        let response = ServerError::PermissionDenied("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ServerError::AuthenticationRequired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = ServerError::InvalidRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_id() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "user_id").unwrap(), id);
        assert!(matches!(
            parse_id("not-a-uuid", "user_id"),
            Err(ServerError::InvalidRequest(_))
        ));
    }
}
