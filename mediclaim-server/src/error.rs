use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use auth_firebase::AuthError;
use storage_service::StorageError;

/// Wire shape for every error the API returns.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Authentication failed: {message}")]
    Credentials { message: String },

    #[error("Authorization error: {message}")]
    Authorization { message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Upload failed: {message}")]
    Upload { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    ///
    /// Token-layer failures map to 403 (not 401) to match the API's
    /// historical behavior; only the login flow itself answers 401.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::FORBIDDEN,
            ApiError::Credentials { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authorization { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Upload { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ApiErrorBody {
        match self {
            ApiError::Database(e) => ApiErrorBody {
                error: "Database error".to_string(),
                details: Some(e.to_string()),
            },
            other => ApiErrorBody {
                error: other.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        error!(
            status = status.as_u16(),
            error = %self,
            "API error occurred"
        );

        (status, Json(self.body())).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingHeader | AuthError::MalformedHeader | AuthError::InvalidToken(_) => {
                ApiError::authentication(err.to_string())
            }
            AuthError::UserNotFound(subject) => ApiError::not_found(format!("User {subject}")),
            AuthError::Provider(msg) | AuthError::Config(msg) => ApiError::internal(msg),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::FileTooLarge { .. } => ApiError::validation(err.to_string()),
            StorageError::NotFound(key) => ApiError::not_found(format!("Object {key}")),
            StorageError::Upload(_) | StorageError::Presign(_) | StorageError::Config(_) => {
                ApiError::Upload {
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_403() {
        assert_eq!(
            ApiError::authentication("Invalid token").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::authorization("role not permitted").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn login_failures_are_401() {
        assert_eq!(
            ApiError::credentials("no such account").status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn oversized_upload_maps_to_400() {
        let err: ApiError = StorageError::FileTooLarge {
            size_bytes: 15 * 1024 * 1024,
            limit_bytes: 10 * 1024 * 1024,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unreachable_store_maps_to_500() {
        let err: ApiError = StorageError::Upload("connection refused".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_row_maps_to_404() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
