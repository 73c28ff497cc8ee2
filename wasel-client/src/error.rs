//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Wrong email or password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No session (or refresh token) left to refresh
    #[error("Session has expired")]
    SessionExpired,

    /// MFA code or challenge rejected
    #[error("Invalid verification code")]
    MfaRejected,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// 按主键查找的行不存在 (`code` 为表专属的错误码)
    #[error("{}: {id}", code.message())]
    RowMissing { code: ErrorCode, id: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique / foreign key conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Realtime socket error
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn row_missing(code: ErrorCode, id: impl Into<String>) -> Self {
        Self::RowMissing {
            code,
            id: id.into(),
        }
    }

    /// Map onto the shared error code table
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorCode::InternalError,
            Self::Unauthorized => ErrorCode::NotAuthenticated,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::SessionExpired => ErrorCode::SessionExpired,
            Self::MfaRejected => ErrorCode::MfaInvalidCode,
            Self::Forbidden(_) => ErrorCode::PermissionDenied,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::RowMissing { code, .. } => *code,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Conflict(_) => ErrorCode::AlreadyExists,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Realtime(_) => ErrorCode::RealtimeError,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl From<AppError> for ClientError {
    fn from(err: AppError) -> Self {
        match err.http_status().as_u16() {
            401 => Self::Unauthorized,
            403 => Self::Forbidden(err.message),
            404 => Self::NotFound(err.message),
            409 => Self::Conflict(err.message),
            400 => Self::Validation(err.message),
            _ => Self::Internal(err.message),
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::RowMissing { code, id } => AppError::row_missing(code, id),
            other => AppError::with_message(other.code(), other.to_string()),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let err: ClientError = AppError::new(ErrorCode::BalanceInvalidAmount).into();
        assert!(matches!(err, ClientError::Validation(_)));

        let err: ClientError = AppError::not_found("Shipment").into();
        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_auth_variants_carry_specific_codes() {
        assert_eq!(ClientError::InvalidCredentials.code(), ErrorCode::InvalidCredentials);
        assert_eq!(ClientError::SessionExpired.code(), ErrorCode::SessionExpired);
        assert_eq!(ClientError::MfaRejected.code(), ErrorCode::MfaInvalidCode);
        assert_eq!(ClientError::Unauthorized.code(), ErrorCode::NotAuthenticated);
    }

    #[test]
    fn test_row_missing() {
        let err = ClientError::row_missing(ErrorCode::StoreNotFound, "st-4");
        assert_eq!(err.code(), ErrorCode::StoreNotFound);
        assert_eq!(err.to_string(), "Store not found: st-4");

        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::StoreNotFound);
        assert_eq!(app.http_status().as_u16(), 404);
        assert_eq!(app.details.unwrap().get("id").unwrap(), "st-4");
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = ClientError::Realtime("socket closed".into()).into();
        assert_eq!(app.code, ErrorCode::RealtimeError);
        assert!(app.message.contains("socket closed"));
    }
}
