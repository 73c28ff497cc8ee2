//! Unified error codes for Wasel
//!
//! Shared by the dashboard client and the notification function.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Shipment errors
//! - 5xxx: Balance errors
//! - 6xxx: Notification errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Session has expired (nothing left to refresh)
    SessionExpired = 1005,
    /// Multi-factor code rejected
    MfaInvalidCode = 1011,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Shipment ====================
    /// Shipment not found
    ShipmentNotFound = 4001,
    /// Sheet not found
    SheetNotFound = 4101,
    /// Delegate (courier) not found
    DelegateNotFound = 4201,
    /// Store not found
    StoreNotFound = 4301,
    /// Shipper (merchant) not found
    ShipperNotFound = 4401,

    // ==================== 5xxx: Balance ====================
    /// Transaction amount invalid
    BalanceInvalidAmount = 5001,
    /// Transaction has no owner (delegate or shipper)
    BalanceMissingOwner = 5002,

    // ==================== 6xxx: Notification ====================
    /// No message template for status
    NotificationTemplateMissing = 6002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Data store error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Realtime channel error
    RealtimeError = 9101,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::MfaInvalidCode => "Invalid verification code",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Shipment
            ErrorCode::ShipmentNotFound => "Shipment not found",
            ErrorCode::SheetNotFound => "Sheet not found",
            ErrorCode::DelegateNotFound => "Delegate not found",
            ErrorCode::StoreNotFound => "Store not found",
            ErrorCode::ShipperNotFound => "Shipper not found",

            // Balance
            ErrorCode::BalanceInvalidAmount => "Transaction amount must be positive",
            ErrorCode::BalanceMissingOwner => "Transaction needs a delegate or a shipper",

            // Notification
            ErrorCode::NotificationTemplateMissing => "No message template for status",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Data store error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::RealtimeError => "Realtime channel error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1005 => Ok(ErrorCode::SessionExpired),
            1011 => Ok(ErrorCode::MfaInvalidCode),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Shipment
            4001 => Ok(ErrorCode::ShipmentNotFound),
            4101 => Ok(ErrorCode::SheetNotFound),
            4201 => Ok(ErrorCode::DelegateNotFound),
            4301 => Ok(ErrorCode::StoreNotFound),
            4401 => Ok(ErrorCode::ShipperNotFound),

            // Balance
            5001 => Ok(ErrorCode::BalanceInvalidAmount),
            5002 => Ok(ErrorCode::BalanceMissingOwner),

            // Notification
            6002 => Ok(ErrorCode::NotificationTemplateMissing),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::RealtimeError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_through_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::NotAuthenticated,
            ErrorCode::MfaInvalidCode,
            ErrorCode::ShipmentNotFound,
            ErrorCode::ShipperNotFound,
            ErrorCode::BalanceInvalidAmount,
            ErrorCode::NotificationTemplateMissing,
            ErrorCode::RealtimeError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        // 已移除的旧编号不再解析
        assert_eq!(ErrorCode::try_from(1), Err(InvalidErrorCode(1)));
        assert_eq!(ErrorCode::try_from(6001), Err(InvalidErrorCode(6001)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::ShipmentNotFound.to_string(), "E4001");
        assert_eq!(ErrorCode::ValidationFailed.to_string(), "E0002");
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::SheetNotFound).unwrap();
        assert_eq!(json, "4101");
        let code: ErrorCode = serde_json::from_str("1003").unwrap();
    }
}
