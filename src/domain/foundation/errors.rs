//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    UnknownProvider,
    UnknownProduct,
    InvalidReceipt,

    // Not found errors
    UserNotFound,
    TariffNotFound,
    PaymentNotFound,

    // Authorization errors
    Forbidden,

    // Upstream errors
    StorefrontUnavailable,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::UnknownProvider => "UNKNOWN_PROVIDER",
            ErrorCode::UnknownProduct => "UNKNOWN_PRODUCT",
            ErrorCode::InvalidReceipt => "INVALID_RECEIPT",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::TariffNotFound => "TARIFF_NOT_FOUND",
            ErrorCode::PaymentNotFound => "PAYMENT_NOT_FOUND",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::StorefrontUnavailable => "STOREFRONT_UNAVAILABLE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Whether the caller may retry the failed operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::StorefrontUnavailable | ErrorCode::DatabaseError
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::UserNotFound, "User not found");
        assert_eq!(format!("{}", err), "[USER_NOT_FOUND] User not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::validation("receipt", "Receipt is required")
            .with_detail("provider", "apple");

        assert_eq!(err.details.get("field"), Some(&"receipt".to_string()));
        assert_eq!(err.details.get("provider"), Some(&"apple".to_string()));
    }

    #[test]
    fn retryability_follows_error_class() {
        assert!(DomainError::new(ErrorCode::DatabaseError, "down").is_retryable());
        assert!(DomainError::new(ErrorCode::StorefrontUnavailable, "timeout").is_retryable());
        assert!(!DomainError::new(ErrorCode::UnknownProduct, "miss").is_retryable());
        assert!(!DomainError::new(ErrorCode::InvalidReceipt, "bad").is_retryable());
    }
}
